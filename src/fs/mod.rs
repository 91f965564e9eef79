pub mod mime;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const JSON_EXT: &str = "json";
pub const YAML_EXT: &str = "yml";
pub const MP4_EXT: &str = "mp4";
pub const AVC_EXT: &str = "avc";

/// 规范化扩展名：转小写并去掉前导点，没有扩展名时返回空字符串
///
/// `IMG_01.JPG` -> `jpg`，`.hidden` -> ``，`archive.tar.GZ` -> `gz`
pub fn normalized_ext<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy())
        .unwrap_or_default()
        .trim_start_matches('.')
        .to_ascii_lowercase()
}

/// 递归查找 `root` 下所有扩展名属于 `exts` 的常规文件
///
/// `root` 不存在时返回空列表；遍历中无法访问的条目会被跳过。
pub fn find_by_ext<P: AsRef<Path>>(root: P, exts: &[&str]) -> Vec<PathBuf> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Vec::new();
    }

    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("[Walk] Skipped entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| exts.contains(&normalized_ext(entry.path()).as_str()))
        .map(|entry| entry.into_path())
        .collect()
}
