use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::normalized_ext;

pub const MIME_TYPE_JPEG: &str = "image/jpeg";
pub const MIME_TYPE_PNG: &str = "image/png";
pub const MIME_TYPE_GIF: &str = "image/gif";
pub const MIME_TYPE_BITMAP: &str = "image/bmp";
pub const MIME_TYPE_TIFF: &str = "image/tiff";
pub const MIME_TYPE_HEIF: &str = "image/heif";
pub const MIME_TYPE_MP4: &str = "video/mp4";

/// 内容嗅探只读取文件开头的这部分字节
pub const SNIFF_LEN: usize = 261;

/// MIME 探测结果
///
/// `mime_type` 会把除 `Detected` 以外的结果全部折叠成空字符串；
/// 需要区分“文件不存在”和“类型未知”的调用方直接使用 [`detect`]。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    NotFound,
    Unreadable,
    Unknown,
    Detected(String),
}

impl Detection {
    pub fn into_mime(self) -> String {
        match self {
            Detection::Detected(mime) => mime,
            _ => String::new(),
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected(_))
    }
}

/// 返回文件的 MIME 类型，无法确定时返回空字符串
///
/// 优先按文件头魔数判断，失败后再按扩展名查表。
/// 打开或读取失败不会报错，同样返回空字符串。
pub fn mime_type<P: AsRef<Path>>(path: P) -> String {
    detect(path).into_mime()
}

pub fn detect<P: AsRef<Path>>(path: P) -> Detection {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("[Mime] File not found: {:?}", path);
            return Detection::NotFound;
        }
        Err(e) => {
            tracing::debug!("[Mime] Failed to open {:?}: {}", path, e);
            return Detection::Unreadable;
        }
    };

    detect_reader(file, path)
}

/// 对任意数据源执行嗅探，最多消费 `SNIFF_LEN` 字节
///
/// `path` 只用于扩展名回退，不会被打开。
pub fn detect_reader<R: Read>(reader: R, path: &Path) -> Detection {
    let mut buffer = Vec::with_capacity(SNIFF_LEN);

    if let Err(e) = reader.take(SNIFF_LEN as u64).read_to_end(&mut buffer) {
        tracing::debug!("[Mime] Failed to read {:?}: {}", path, e);
        return Detection::Unreadable;
    }

    if let Some(mime) = sniff_bytes(&buffer) {
        return Detection::Detected(mime.to_string());
    }

    match mime_for_ext(&normalized_ext(path)) {
        Some(mime) => Detection::Detected(mime.to_string()),
        None => Detection::Unknown,
    }
}

/// 魔数匹配
pub fn sniff_bytes(buffer: &[u8]) -> Option<&'static str> {
    infer::get(buffer).map(|kind| kind.mime_type())
}

/// 按规范化后的扩展名（小写、无前导点）查表
pub fn mime_for_ext(ext: &str) -> Option<&'static str> {
    if ext.is_empty() {
        return None;
    }
    mime_guess::from_ext(ext).first_raw()
}
