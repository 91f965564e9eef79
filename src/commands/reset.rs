use crate::config::Settings;
use crate::fs::{find_by_ext, AVC_EXT, JSON_EXT, MP4_EXT, YAML_EXT};
use crate::storage::PhotoRegistry;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// 交互式确认
pub trait Prompt {
    /// 用户确认返回 `true`；取消、拒绝或无法读取输入均视为 `false`
    fn confirm(&self, question: &str) -> bool;
}

/// 基于终端的确认提示
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> bool {
        match inquire::Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(e) => {
                warn!("[Reset] Prompt aborted: {}", e);
                false
            }
        }
    }
}

/// 各步骤的执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub index_reset: bool,
    pub sidecar_json_removed: usize,
    pub sidecar_yaml_removed: usize,
    pub videos_removed: usize,
    pub album_yaml_removed: usize,
    pub failed: usize,
}

struct CleanupStep<'a> {
    question: &'a str,
    root: &'a Path,
    exts: &'a [&'a str],
    subject: &'a str,
    none_found: &'a str,
    keeping: &'a str,
}

/// 重置索引数据库并删除附属文件，每一步都需要单独确认
///
/// 进度字符写入 `out`：每删除一个文件输出 `.`，失败输出 `E`。
pub fn run_reset<P: Prompt, W: Write>(
    settings: &Settings,
    registry: &PhotoRegistry,
    prompt: &P,
    out: &mut W,
) -> anyhow::Result<ResetReport> {
    warn!("[Reset] Resets the index and removes sidecar files after confirmation");

    let mut report = ResetReport::default();

    if prompt.confirm("Reset index database incl albums, labels, users and metadata?") {
        let start = Instant::now();

        info!("[Reset] Dropping existing tables and restoring default schema");
        registry.reset_schema()?;

        if let Some(password) = settings.admin_password() {
            info!("[Reset] Restoring initial admin password");
            registry.init_admin(&settings.auth.admin_user, password)?;
        }

        report.index_reset = true;
        info!("[Reset] Database reset completed in {:?}", start.elapsed());
    } else {
        info!("[Reset] Keeping index database");
    }

    let sidecar = settings.storage.sidecar_path.as_path();

    let (removed, failed) = cleanup(
        prompt,
        out,
        CleanupStep {
            question: "Permanently delete all *.json photo sidecar files?",
            root: sidecar,
            exts: &[JSON_EXT],
            subject: "json photo sidecar files",
            none_found: "no json files found",
            keeping: "keeping json sidecar files",
        },
    )?;
    report.sidecar_json_removed = removed;
    report.failed += failed;

    let (removed, failed) = cleanup(
        prompt,
        out,
        CleanupStep {
            question: "Permanently delete all *.yml photo metadata backups?",
            root: sidecar,
            exts: &[YAML_EXT],
            subject: "photo metadata backups",
            none_found: "no metadata backups found for removal",
            keeping: "keeping backup files",
        },
    )?;
    report.sidecar_yaml_removed = removed;
    report.failed += failed;

    let (removed, failed) = cleanup(
        prompt,
        out,
        CleanupStep {
            question: "Permanently delete all transcoded videos, incl. extracted motion photo videos?",
            root: sidecar,
            exts: &[MP4_EXT, AVC_EXT],
            subject: "transcoded videos",
            none_found: "no transcoded videos found for removal",
            keeping: "keeping transcoded videos",
        },
    )?;
    report.videos_removed = removed;
    report.failed += failed;

    let (removed, failed) = cleanup(
        prompt,
        out,
        CleanupStep {
            question: "Permanently delete all *.yml album backups?",
            root: settings.storage.albums_path.as_path(),
            exts: &[YAML_EXT],
            subject: "album backups",
            none_found: "no album backups found for removal",
            keeping: "keeping backup files",
        },
    )?;
    report.album_yaml_removed = removed;
    report.failed += failed;

    Ok(report)
}

fn cleanup<P: Prompt, W: Write>(
    prompt: &P,
    out: &mut W,
    step: CleanupStep<'_>,
) -> anyhow::Result<(usize, usize)> {
    if !prompt.confirm(step.question) {
        info!("[Reset] {}", step.keeping);
        return Ok((0, 0));
    }

    let start = Instant::now();
    let matches = find_by_ext(step.root, step.exts);

    if matches.is_empty() {
        info!("[Reset] {}", step.none_found);
        return Ok((0, 0));
    }

    info!("[Reset] {} {} will be removed", matches.len(), step.subject);
    let counts = remove_files(&matches, out)?;
    info!("[Reset] Removed {} in {:?}", step.subject, start.elapsed());

    Ok(counts)
}

fn remove_files<W: Write>(paths: &[PathBuf], out: &mut W) -> anyhow::Result<(usize, usize)> {
    let mut removed = 0usize;
    let mut failed = 0usize;

    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => {
                removed += 1;
                write!(out, ".")?;
            }
            Err(e) => {
                failed += 1;
                tracing::debug!("[Reset] Failed to remove {:?}: {}", path, e);
                write!(out, "E")?;
            }
        }
        out.flush()?;
    }

    writeln!(out)?;
    Ok((removed, failed))
}

/// CLI 入口：打开索引数据库并使用终端提示执行重置
pub fn run(settings: &Settings) -> anyhow::Result<ResetReport> {
    let registry = PhotoRegistry::new(&settings.database.url, 1)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_reset(settings, &registry, &TerminalPrompt, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_files_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.json");
        std::fs::write(&present, "{}").unwrap();
        let missing = dir.path().join("b.json");

        let mut out = Vec::new();
        let (removed, failed) = remove_files(&[present.clone(), missing], &mut out).unwrap();

        assert_eq!((removed, failed), (1, 1));
        assert_eq!(String::from_utf8(out).unwrap(), ".E\n");
        assert!(!present.exists());
    }
}
