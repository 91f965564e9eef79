pub const ID_MAX_LEN: usize = 64;

/// 清理路径中的 ID 参数：只保留 `[A-Za-z0-9_:-]`，最长 64 个字符
pub fn sanitize_id(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        .take(ID_MAX_LEN)
        .collect()
}
