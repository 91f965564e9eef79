use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::io::{Seek, SeekFrom};
use tokio::fs::File as TokioFile;
use tokio_util::io::ReaderStream;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 解析单段 `Range: bytes=` 请求头，返回闭区间 `(start, end)`
///
/// 支持 `a-b`、`a-` 与后缀形式 `-n`；无法满足时返回 `Err(())`，
/// 非 bytes 单位或多段范围返回 `Ok(None)` 并按完整内容处理。
pub fn parse_range(value: &str, file_size: u64) -> Result<Option<(u64, u64)>, ()> {
    let Some(ranges) = value.trim().strip_prefix("bytes=") else {
        return Ok(None);
    };
    if ranges.contains(',') {
        return Ok(None);
    }
    let Some((start, end)) = ranges.split_once('-') else {
        return Err(());
    };
    let (start, end) = (start.trim(), end.trim());

    if file_size == 0 {
        return Err(());
    }
    let last = file_size - 1;

    let range = if start.is_empty() {
        let suffix: u64 = end.parse().map_err(|_| ())?;
        if suffix == 0 {
            return Err(());
        }
        (file_size.saturating_sub(suffix), last)
    } else {
        let start: u64 = start.parse().map_err(|_| ())?;
        let end = if end.is_empty() {
            last
        } else {
            end.parse::<u64>().map_err(|_| ())?.min(last)
        };
        (start, end)
    };

    if range.0 > range.1 || range.0 > last {
        return Err(());
    }
    Ok(Some(range))
}

/// `If-None-Match` 弱比较：支持 `*`、逗号分隔列表与 `W/` 前缀
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let etag = etag.trim_start_matches("W/");
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == etag
    })
}

/// 构建文件响应（支持 Range、ETag 与 If-None-Match）
pub async fn serve_file(mut file: std::fs::File, content_type: &str, headers: &HeaderMap) -> Response {
    let metadata = match file.metadata() {
        Ok(m) => m,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };
    let file_size = metadata.len();

    // ETag 生成：基于文件大小和修改时间
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let etag = format!(r#""{:x}-{:x}""#, file_size, mtime);

    if headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|value| etag_matches(value, &etag))
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    let range = match headers.get(header::RANGE).and_then(|v| v.to_str().ok()) {
        Some(value) => match parse_range(value, file_size) {
            Ok(range) => range,
            Err(()) => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{}", file_size))],
                )
                    .into_response();
            }
        },
        None => None,
    };

    let (start, content_length) = match range {
        Some((start, end)) => (start, end - start + 1),
        None => (0, file_size),
    };

    if let Err(e) = file.seek(SeekFrom::Start(start)) {
        tracing::error!("[Stream] Seek failed: {}", e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let tokio_file = TokioFile::from_std(file);
    let stream = ReaderStream::with_capacity(
        tokio::io::AsyncReadExt::take(tokio_file, content_length),
        64 * 1024,
    );

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::ETAG, etag)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, content_length.to_string());

    builder = match range {
        Some((start, end)) => builder.status(StatusCode::PARTIAL_CONTENT).header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", start, end, file_size),
        ),
        None => builder.status(StatusCode::OK),
    };

    builder
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::{etag_matches, parse_range};

    #[test]
    fn parses_closed_and_open_ranges() {
        assert_eq!(parse_range("bytes=0-99", 1000), Ok(Some((0, 99))));
        assert_eq!(parse_range("bytes=500-", 1000), Ok(Some((500, 999))));
        assert_eq!(parse_range("bytes=900-5000", 1000), Ok(Some((900, 999))));
    }

    #[test]
    fn parses_suffix_range() {
        assert_eq!(parse_range("bytes=-100", 1000), Ok(Some((900, 999))));
        assert_eq!(parse_range("bytes=-5000", 1000), Ok(Some((0, 999))));
    }

    #[test]
    fn rejects_unsatisfiable_ranges() {
        assert_eq!(parse_range("bytes=1000-", 1000), Err(()));
        assert_eq!(parse_range("bytes=5-2", 1000), Err(()));
        assert_eq!(parse_range("bytes=0-0", 0), Err(()));
        assert_eq!(parse_range("bytes=abc", 1000), Err(()));
    }

    #[test]
    fn ignores_other_units_and_multipart() {
        assert_eq!(parse_range("items=0-1", 1000), Ok(None));
        assert_eq!(parse_range("bytes=0-1,5-6", 1000), Ok(None));
    }

    #[test]
    fn if_none_match_uses_weak_comparison() {
        let etag = r#""a-1""#;
        assert!(etag_matches(r#""a-1""#, etag));
        assert!(etag_matches(r#"W/"a-1""#, etag));
        assert!(etag_matches(r#""zz", W/"a-1""#, etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches(r#""a-2""#, etag));
        assert!(!etag_matches("", etag));
    }
}
