use std::io::Read;

use anyhow::Result;
use axum::http::HeaderMap;
use flate2::read::GzDecoder;

use backend_domain::{RuntimeConfig, TransactionBatch};

use crate::error::HttpError;

pub const OWNER_HEADER: &str = "x-owner-id";
const MAX_OWNER_ID_CHARS: usize = 128;

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

pub fn owner_id(headers: &HeaderMap) -> Result<String, HttpError> {
    let value = headers
        .get(OWNER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or("");
    if value.is_empty() {
        return Err(HttpError::BadRequest(format!("missing {} header", OWNER_HEADER)));
    }
    if value.chars().count() > MAX_OWNER_ID_CHARS {
        return Err(HttpError::BadRequest(format!(
            "{} must be at most {} characters",
            OWNER_HEADER, MAX_OWNER_ID_CHARS
        )));
    }
    Ok(value.to_string())
}

/// Bearer check followed by owner scoping; every api handler starts here.
pub fn authorize_owner(config: &RuntimeConfig, headers: &HeaderMap) -> Result<String, HttpError> {
    if !authorize(config, headers) {
        return Err(HttpError::Unauthorized);
    }
    owner_id(headers)
}

/// `limit` bounds the decoded size, so a small gzip body cannot inflate
/// past the configured body limit.
pub fn parse_batch(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<TransactionBatch> {
    let content = maybe_gunzip(headers, body, limit)?;
    Ok(serde_json::from_str(&content)?)
}

fn maybe_gunzip(headers: &HeaderMap, body: &[u8], limit: u64) -> Result<String> {
    if let Some(encoding) = headers.get("content-encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let mut decoder = GzDecoder::new(body).take(limit.saturating_add(1));
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            if out.len() as u64 > limit {
                anyhow::bail!("decompressed batch exceeds {} bytes", limit);
            }
            return Ok(out);
        }
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use axum::http::HeaderValue;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn config_with_token(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            api_token: token.map(ToString::to_string),
            ..RuntimeConfig::default()
        }
    }

    #[test]
    fn bearer_token_is_required_when_configured() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&config_with_token(None), &headers));
        assert!(!authorize(&config_with_token(Some("secret")), &headers));

        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config_with_token(Some("secret")), &headers));
        assert!(!authorize(&config_with_token(Some("other")), &headers));
    }

    #[test]
    fn owner_header_must_be_present() {
        let mut headers = HeaderMap::new();
        assert!(matches!(owner_id(&headers), Err(HttpError::BadRequest(_))));
        headers.insert(OWNER_HEADER, HeaderValue::from_static("  user-7 "));
        assert_eq!(owner_id(&headers).expect("owner"), "user-7");
    }

    #[test]
    fn unauthorized_wins_over_missing_owner() {
        let headers = HeaderMap::new();
        let result = authorize_owner(&config_with_token(Some("secret")), &headers);
        assert!(matches!(result, Err(HttpError::Unauthorized)));
    }

    #[test]
    fn gzip_batch_is_decoded() {
        let body = r#"{"transactions":[{"title":"Coffee","amount":4.5,"category":"food"}]}"#;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).expect("compress");
        let compressed = encoder.finish().expect("finish");

        let mut headers = HeaderMap::new();
        headers.insert("content-encoding", HeaderValue::from_static("gzip"));
        let batch = parse_batch(&headers, &compressed, 1024).expect("decode");
        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.transactions[0].title, "Coffee");
    }

    #[test]
    fn gzip_batch_is_bounded_after_decoding() {
        let body = format!(
            r#"{{"transactions":[{{"title":"{}","amount":4.5,"category":"food"}}]}}"#,
            "a".repeat(64 * 1024)
        );
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).expect("compress");
        let compressed = encoder.finish().expect("finish");
        assert!(compressed.len() < 4096);

        let mut headers = HeaderMap::new();
        headers.insert("content-encoding", HeaderValue::from_static("gzip"));
        let err = parse_batch(&headers, &compressed, 4096).expect_err("too large");
        assert!(err.to_string().contains("exceeds"));
    }
}
