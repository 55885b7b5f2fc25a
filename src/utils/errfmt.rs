//! Compact formatting of HTTP client errors for the operational log.
//!
//! The raw error chain from the HTTP client is verbose and repeats the URL
//! several times; this produces a single line with the parts that matter.

/// Summarize a reqwest error as `kind url=... status=...`.
pub fn describe_http_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect failed"
    } else if err.is_decode() {
        "decode failed"
    } else if err.is_request() {
        "request failed"
    } else {
        "error"
    };

    let mut summary = String::from(kind);
    if let Some(url) = err.url() {
        summary.push_str(&format!(" url={url}"));
    }
    if let Some(status) = err.status() {
        summary.push_str(&format!(" status={status}"));
    }
    summary
}
