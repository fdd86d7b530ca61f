//! HTTP HEAD probe used to decide between a segmented and a single-stream fetch.

mod parse;

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

/// Headers relevant to a multi-connection download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if the server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
}

impl HeadResult {
    /// Size to split into Range segments, if the server supports it.
    pub fn segmentable_len(&self) -> Option<u64> {
        match self.content_length {
            Some(len) if self.accept_ranges && len > 0 => Some(len),
            _ => None,
        }
    }
}

/// Performs a HEAD request (following redirects) and returns the final response's metadata.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn probe(url: &str) -> Result<HeadResult> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.nobody(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(Duration::from_secs(30))?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform().context("HEAD request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("HEAD {} returned HTTP {}", url, code);
    }

    Ok(parse::parse_headers(&headers))
}
