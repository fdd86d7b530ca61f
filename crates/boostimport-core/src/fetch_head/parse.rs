//! Parse HEAD response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines. With redirects curl reports one header block
/// per response; each status line resets the state so the last block wins.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut content_length = None;
    let mut accept_ranges = false;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            content_length = None;
            accept_ranges = false;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("accept-ranges") {
                accept_ranges = value.eq_ignore_ascii_case("bytes");
            }
        }
    }

    HeadResult {
        content_length,
        accept_ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn content_length_and_ranges() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Length: 12345",
            "Accept-Ranges: bytes",
        ]));
        assert_eq!(r.content_length, Some(12345));
        assert!(r.accept_ranges);
    }

    #[test]
    fn ranges_none() {
        let r = parse_headers(&lines(&["Content-Length: 999", "Accept-Ranges: none"]));
        assert_eq!(r.content_length, Some(999));
        assert!(!r.accept_ranges);
    }

    #[test]
    fn last_response_after_redirect_wins() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: https://mirror.example.com/x.car",
            "Content-Length: 0",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 4096",
        ]));
        assert_eq!(r.content_length, Some(4096));
        assert!(!r.accept_ranges);
    }
}
