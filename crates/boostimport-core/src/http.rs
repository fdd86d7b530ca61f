//! Blocking JSON POST over libcurl, shared by the GraphQL and JSON-RPC clients.
//!
//! Runs on the calling thread; async callers wrap it in `spawn_blocking`.

use std::time::Duration;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as lossy UTF-8, truncated for error messages.
    pub fn body_snippet(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(256).collect()
    }
}

/// POST `body` as `application/json` to `url` with extra `headers` (`"Name: value"`).
pub fn post_json(
    url: &str,
    headers: &[String],
    body: &[u8],
    timeout: Duration,
) -> Result<HttpResponse, curl::Error> {
    let mut response = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    list.append("Accept: application/json")?;
    // No 100-continue round trip.
    list.append("Expect:")?;
    for h in headers {
        list.append(h)?;
    }
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            response.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse {
        status,
        body: response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = HttpResponse {
            status: 204,
            body: Vec::new(),
        };
        assert!(ok.is_success());
        let bad = HttpResponse {
            status: 502,
            body: b"bad gateway".to_vec(),
        };
        assert!(!bad.is_success());
        assert_eq!(bad.body_snippet(), "bad gateway");
    }

    #[test]
    fn snippet_is_truncated() {
        let r = HttpResponse {
            status: 500,
            body: vec![b'x'; 1000],
        };
        assert_eq!(r.body_snippet().len(), 256);
    }
}
