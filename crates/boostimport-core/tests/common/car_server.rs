//! Minimal HTTP/1.1 file server for download tests.
//!
//! Serves one body at every path. HEAD reports the length, GET honours a
//! single `Range: bytes=a-b` when ranges are enabled. Paths starting with
//! `/missing` answer 404.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct CarServerOptions {
    /// If false, GET ignores Range and `Accept-Ranges` is not sent.
    pub ranges: bool,
}

impl Default for CarServerOptions {
    fn default() -> Self {
        Self { ranges: true }
    }
}

pub struct CarServer {
    pub base: String,
    gets: Arc<AtomicUsize>,
}

impl CarServer {
    /// GET requests served so far (one per segment).
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

pub fn start(body: Vec<u8>, opts: CarServerOptions) -> CarServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let gets = Arc::new(AtomicUsize::new(0));
    let gets_srv = Arc::clone(&gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let gets = Arc::clone(&gets_srv);
            thread::spawn(move || serve(stream, &body, opts, &gets));
        }
    });
    CarServer {
        base: format!("http://127.0.0.1:{}", port),
        gets,
    }
}

fn serve(mut stream: TcpStream, body: &[u8], opts: CarServerOptions, gets: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]).to_string();
    let (method, path, range) = parse_request(&request);

    if path.starts_with("/missing") {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let total = body.len() as u64;
    let accept = if opts.ranges { "Accept-Ranges: bytes\r\n" } else { "" };
    match method.as_str() {
        "HEAD" => {
            let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}\r\n", total, accept);
            let _ = stream.write_all(head.as_bytes());
        }
        "GET" => {
            gets.fetch_add(1, Ordering::SeqCst);
            let (status, slice) = match range {
                Some((start, end)) if opts.ranges && start < total => {
                    let end = end.min(total - 1);
                    ("206 Partial Content", &body[start as usize..=end as usize])
                }
                _ => ("200 OK", body),
            };
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}\r\n",
                status,
                slice.len(),
                accept
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(slice);
        }
        _ => {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        }
    }
}

/// (method, path, optional inclusive byte range).
fn parse_request(request: &str) -> (String, String, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_ascii_uppercase();
    let path = first.next().unwrap_or("/").to_string();
    let mut range = None;
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        if let Some((a, b)) = value.trim().trim_start_matches("bytes=").split_once('-') {
            let start = a.trim().parse().unwrap_or(0);
            let end = b.trim().parse().unwrap_or(u64::MAX);
            range = Some((start, end));
        }
    }
    (method, path, range)
}
