//! Splits a file into byte ranges, one per download connection.

/// A byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// libcurl range string (inclusive end): `start-(end-1)`.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.end.saturating_sub(1))
    }
}

/// Splits `total_size` into at most `connections` near-equal segments.
/// Earlier segments take the remainder bytes. Empty if either input is 0.
pub fn plan_segments(total_size: u64, connections: usize) -> Vec<Segment> {
    if total_size == 0 || connections == 0 {
        return Vec::new();
    }

    let count = (connections as u64).min(total_size);
    let base = total_size / count;
    let remainder = total_size % count;

    let mut out = Vec::with_capacity(count as usize);
    let mut offset = 0u64;
    for i in 0..count {
        let len = base + u64::from(i < remainder);
        out.push(Segment {
            start: offset,
            end: offset + len,
        });
        offset += len;
    }
    out
}
