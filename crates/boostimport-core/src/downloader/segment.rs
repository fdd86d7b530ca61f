//! Range GETs, one connection per segment, written at their offsets.

use crate::segmenter::Segment;
use crate::storage::StorageWriter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::FetchError;

/// Downloads every segment on its own thread; returns the first failure.
pub(super) fn download_segments(
    url: &str,
    segments: &[Segment],
    storage: &StorageWriter,
) -> Result<(), FetchError> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = segments
            .iter()
            .map(|segment| scope.spawn(move || download_one_segment(url, segment, storage)))
            .collect();

        let mut first_err = None;
        for handle in handles {
            let result = handle.join().unwrap_or(Err(FetchError::WorkerPanicked));
            if let Err(e) = result {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    })
}

/// GET with a Range header; body written at the segment's start offset.
fn download_one_segment(
    url: &str,
    segment: &Segment,
    storage: &StorageWriter,
) -> Result<(), FetchError> {
    let written = Arc::new(AtomicU64::new(0));
    let written_cb = Arc::clone(&written);
    let storage_error: Arc<Mutex<Option<anyhow::Error>>> = Arc::new(Mutex::new(None));
    let storage_error_cb = Arc::clone(&storage_error);
    let segment_start = segment.start;
    let storage = storage.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Abort if throughput stays under 1 KiB/s for a minute.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.range(&segment.curl_range())?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            let off = written_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
            match storage.write_at(segment_start + off, data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    let _ = storage_error_cb.lock().unwrap().replace(e);
                    Ok(0)
                }
            }
        })?;
        if let Err(e) = transfer.perform() {
            if e.is_write_error() {
                if let Some(storage_err) = storage_error.lock().unwrap().take() {
                    return Err(FetchError::Storage(storage_err));
                }
            }
            return Err(FetchError::Curl(e));
        }
    }

    let code = easy.response_code()?;
    if code != 206 {
        // A 200 here means the server ignored Range and sent the whole body.
        return Err(FetchError::Http(code));
    }

    let received = written.load(Ordering::Relaxed);
    if received != segment.len() {
        return Err(FetchError::PartialTransfer {
            expected: segment.len(),
            received,
        });
    }
    Ok(())
}
