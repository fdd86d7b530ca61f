//! Single-stream GET for servers without Range support.

use crate::storage::StorageWriter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::FetchError;

/// Streams the whole body into `storage` from offset 0. Returns bytes written.
pub(super) fn download_single(
    url: &str,
    storage: &StorageWriter,
    expected_len: Option<u64>,
) -> Result<u64, FetchError> {
    let offset = Arc::new(AtomicU64::new(0));
    let offset_cb = Arc::clone(&offset);
    let storage_error: Arc<Mutex<Option<anyhow::Error>>> = Arc::new(Mutex::new(None));
    let storage_error_cb = Arc::clone(&storage_error);
    let storage = storage.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            let off = offset_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
            match storage.write_at(off, data) {
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
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }

    let received = offset.load(Ordering::Relaxed);
    if let Some(expected) = expected_len {
        if received != expected {
            return Err(FetchError::PartialTransfer { expected, received });
        }
    }
    Ok(received)
}
