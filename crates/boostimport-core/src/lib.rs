pub mod config;
pub mod logging;

pub mod capacity;
pub mod classify;
pub mod deal;
pub mod downloader;
pub mod executor;
pub mod fetch_head;
pub mod http;
pub mod registry;
pub mod retry;
pub mod rpc;
pub mod scheduler;
pub mod segmenter;
pub mod storage;
