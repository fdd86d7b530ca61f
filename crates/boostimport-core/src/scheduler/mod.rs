//! Admission and execution loop.
//!
//! One cycle: list deals → capacity breakers → classify each deal → import a
//! local `.car` in place, or dispatch a download→import chain that runs in
//! the background while the loop moves on.

mod cycle;
mod dispatch;
mod locate;
mod report;

pub use cycle::SchedulerLoop;
pub use locate::{download_url, find_local_car};
pub use report::{CycleOutcome, CycleReport};
