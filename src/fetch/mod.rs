//! Paginated fetching
//!
//! Turns "fetch all items of a collection" into an ordered, memory-bounded,
//! concurrently-fetched stream of records.

mod fetcher;
mod types;

#[cfg(test)]
mod tests;

pub use fetcher::{PageFetcher, RecordStream, DEFAULT_MAX_IN_FLIGHT_REQUESTS};
pub use types::{ListQuery, PageEnvelope, DEFAULT_PAGE_SIZE};
