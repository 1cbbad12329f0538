//! Pipeline entry points for mirror operations.
//!
//! - `run_sync`: Walk the content listing, mirror every page, then publish
//! - `ListWalker`: Sequential pagination over listing pages
//! - `PagePipeline`: Fetch, sanitize, and write pages in bounded batches

pub mod page;
pub mod sync;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use page::PagePipeline;
pub use sync::{commit_message, run_sync};
pub use walk::ListWalker;
