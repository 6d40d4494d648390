//! Bulk CSV import into the student store
//!
//! # Architecture
//! - **Reader**: one blocking task decodes CSV rows into a bounded work queue
//! - **Workers**: a fixed pool classifies rows and hands records off
//! - **Coordinator**: waits for every worker, then closes the hand-off channel
//! - **Collector**: the only caller of `StudentStore::add` during an import
//!
//! # Error Handling
//! - Per-row isolation: decode and classification faults are logged and skipped
//! - Only pipeline-level failures (unreadable source, cancellation, task
//!   failure) are returned

mod pipeline;
mod row;

pub use pipeline::{ImportError, ImportPipeline};
pub use row::{classify_row, RowFault, ROW_FIELDS};
