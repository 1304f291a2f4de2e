//! Object download with parallel ranged requests, progress tracking and
//! atomic placement
//!
//! - Byte-range planning and concurrent part fetches
//! - Positional writes into a temporary file next to the destination
//! - Progress reporting through a pluggable observer
//! - Rename into place only after the content is complete and verified

mod finishing;
mod progress;
mod types;
mod worker;
mod writer;

pub use finishing::StagedFile;
pub use progress::transfer_bar;
pub use types::{
    plan_parts, Part, PartPlan, TransferOptions, TransferState, DEFAULT_CONCURRENCY,
    DEFAULT_PART_SIZE, MAX_CONCURRENCY,
};
pub use worker::download_object;
pub use writer::{NoopObserver, ProgressObserver, ProgressWriter, WriteAt};
