mod pool;
mod types;
mod writer;

pub use pool::{TaskError, TaskOutcome, run_pool};
pub use types::{DownloadTask, Failure, PoolOptions, RunSummary};
pub use writer::{WriteError, write_file};
