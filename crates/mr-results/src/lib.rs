//! mr-results: trace export and run storage.

pub mod export;
pub mod hash;
pub mod store;
pub mod types;

pub use export::{CSV_COLUMNS, trace_to_csv, write_csv, write_trace};
pub use hash::compute_run_id;
pub use store::RunStore;
pub use types::*;

/// Version tag mixed into run ids; bump when numerics change.
pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },
}
