//! Cleans the welfare-recipient registry extract into a typed Parquet
//! artifact, and reads that artifact back for reporting.

pub mod config;
pub mod error;
pub mod process;
pub mod report;
pub mod schema;

pub use config::PipelineConfig;
pub use error::{PipelineError, ReportError};
pub use process::{run, Pipeline, RunSummary};
pub use schema::CanonicalRecord;
