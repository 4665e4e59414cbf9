//! Error types for notification ingestion

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// The caller supplied no notification body at all.
    #[error("no notification text supplied")]
    InputMissing,
}
