//! Error types for box container parsing

use thiserror::Error;

/// Errors raised while decoding or writing the box container
#[derive(Debug, Error)]
pub enum Error {
    /// Structural violation in the box container. Always fatal for the
    /// store being decoded; `offset` is the position of the first
    /// violation.
    #[error("malformed box container at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// A superbox is missing its leading description box
    #[error("superbox at offset {0} has no description box")]
    MissingDescription(usize),

    /// A description box payload could not be interpreted
    #[error("invalid description box at offset {offset}: {reason}")]
    InvalidDescription { offset: usize, reason: String },
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Error::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
