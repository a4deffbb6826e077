//! Error types for trust configuration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// PEM input held no certificates or could not be parsed
    #[error("invalid trust anchor PEM: {0}")]
    InvalidPem(String),
}

pub type Result<T> = std::result::Result<T, Error>;
