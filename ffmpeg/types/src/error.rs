/*!
    Error type shared by every crate in the ecosystem.
*/

use thiserror::Error;

/**
    Errors produced while opening, demuxing, decoding or converting media.
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("no {0} stream found")]
    StreamNotFound(&'static str),
    /// The decoder holds pictures that must be received before it accepts more input.
    #[error("decoder input is full, receive pending pictures first")]
    InputFull,
}

impl Error {
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat(message.into())
    }
}

/// Type alias for results that may return an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
