use std::error::Error as StdError;

use thiserror::Error;

/// Prompter's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Prompter's crate-wide error type.
///
/// Only the IO-facing edges (record decoding, encoders, config files) produce this.
/// The parser and the playback controller absorb bad input instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A persisted segment record that no parse could have produced.
    #[error("segment record {id} ({title:?}) has a zero duration")]
    ZeroDuration { id: u32, title: String },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
