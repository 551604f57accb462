//! Error type for conditions that callers must not simply skip.
//!
//! Missing engine state (no session, no schema, no context) is never an
//! error here; projections return `None` for that. `ProtoError` covers
//! misuse and configuration problems only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    /// Page size must be at least 1.
    #[error("invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("invalid config: {0}")]
    Config(String),

    /// Switcher settings could not be loaded or saved.
    #[error("settings: {0}")]
    Settings(String),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
