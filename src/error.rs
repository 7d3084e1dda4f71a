use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("stream truncated: {requested} bits requested, only {available} available")]
    TruncatedStream { requested: usize, available: usize },

    #[error("symbol {0} has no code in this table")]
    UnknownSymbol(String),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("Input file not found at \"{:?}\"", .path.as_path())]
    MissingInputFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Configuration file not found at \"{:?}\"", .path.as_path())]
    MissingConfigurationFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration file")]
    InvalidConfig(#[from] toml::de::Error),

    #[error("Generic I/O error")]
    Io(#[from] io::Error),
}

impl HuffmanError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        HuffmanError::MalformedHeader(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
