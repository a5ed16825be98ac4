use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlgoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, AlgoError>;

/// Failure of a sort driven by a fallible comparator.
///
/// `E` is the comparator's own error type; it is handed back untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SortError<E> {
    #[error("comparator failed: {0}")]
    Comparator(E),

    #[error("sort cancelled before completion")]
    Cancelled,
}

impl<E> SortError<E> {
    pub fn comparator_error(&self) -> Option<&E> {
        match self {
            Self::Comparator(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}
