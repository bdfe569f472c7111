//! Error taxonomy for the reading session and its collaborators

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReaderError {
    /// No identifier/title was supplied, or the gateway/cache lookup failed
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Failed to save word: {0}")]
    SaveFailed(String),

    /// Never surfaced to the reader; the next progress write is the retry
    #[error("Failed to persist reading progress: {0}")]
    PersistenceFailed(String),

    #[error("Gateway request failed: {0}")]
    Gateway(String),
}

impl ReaderError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::ContentUnavailable(msg.into())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ContentUnavailable(_))
    }
}

pub type ReaderResult<T> = std::result::Result<T, ReaderError>;
