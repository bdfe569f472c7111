//! Remote content gateway: content retrieval, translation and persistence
//!
//! The reading session only ever talks to `dyn ContentGateway`. [`http`]
//! talks to the remote API; [`memory`] backs offline reading.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::content::{BookContent, BookSummary, BookType, ChapterContent};
use crate::error::ReaderResult;
use crate::practice::PracticeResult;
use crate::vocabulary::{SaveWordRequest, SavedWord};

pub use http::HttpGateway;
pub use memory::MemoryGateway;

#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// Fetch word-tokenized book content. Fails with `ContentUnavailable`.
    async fn fetch_content(
        &self,
        book_id: &str,
        book_type: BookType,
        title: Option<&str>,
    ) -> ReaderResult<BookContent>;

    /// Fetch the body of a single chapter. Fails with `ContentUnavailable`.
    async fn fetch_chapter(&self, book_id: &str, chapter_id: &str) -> ReaderResult<ChapterContent>;

    /// Translate one word. Fails with `TranslationFailed`.
    async fn translate(
        &self,
        word: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> ReaderResult<String>;

    /// Persist a word to the user's vocabulary. Fails with `SaveFailed`.
    async fn save_word(&self, user_id: &str, request: &SaveWordRequest) -> ReaderResult<SavedWord>;

    /// Store the reading position (fraction of the book). Fails with
    /// `PersistenceFailed`.
    async fn update_progress(&self, user_id: &str, book_id: &str, position: f64)
    -> ReaderResult<()>;

    async fn user_words(&self, user_id: &str) -> ReaderResult<Vec<SavedWord>>;

    async fn delete_word(&self, user_id: &str, word_id: &str) -> ReaderResult<()>;

    async fn featured_books(&self) -> ReaderResult<Vec<BookSummary>>;

    async fn user_books(&self, user_id: &str) -> ReaderResult<Vec<BookSummary>>;

    async fn submit_practice(
        &self,
        user_id: &str,
        results: &[PracticeResult],
        game_type: &str,
    ) -> ReaderResult<()>;
}
