//! In-process gateway for offline reading of local files
//!
//! Holds books, chapters, a small translation dictionary and the saved
//! vocabulary in memory. The offline reader starts with an empty
//! dictionary, so its lookups fail. Translate, save and progress writes
//! can each be switched to fail.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::ContentGateway;
use crate::content::{BookContent, BookSummary, BookType, ChapterContent};
use crate::error::{ReaderError, ReaderResult};
use crate::practice::PracticeResult;
use crate::vocabulary::{SaveWordRequest, SavedWord};

#[derive(Default)]
pub struct MemoryGateway {
    books: Mutex<HashMap<String, BookContent>>,
    chapters: Mutex<HashMap<(String, String), ChapterContent>>,
    dictionary: Mutex<HashMap<String, String>>,
    words: Mutex<Vec<SavedWord>>,
    progress: Mutex<Vec<(String, f64)>>,
    practice: Mutex<Vec<PracticeResult>>,
    fetches: Mutex<Vec<String>>,
    fail_translate: AtomicBool,
    fail_save: AtomicBool,
    fail_progress: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(self, book_id: &str, content: BookContent) -> Self {
        lock(&self.books).insert(book_id.to_string(), content);
        self
    }

    pub fn with_chapter(self, book_id: &str, chapter: ChapterContent) -> Self {
        lock(&self.chapters).insert((book_id.to_string(), chapter.id.clone()), chapter);
        self
    }

    pub fn with_translation(self, word: &str, translation: &str) -> Self {
        lock(&self.dictionary).insert(word.to_lowercase(), translation.to_string());
        self
    }

    pub fn with_words(self, words: Vec<SavedWord>) -> Self {
        *lock(&self.words) = words;
        self
    }

    pub fn fail_translate(&self, fail: bool) {
        self.fail_translate.store(fail, Ordering::SeqCst);
    }

    pub fn fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_progress(&self, fail: bool) {
        self.fail_progress.store(fail, Ordering::SeqCst);
    }

    pub fn saved_words(&self) -> Vec<SavedWord> {
        lock(&self.words).clone()
    }

    pub fn progress_writes(&self) -> Vec<(String, f64)> {
        lock(&self.progress).clone()
    }

    pub fn practice_results(&self) -> Vec<PracticeResult> {
        lock(&self.practice).clone()
    }

    /// Book and chapter ids requested so far, in order.
    pub fn fetch_log(&self) -> Vec<String> {
        lock(&self.fetches).clone()
    }
}

#[async_trait]
impl ContentGateway for MemoryGateway {
    async fn fetch_content(
        &self,
        book_id: &str,
        _book_type: BookType,
        title: Option<&str>,
    ) -> ReaderResult<BookContent> {
        lock(&self.fetches).push(book_id.to_string());
        let books = lock(&self.books);
        books
            .get(book_id)
            .or_else(|| {
                let title = title?;
                books.values().find(|b| b.title() == Some(title))
            })
            .cloned()
            .ok_or_else(|| ReaderError::content(format!("Book {} not found", book_id)))
    }

    async fn fetch_chapter(&self, book_id: &str, chapter_id: &str) -> ReaderResult<ChapterContent> {
        lock(&self.fetches).push(format!("{}/{}", book_id, chapter_id));
        lock(&self.chapters)
            .get(&(book_id.to_string(), chapter_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                ReaderError::content(format!("Chapter {} of {} not found", chapter_id, book_id))
            })
    }

    async fn translate(
        &self,
        word: &str,
        _source_lang: Option<&str>,
        _target_lang: &str,
    ) -> ReaderResult<String> {
        if self.fail_translate.load(Ordering::SeqCst) {
            return Err(ReaderError::TranslationFailed("translation disabled".into()));
        }
        lock(&self.dictionary)
            .get(&word.to_lowercase())
            .cloned()
            .ok_or_else(|| ReaderError::TranslationFailed(format!("No translation for {}", word)))
    }

    async fn save_word(&self, _user_id: &str, request: &SaveWordRequest) -> ReaderResult<SavedWord> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(ReaderError::SaveFailed("saving disabled".into()));
        }

        let lemma = request.word.to_lowercase();
        let translation = lock(&self.dictionary).get(&lemma).cloned().unwrap_or_default();
        let mut words = lock(&self.words);

        if let Some(existing) = words.iter_mut().find(|w| w.lemma == lemma) {
            existing.record_encounter(request);
            return Ok(existing.clone());
        }

        let id = format!("w{}", words.len() + 1);
        let word = SavedWord::first_encounter(&id, request, &translation);
        words.push(word.clone());
        Ok(word)
    }

    async fn update_progress(
        &self,
        _user_id: &str,
        book_id: &str,
        position: f64,
    ) -> ReaderResult<()> {
        if self.fail_progress.load(Ordering::SeqCst) {
            return Err(ReaderError::PersistenceFailed("progress disabled".into()));
        }
        lock(&self.progress).push((book_id.to_string(), position));
        Ok(())
    }

    async fn user_words(&self, _user_id: &str) -> ReaderResult<Vec<SavedWord>> {
        Ok(self.saved_words())
    }

    async fn delete_word(&self, _user_id: &str, word_id: &str) -> ReaderResult<()> {
        let mut words = lock(&self.words);
        let before = words.len();
        words.retain(|w| w.id != word_id);
        if words.len() == before {
            return Err(ReaderError::Gateway(format!("Word {} not found", word_id)));
        }
        Ok(())
    }

    async fn featured_books(&self) -> ReaderResult<Vec<BookSummary>> {
        Ok(Vec::new())
    }

    async fn user_books(&self, _user_id: &str) -> ReaderResult<Vec<BookSummary>> {
        Ok(Vec::new())
    }

    async fn submit_practice(
        &self,
        _user_id: &str,
        results: &[PracticeResult],
        _game_type: &str,
    ) -> ReaderResult<()> {
        let mut words = lock(&self.words);
        for result in results {
            if let Some(word) = words.iter_mut().find(|w| w.id == result.word_id) {
                word.record_practice(result.correct);
            }
        }
        lock(&self.practice).extend_from_slice(results);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(word: &str) -> SaveWordRequest {
        SaveWordRequest {
            word: word.to_string(),
            context: format!("a {} here", word),
            book_id: "b1".to_string(),
            position: 1,
            language: "ru".to_string(),
        }
    }

    #[tokio::test]
    async fn test_translate_switch() {
        let gateway = MemoryGateway::new().with_translation("дом", "house");
        assert_eq!(gateway.translate("Дом", None, "en").await.unwrap(), "house");

        gateway.fail_translate(true);
        assert!(matches!(
            gateway.translate("дом", None, "en").await,
            Err(ReaderError::TranslationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_dictionary_fails_lookup() {
        let gateway = MemoryGateway::new();
        assert!(gateway.translate("word", None, "en").await.is_err());
    }

    #[tokio::test]
    async fn test_practice_updates_seeded_words() {
        let word = SavedWord::first_encounter("w1", &request("кот"), "cat");
        let gateway = MemoryGateway::new().with_words(vec![word]);

        let results = vec![PracticeResult {
            word_id: "w1".to_string(),
            correct: true,
            attempt_count: 1,
            time_spent: 4,
            mistakes: Vec::new(),
        }];
        gateway.submit_practice("u1", &results, "spelling").await.unwrap();

        assert_eq!(gateway.practice_results(), results);
        let words = gateway.user_words("u1").await.unwrap();
        assert_eq!(words[0].successful_recalls, 1);
        assert_eq!(words[0].expertise_level, 5);
    }
}
