//! Reading session: one open book, its navigation, the translation popup
//! and progress write-back, wired to a content gateway and cache.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::navigation::{ChapterEntry, NavOutcome};
use super::progress::ProgressPersister;
use super::settings::{ReaderSettings, SettingsPatch};
use super::state::{ReaderState, ReadingPosition};
use super::translation::{Anchor, Ticket, TranslationState, TranslationWorkflow, WorkflowState};
use crate::config::Config;
use crate::content::BookType;
use crate::content::loader::ContentLoader;
use crate::error::{ReaderError, ReaderResult};
use crate::gateway::ContentGateway;
use crate::vocabulary::{SaveWordRequest, SavedWord};

/// Book id recorded on saved words when the session has none.
const UNKNOWN_BOOK: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct OpenBook {
    pub book_id: String,
    pub book_type: BookType,
    pub title: Option<String>,
    pub initial_word: usize,
    pub initial_chapter: Option<String>,
}

impl OpenBook {
    pub fn new(book_id: &str, book_type: BookType) -> Self {
        Self {
            book_id: book_id.to_string(),
            book_type,
            title: None,
            initial_word: 0,
            initial_chapter: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn at_word(mut self, index: usize) -> Self {
        self.initial_word = index;
        self
    }

    pub fn in_chapter(mut self, chapter_id: &str) -> Self {
        self.initial_chapter = Some(chapter_id.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Without a user, words cannot be saved and progress is not written.
    pub user_id: Option<String>,
    pub progress_quiet: Duration,
    pub source_lang: Option<String>,
    pub target_lang: String,
    /// Language code stored on saved words.
    pub save_language: String,
    pub settings: ReaderSettings,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            user_id: None,
            progress_quiet: Duration::from_millis(3000),
            source_lang: None,
            target_lang: "en".to_string(),
            save_language: "ru".to_string(),
            settings: ReaderSettings::default(),
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_id: config.api.user_id.clone(),
            progress_quiet: Duration::from_millis(config.reader.progress_quiet_ms),
            source_lang: config.translation.source_lang.clone(),
            target_lang: config.translation.target_lang.clone(),
            save_language: config.translation.save_language.clone(),
            settings: config.reader.settings(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Space,
    Enter,
}

/// A translation lookup detached from the session, so it can run while the
/// reader keeps navigating. Apply the result with
/// [`ReaderSession::apply_translation`].
pub struct TranslationRequest {
    pub ticket: Ticket,
    pub word: String,
    gateway: Arc<dyn ContentGateway>,
    source_lang: Option<String>,
    target_lang: String,
}

impl TranslationRequest {
    pub async fn run(self) -> (Ticket, ReaderResult<String>) {
        let result = self
            .gateway
            .translate(&self.word, self.source_lang.as_deref(), &self.target_lang)
            .await;
        (self.ticket, result)
    }
}

pub struct ReaderSession {
    state: ReaderState,
    translation: TranslationWorkflow,
    loader: ContentLoader,
    options: SessionOptions,
    book: Option<OpenBook>,
    progress: Option<ProgressPersister>,
}

impl ReaderSession {
    pub fn new(loader: ContentLoader, options: SessionOptions) -> Self {
        Self {
            state: ReaderState::new(options.settings.clone()),
            translation: TranslationWorkflow::new(),
            loader,
            options,
            book: None,
            progress: None,
        }
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn translation(&self) -> &TranslationState {
        self.translation.state()
    }

    pub fn book(&self) -> Option<&OpenBook> {
        self.book.as_ref()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Load a book and make it current. On failure the error is recorded
    /// and whatever was open before stays as it was.
    pub async fn open(&mut self, book: OpenBook) -> ReaderResult<()> {
        let loaded = self
            .loader
            .load_book(&book.book_id, book.book_type, book.title.as_deref())
            .await;

        let content = match loaded {
            Ok(content) => content,
            Err(e) => {
                warn!("Error loading book {}: {}", book.book_id, e);
                self.state.set_error(Some(e.clone()));
                return Err(e);
            }
        };

        self.close().await;
        self.state.set_error(None);

        let chapters = content.chapters().to_vec();
        let loaded_chapter = content.current_chapter.clone();
        let start = book
            .initial_chapter
            .as_deref()
            .and_then(|id| chapters.iter().find(|c| c.id == id))
            .or_else(|| {
                // The words that came back belong to this chapter.
                loaded_chapter
                    .as_deref()
                    .and_then(|id| chapters.iter().find(|c| c.id == id))
            })
            .or_else(|| chapters.first())
            .cloned();

        info!(
            "Opened {} ({} words, {} chapters)",
            content.title().unwrap_or(&book.book_id),
            content.word_count(),
            chapters.len()
        );

        self.state.set_content(content);
        self.state.set_chapters(chapters);
        self.book = Some(book.clone());

        match start {
            Some(chapter) => {
                let id = chapter.id.clone();
                self.state.set_chapter(chapter);
                let needs_body =
                    book.initial_chapter.is_some() && loaded_chapter.as_deref() != Some(id.as_str());
                if needs_body {
                    self.load_chapter_body(&id, ChapterEntry::Start).await;
                }
                self.state
                    .set_position(ReadingPosition::in_chapter(book.initial_word, &id));
            }
            None => {
                self.state.clear_chapter();
                self.state.set_position(ReadingPosition::at(book.initial_word));
            }
        }

        if let Some(user_id) = self.options.user_id.as_deref() {
            if !book.book_id.is_empty() {
                self.progress = Some(ProgressPersister::new(
                    Arc::clone(self.loader.gateway()),
                    user_id,
                    &book.book_id,
                    self.options.progress_quiet,
                ));
            }
        }
        Ok(())
    }

    pub async fn next(&mut self) -> NavOutcome {
        let outcome = self.state.next();
        self.settle(outcome).await
    }

    pub async fn previous(&mut self) -> NavOutcome {
        let outcome = self.state.previous();
        self.settle(outcome).await
    }

    pub async fn jump_to(&mut self, index: usize) -> NavOutcome {
        let outcome = self.state.jump_to(index);
        self.settle(outcome).await
    }

    /// Enter a chapter from the table by id. Unknown ids leave everything
    /// untouched.
    pub async fn go_to_chapter(&mut self, chapter_id: &str) -> NavOutcome {
        let Some(chapter) = self.state.find_chapter(chapter_id).cloned() else {
            debug!("No chapter {} in table", chapter_id);
            return NavOutcome::Unchanged;
        };
        let outcome = self.state.go_to_chapter(chapter);
        self.settle(outcome).await
    }

    async fn settle(&mut self, outcome: NavOutcome) -> NavOutcome {
        if outcome == NavOutcome::Unchanged {
            return outcome;
        }
        self.translation.reset();
        if let NavOutcome::ChapterChanged { chapter, entry } = &outcome {
            self.load_chapter_body(&chapter.id, *entry).await;
        }
        self.record_progress();
        outcome
    }

    /// Replace the content with the chapter's body. A failed load keeps the
    /// old words on screen and records the error.
    async fn load_chapter_body(&mut self, chapter_id: &str, entry: ChapterEntry) {
        let Some((book_id, book_type)) = self.book.as_ref().map(|b| (b.book_id.clone(), b.book_type))
        else {
            return;
        };

        let loaded = self.loader.load_chapter(&book_id, chapter_id, book_type).await;

        match loaded {
            Ok(body) => {
                let metadata = self.state.content().and_then(|c| c.metadata.clone());
                self.state.set_content(body.into_book_content(metadata));
                if entry == ChapterEntry::End {
                    let last = self.state.word_count().saturating_sub(1);
                    self.state
                        .set_position(ReadingPosition::in_chapter(last, chapter_id));
                }
                self.state.set_error(None);
            }
            Err(e) => {
                warn!("Error loading chapter {} of {}: {}", chapter_id, book_id, e);
                self.state.set_error(Some(e));
            }
        }
    }

    fn record_progress(&mut self) {
        let percentage = self.state.position().percentage;
        if let Some(progress) = self.progress.as_mut() {
            progress.record(percentage);
        }
    }

    /// Reveal the popup for the word at `index` and hand back the lookup to
    /// run. Any earlier lookup still in flight becomes stale.
    pub fn request_translation(&mut self, index: usize, anchor: Anchor) -> Option<TranslationRequest> {
        let ticket = self.translation.select(self.state.words(), index, anchor)?;
        Some(TranslationRequest {
            ticket,
            word: self.translation.state().selected_word.clone(),
            gateway: Arc::clone(self.loader.gateway()),
            source_lang: self.options.source_lang.clone(),
            target_lang: self.options.target_lang.clone(),
        })
    }

    /// Returns `false` when a newer selection has superseded `ticket`.
    pub fn apply_translation(&mut self, ticket: Ticket, result: ReaderResult<String>) -> bool {
        if let Err(e) = &result {
            warn!("Translation error: {}", e);
        }
        self.translation.resolve(ticket, result)
    }

    /// Select and translate in one step.
    pub async fn select_word(&mut self, index: usize, anchor: Anchor) -> Option<&TranslationState> {
        let request = self.request_translation(index, anchor)?;
        let (ticket, result) = request.run().await;
        self.apply_translation(ticket, result);
        Some(self.translation.state())
    }

    /// Save the revealed word. `Ok(None)` means there was nothing to save.
    pub async fn save_selected(&mut self) -> ReaderResult<Option<SavedWord>> {
        let Some(pending) = self.translation.begin_save() else {
            return Ok(None);
        };

        if self.state.is_saved(&pending.word) {
            self.translation.complete_save(pending.ticket, Ok(()));
            return Ok(None);
        }

        let Some(user_id) = self.options.user_id.clone() else {
            let e = ReaderError::SaveFailed("no user signed in".into());
            self.translation.complete_save(pending.ticket, Err(e.clone()));
            return Err(e);
        };

        let request = SaveWordRequest {
            word: pending.word.clone(),
            context: pending.context.clone(),
            book_id: self
                .book
                .as_ref()
                .map(|b| b.book_id.as_str())
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_BOOK)
                .to_string(),
            position: pending.position,
            language: self.options.save_language.clone(),
        };

        match self.loader.gateway().save_word(&user_id, &request).await {
            Ok(saved) => {
                if self.translation.complete_save(pending.ticket, Ok(())) {
                    self.state.mark_saved(&pending.word);
                }
                info!("Saved word {}", pending.word);
                Ok(Some(saved))
            }
            Err(e) => {
                warn!("Error saving word {}: {}", pending.word, e);
                self.translation.complete_save(pending.ticket, Err(e.clone()));
                Err(e)
            }
        }
    }

    pub fn close_translation(&mut self) {
        self.translation.reset();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.state.set_settings(patch);
    }

    /// Right/Left move the cursor. Space/Enter reveal the current word,
    /// then save it, then move on.
    pub async fn handle_key(&mut self, key: Key) {
        match key {
            Key::ArrowRight => {
                self.next().await;
            }
            Key::ArrowLeft => {
                self.previous().await;
            }
            Key::Space | Key::Enter => match self.translation.phase() {
                WorkflowState::Idle => {
                    let index = self.state.position().word_index;
                    self.select_word(index, Anchor::default()).await;
                }
                WorkflowState::RevealedLoading => {}
                WorkflowState::RevealedReady => {
                    if let Err(e) = self.save_selected().await {
                        debug!("Save from keyboard failed: {}", e);
                    }
                }
                WorkflowState::Saved => {
                    self.next().await;
                }
            },
        }
    }

    /// Write the final position and drop the popup. Safe to call twice.
    pub async fn close(&mut self) {
        if let Some(mut progress) = self.progress.take() {
            progress.teardown(self.state.position().percentage).await;
        }
        self.translation.reset();
    }
}
