//! Reading session state: settings, position, content and chapter table

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::settings::{ReaderSettings, SettingsPatch};
use crate::content::{BookContent, Chapter};
use crate::error::ReaderError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPosition {
    pub word_index: usize,
    /// Always `word_index / word_count`; recomputed, never set on its own.
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
}

impl ReadingPosition {
    pub fn at(word_index: usize) -> Self {
        Self {
            word_index,
            ..Default::default()
        }
    }

    pub fn in_chapter(word_index: usize, chapter_id: &str) -> Self {
        Self {
            word_index,
            percentage: 0.0,
            chapter_id: Some(chapter_id.to_string()),
        }
    }

    /// Clamp to `[0, word_count - 1]` and derive the percentage.
    fn normalized(mut self, word_count: usize) -> Self {
        if word_count == 0 {
            self.word_index = 0;
            self.percentage = 0.0;
        } else {
            self.word_index = self.word_index.min(word_count - 1);
            self.percentage = self.word_index as f64 / word_count as f64;
        }
        self
    }
}

#[derive(Debug, Default)]
pub struct ReaderState {
    settings: ReaderSettings,
    position: ReadingPosition,
    content: Option<BookContent>,
    current_chapter: Option<Chapter>,
    chapters: Vec<Chapter>,
    current_word: Option<String>,
    saved_words: HashSet<String>,
    error: Option<ReaderError>,
}

impl ReaderState {
    pub fn new(settings: ReaderSettings) -> Self {
        Self {
            settings: settings.sanitized(),
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &ReaderSettings {
        &self.settings
    }

    pub fn position(&self) -> &ReadingPosition {
        &self.position
    }

    pub fn content(&self) -> Option<&BookContent> {
        self.content.as_ref()
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.current_chapter.as_ref()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn current_word(&self) -> Option<&str> {
        self.current_word.as_deref()
    }

    pub fn word_count(&self) -> usize {
        self.content.as_ref().map_or(0, BookContent::word_count)
    }

    pub fn words(&self) -> &[String] {
        self.content.as_ref().map(|c| c.words.as_slice()).unwrap_or(&[])
    }

    pub fn error(&self) -> Option<&ReaderError> {
        self.error.as_ref()
    }

    pub fn set_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
    }

    /// Store a new position, clamped to the loaded content, and refresh the
    /// derived current word.
    pub fn set_position(&mut self, position: ReadingPosition) {
        self.position = position.normalized(self.word_count());
        self.refresh_current_word();
    }

    /// Replace the content wholesale and reconcile the position against it.
    pub fn set_content(&mut self, content: BookContent) {
        self.content = Some(content);
        let position = std::mem::take(&mut self.position);
        self.set_position(position);
    }

    pub fn set_chapter(&mut self, chapter: Chapter) {
        self.current_chapter = Some(chapter);
    }

    pub fn clear_chapter(&mut self) {
        self.current_chapter = None;
    }

    pub fn set_chapters(&mut self, chapters: Vec<Chapter>) {
        self.chapters = chapters;
    }

    pub fn find_chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    pub fn set_error(&mut self, error: Option<ReaderError>) {
        self.error = error;
    }

    pub fn mark_saved(&mut self, word: &str) {
        self.saved_words.insert(word.to_lowercase());
    }

    pub fn is_saved(&self, word: &str) -> bool {
        self.saved_words.contains(&word.to_lowercase())
    }

    fn refresh_current_word(&mut self) {
        self.current_word = self
            .content
            .as_ref()
            .and_then(|c| c.words.get(self.position.word_index))
            .cloned();
    }
}
