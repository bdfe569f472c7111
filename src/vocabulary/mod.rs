//! Saved words and the client-side vocabulary view

pub mod commands;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

pub const MAX_EXPERTISE: u8 = 100;
pub const LEARNING_THRESHOLD: u8 = 30;
pub const MASTERED_THRESHOLD: u8 = 80;

/// Parameters sent to the gateway when a word is saved from the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWordRequest {
    pub word: String,
    pub context: String,
    pub book_id: String,
    pub position: usize,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordContext {
    pub text: String,
    pub book_id: String,
    pub position: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_used: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordForm {
    pub word: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub morphology: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    pub id: String,
    pub original: String,
    #[serde(default)]
    pub lemma: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub expertise_level: u8,
    #[serde(default)]
    pub times_encountered: u32,
    #[serde(default)]
    pub successful_recalls: u32,
    #[serde(default)]
    pub mistake_count: u32,
    #[serde(default)]
    pub language: String,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub last_practiced: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contexts: Vec<WordContext>,
    #[serde(default)]
    pub forms: Vec<WordForm>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SavedWord {
    /// First save of a word: one encounter, one context snippet.
    pub fn first_encounter(id: &str, request: &SaveWordRequest, translation: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            original: request.word.clone(),
            lemma: request.word.to_lowercase(),
            translation: translation.to_string(),
            part_of_speech: None,
            expertise_level: 0,
            times_encountered: 1,
            successful_recalls: 0,
            mistake_count: 0,
            language: request.language.clone(),
            last_seen: now,
            last_practiced: None,
            next_review_date: None,
            contexts: vec![WordContext {
                text: request.context.clone(),
                book_id: request.book_id.clone(),
                position: request.position,
                form_used: None,
                timestamp: now,
            }],
            forms: Vec::new(),
            tags: Vec::new(),
            notes: None,
        }
    }

    /// A later save of an already-known word.
    pub fn record_encounter(&mut self, request: &SaveWordRequest) {
        let now = Utc::now();
        self.times_encountered += 1;
        self.last_seen = now;
        self.contexts.push(WordContext {
            text: request.context.clone(),
            book_id: request.book_id.clone(),
            position: request.position,
            form_used: (request.word != self.original).then(|| request.word.clone()),
            timestamp: now,
        });
    }

    /// Apply a practice outcome: +5 on recall, -2 on mistake, within 0..=100.
    pub fn record_practice(&mut self, correct: bool) {
        if correct {
            self.expertise_level = self.expertise_level.saturating_add(5).min(MAX_EXPERTISE);
            self.successful_recalls += 1;
        } else {
            self.expertise_level = self.expertise_level.saturating_sub(2);
            self.mistake_count += 1;
        }
        self.last_practiced = Some(Utc::now());
    }

    pub fn bucket(&self) -> ExpertiseBucket {
        ExpertiseBucket::of(self.expertise_level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseBucket {
    #[default]
    All,
    New,
    Learning,
    Mastered,
}

impl ExpertiseBucket {
    pub fn of(level: u8) -> Self {
        if level < LEARNING_THRESHOLD {
            Self::New
        } else if level < MASTERED_THRESHOLD {
            Self::Learning
        } else {
            Self::Mastered
        }
    }

    pub fn matches(&self, level: u8) -> bool {
        *self == Self::All || *self == Self::of(level)
    }
}

impl FromStr for ExpertiseBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "new" => Ok(Self::New),
            "learning" => Ok(Self::Learning),
            "mastered" => Ok(Self::Mastered),
            _ => Err(format!("unknown level {} (all, new, learning, mastered)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordSort {
    #[default]
    LastSeen,
    ExpertiseLevel,
    Alphabetical,
}

impl FromStr for WordSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "lastseen" => Ok(Self::LastSeen),
            "expertise" | "expertiselevel" => Ok(Self::ExpertiseLevel),
            "alpha" | "alphabetical" => Ok(Self::Alphabetical),
            _ => Err(format!("unknown sort {} (last-seen, expertise, alphabetical)", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFilter {
    pub search: String,
    pub bucket: ExpertiseBucket,
    pub sort_by: WordSort,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFilterPatch {
    pub search: Option<String>,
    pub bucket: Option<ExpertiseBucket>,
    pub sort_by: Option<WordSort>,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VocabularyStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub mastered: usize,
    pub last_practiced: Option<DateTime<Utc>>,
    pub average_expertise: f64,
}

impl VocabularyStats {
    pub fn compute(words: &[SavedWord]) -> Self {
        let mut stats = Self {
            total: words.len(),
            ..Default::default()
        };
        for word in words {
            match word.bucket() {
                ExpertiseBucket::New => stats.new += 1,
                ExpertiseBucket::Learning => stats.learning += 1,
                _ => stats.mastered += 1,
            }
        }
        stats.last_practiced = words.iter().filter_map(|w| w.last_practiced).max();
        if !words.is_empty() {
            let sum: u32 = words.iter().map(|w| w.expertise_level as u32).sum();
            stats.average_expertise = sum as f64 / words.len() as f64;
        }
        stats
    }
}

/// Client-side vocabulary view. The filtered list and statistics are kept in
/// step with every mutation.
#[derive(Debug, Default)]
pub struct VocabularyView {
    words: Vec<SavedWord>,
    filtered: Vec<usize>,
    filter: WordFilter,
    selected: Option<String>,
    stats: VocabularyStats,
}

impl VocabularyView {
    pub fn new(words: Vec<SavedWord>) -> Self {
        let mut view = Self::default();
        view.set_words(words);
        view
    }

    pub fn set_words(&mut self, words: Vec<SavedWord>) {
        self.words = words;
        self.refresh();
    }

    pub fn update_word<F: FnOnce(&mut SavedWord)>(&mut self, word_id: &str, update: F) -> bool {
        let Some(word) = self.words.iter_mut().find(|w| w.id == word_id) else {
            return false;
        };
        update(word);
        self.refresh();
        true
    }

    pub fn delete_word(&mut self, word_id: &str) -> bool {
        let before = self.words.len();
        self.words.retain(|w| w.id != word_id);
        if self.selected.as_deref() == Some(word_id) {
            self.selected = None;
        }
        self.refresh();
        before != self.words.len()
    }

    pub fn select(&mut self, word_id: Option<&str>) {
        self.selected = word_id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&SavedWord> {
        let id = self.selected.as_deref()?;
        self.words.iter().find(|w| w.id == id)
    }

    pub fn set_filter(&mut self, patch: WordFilterPatch) {
        if let Some(search) = patch.search {
            self.filter.search = search;
        }
        if let Some(bucket) = patch.bucket {
            self.filter.bucket = bucket;
        }
        if let Some(sort_by) = patch.sort_by {
            self.filter.sort_by = sort_by;
        }
        if let Some(direction) = patch.direction {
            self.filter.direction = direction;
        }
        self.refresh();
    }

    pub fn filter(&self) -> &WordFilter {
        &self.filter
    }

    pub fn filtered(&self) -> impl Iterator<Item = &SavedWord> {
        self.filtered.iter().map(|&i| &self.words[i])
    }

    pub fn stats(&self) -> &VocabularyStats {
        &self.stats
    }

    pub fn words(&self) -> &[SavedWord] {
        &self.words
    }

    fn refresh(&mut self) {
        let needle = self.filter.search.to_lowercase();
        let mut indices: Vec<usize> = self
            .words
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                needle.is_empty()
                    || w.original.to_lowercase().contains(&needle)
                    || w.lemma.to_lowercase().contains(&needle)
                    || w.translation.to_lowercase().contains(&needle)
            })
            .filter(|(_, w)| self.filter.bucket.matches(w.expertise_level))
            .map(|(i, _)| i)
            .collect();

        let words = &self.words;
        let WordFilter {
            sort_by, direction, ..
        } = self.filter;
        indices.sort_by(|&a, &b| {
            let ord = compare_words(&words[a], &words[b], sort_by);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        self.filtered = indices;
        self.stats = VocabularyStats::compute(&self.words);
    }
}

/// Ascending order: oldest, least expert, A-Z.
fn compare_words(a: &SavedWord, b: &SavedWord, sort_by: WordSort) -> Ordering {
    match sort_by {
        WordSort::LastSeen => a.last_seen.cmp(&b.last_seen),
        WordSort::ExpertiseLevel => a.expertise_level.cmp(&b.expertise_level),
        WordSort::Alphabetical => a.original.to_lowercase().cmp(&b.original.to_lowercase()),
    }
}
