//! Book content model, the local content cache and the loading policy

pub mod cache;
pub mod commands;
pub mod loader;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::text::split_words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookType {
    Featured,
    Custom,
}

impl BookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    Txt,
    Epub,
}

impl FromStr for BookFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "epub" => Ok(Self::Epub),
            _ => Err(format!("unknown format {} (txt, epub)", s)),
        }
    }
}

impl BookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Epub => "epub",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subitems: Vec<Chapter>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl Chapter {
    pub fn new(id: &str, title: &str, index: usize) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            index,
            href: None,
            level: None,
            parent: None,
            subitems: Vec::new(),
            prev: None,
            next: None,
        }
    }

    pub fn with_links(mut self, prev: Option<&str>, next: Option<&str>) -> Self {
        self.prev = prev.map(str::to_string);
        self.next = next.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub chapters: Option<Vec<Chapter>>,
}

/// Parsed, word-tokenized book (or chapter) content. Never patched in place:
/// a chapter change replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookContent {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    pub words: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ContentMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_chapter: Option<String>,
}

impl BookContent {
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            words: split_words(text),
            ..Default::default()
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn chapters(&self) -> &[Chapter] {
        self.metadata
            .as_ref()
            .and_then(|m| m.chapters.as_deref())
            .unwrap_or(&[])
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    pub words: Vec<String>,
    pub index: usize,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl ChapterContent {
    /// Build the content that replaces the session's current content when
    /// this chapter is entered. Book-level metadata is carried over.
    pub fn into_book_content(self, metadata: Option<ContentMetadata>) -> BookContent {
        BookContent {
            text: self.content,
            html_content: self.html_content,
            words: self.words,
            metadata,
            current_chapter: Some(self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub language: String,
    #[serde(rename = "type")]
    pub book_type: BookType,
    pub format: BookFormat,
    #[serde(default)]
    pub last_position: Option<f64>,
    #[serde(default)]
    pub last_read: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_spent: Option<u64>,
}
