//! Client-side library view over book summaries

pub mod commands;

use std::cmp::Ordering;
use std::str::FromStr;

use crate::content::{BookFormat, BookSummary};
use crate::vocabulary::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSort {
    Title,
    #[default]
    UploadDate,
    LastRead,
}

impl FromStr for BookSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "title" => Ok(Self::Title),
            "uploaddate" => Ok(Self::UploadDate),
            "lastread" => Ok(Self::LastRead),
            _ => Err(format!("unknown sort {} (title, upload-date, last-read)", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryFilter {
    pub search: String,
    pub language: Option<String>,
    pub format: Option<BookFormat>,
    pub sort_by: BookSort,
    pub direction: SortDirection,
}

/// Partial book update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub last_position: Option<f64>,
    pub last_read: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Default)]
pub struct LibraryView {
    books: Vec<BookSummary>,
    filter: LibraryFilter,
}

impl LibraryView {
    pub fn new(books: Vec<BookSummary>) -> Self {
        Self {
            books,
            filter: LibraryFilter::default(),
        }
    }

    pub fn books(&self) -> &[BookSummary] {
        &self.books
    }

    pub fn filter(&self) -> &LibraryFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: LibraryFilter) {
        self.filter = filter;
    }

    /// Newly uploaded books go to the front.
    pub fn add(&mut self, book: BookSummary) {
        self.books.insert(0, book);
    }

    pub fn update(&mut self, book_id: &str, patch: BookPatch) -> bool {
        let Some(book) = self.books.iter_mut().find(|b| b.id == book_id) else {
            return false;
        };
        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(author) = patch.author {
            book.author = Some(author);
        }
        if let Some(language) = patch.language {
            book.language = language;
        }
        if let Some(position) = patch.last_position {
            book.last_position = Some(position);
        }
        if let Some(last_read) = patch.last_read {
            book.last_read = Some(last_read);
        }
        true
    }

    pub fn delete(&mut self, book_id: &str) -> bool {
        let before = self.books.len();
        self.books.retain(|b| b.id != book_id);
        before != self.books.len()
    }

    pub fn filtered(&self) -> Vec<&BookSummary> {
        let needle = self.filter.search.to_lowercase();
        let mut books: Vec<&BookSummary> = self
            .books
            .iter()
            .filter(|b| {
                needle.is_empty()
                    || b.title.to_lowercase().contains(&needle)
                    || b
                        .author
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .filter(|b| {
                self.filter
                    .language
                    .as_deref()
                    .is_none_or(|lang| b.language.eq_ignore_ascii_case(lang))
            })
            .filter(|b| self.filter.format.is_none_or(|f| b.format == f))
            .collect();

        let LibraryFilter {
            sort_by, direction, ..
        } = self.filter;
        books.sort_by(|a, b| {
            let ord = compare_books(a, b, sort_by);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        books
    }
}

/// Ascending order: A-Z, oldest first. Missing dates sort first.
fn compare_books(a: &BookSummary, b: &BookSummary, sort_by: BookSort) -> Ordering {
    match sort_by {
        BookSort::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        BookSort::UploadDate => a.upload_date.cmp(&b.upload_date),
        BookSort::LastRead => a.last_read.cmp(&b.last_read),
    }
}
