//! Local content cache using SQLite
//!
//! Whole-record replacement keyed by book id (and chapter id for chapter
//! bodies), so readers of different books never interfere.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{BookContent, ChapterContent};
use crate::config::{APP_NAME, CacheConfig};

pub struct ContentCache {
    conn: Mutex<Connection>,
}

#[derive(Debug, Clone)]
pub struct CachedBook {
    pub book_id: String,
    pub title: Option<String>,
    pub word_count: usize,
    pub updated_at: i64,
}

impl ContentCache {
    /// Open the cache at the default location, or `path` if given.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::cache_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path).context("Failed to open content cache")?;
        Self::init(conn)
    }

    /// `None` when caching is switched off in the config.
    pub fn open_configured(config: &CacheConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::open(config.path.as_deref().map(Path::new)).map(Some)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open content cache")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                book_id TEXT PRIMARY KEY,
                title TEXT,
                word_count INTEGER NOT NULL,
                content TEXT NOT NULL,
                updated_at INTEGER DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS chapters (
                book_id TEXT NOT NULL,
                chapter_id TEXT NOT NULL,
                content TEXT NOT NULL,
                PRIMARY KEY (book_id, chapter_id)
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Content cache lock poisoned"))
    }

    pub fn get(&self, book_id: &str) -> Result<Option<BookContent>> {
        let raw: Option<String> = self
            .conn()?
            .query_row(
                "SELECT content FROM books WHERE book_id = ?1",
                params![book_id],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| serde_json::from_str(&json).context("Corrupt cached book content"))
            .transpose()
    }

    pub fn put(&self, book_id: &str, content: &BookContent) -> Result<()> {
        let json = serde_json::to_string(content).context("Failed to serialize book content")?;
        self.conn()?.execute(
            "INSERT OR REPLACE INTO books (book_id, title, word_count, content, updated_at)
             VALUES (?1, ?2, ?3, ?4, strftime('%s', 'now'))",
            params![book_id, content.title(), content.word_count() as i64, json],
        )?;
        Ok(())
    }

    pub fn contains(&self, book_id: &str) -> Result<bool> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM books WHERE book_id = ?1",
            params![book_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove a book and its chapters. Returns whether the book was cached.
    pub fn remove(&self, book_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM chapters WHERE book_id = ?1", params![book_id])?;
        let removed = conn.execute("DELETE FROM books WHERE book_id = ?1", params![book_id])?;
        Ok(removed > 0)
    }

    pub fn get_chapter(&self, book_id: &str, chapter_id: &str) -> Result<Option<ChapterContent>> {
        let raw: Option<String> = self
            .conn()?
            .query_row(
                "SELECT content FROM chapters WHERE book_id = ?1 AND chapter_id = ?2",
                params![book_id, chapter_id],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|json| serde_json::from_str(&json).context("Corrupt cached chapter content"))
            .transpose()
    }

    pub fn put_chapter(&self, book_id: &str, chapter: &ChapterContent) -> Result<()> {
        let json = serde_json::to_string(chapter).context("Failed to serialize chapter")?;
        self.conn()?.execute(
            "INSERT OR REPLACE INTO chapters (book_id, chapter_id, content) VALUES (?1, ?2, ?3)",
            params![book_id, chapter.id, json],
        )?;
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<CachedBook>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT book_id, title, word_count, updated_at FROM books ORDER BY updated_at DESC",
        )?;
        let books = stmt
            .query_map([], |row| {
                Ok(CachedBook {
                    book_id: row.get(0)?,
                    title: row.get(1)?,
                    word_count: row.get::<_, i64>(2)? as usize,
                    updated_at: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(books)
    }

    pub fn clear(&self) -> Result<usize> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM chapters", [])?;
        let removed = conn.execute("DELETE FROM books", [])?;
        Ok(removed)
    }

    pub fn cache_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .context("Failed to find cache directory")?
            .join(APP_NAME);
        Ok(cache_dir.join("content.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentMetadata;

    fn sample() -> BookContent {
        let mut content = BookContent::from_text("the quick brown fox");
        content.metadata = Some(ContentMetadata {
            title: Some("Fox".into()),
            ..Default::default()
        });
        content
    }

    #[test]
    fn test_put_then_get() {
        let cache = ContentCache::open_in_memory().unwrap();
        assert!(cache.get("b1").unwrap().is_none());

        cache.put("b1", &sample()).unwrap();
        assert_eq!(cache.get("b1").unwrap(), Some(sample()));
        assert!(cache.contains("b1").unwrap());
        assert!(!cache.contains("b2").unwrap());
    }

    #[test]
    fn test_put_replaces_whole_record() {
        let cache = ContentCache::open_in_memory().unwrap();
        cache.put("b1", &sample()).unwrap();
        cache.put("b1", &BookContent::from_text("jumps")).unwrap();

        let stored = cache.get("b1").unwrap().unwrap();
        assert_eq!(stored.words, vec!["jumps"]);
        assert!(stored.metadata.is_none());
        assert_eq!(cache.list().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_drops_chapters() {
        let cache = ContentCache::open_in_memory().unwrap();
        cache.put("b1", &sample()).unwrap();
        let chapter = ChapterContent {
            id: "ch1".into(),
            title: "One".into(),
            content: "a b".into(),
            html_content: None,
            words: vec!["a".into(), "b".into()],
            index: 0,
            prev: None,
            next: None,
        };
        cache.put_chapter("b1", &chapter).unwrap();
        assert_eq!(cache.get_chapter("b1", "ch1").unwrap(), Some(chapter));

        assert!(cache.remove("b1").unwrap());
        assert!(!cache.remove("b1").unwrap());
        assert!(cache.get_chapter("b1", "ch1").unwrap().is_none());
    }

    #[test]
    fn test_list_and_clear() {
        let cache = ContentCache::open_in_memory().unwrap();
        cache.put("b1", &sample()).unwrap();
        cache.put("b2", &BookContent::from_text("x y z")).unwrap();

        let listed = cache.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|b| b.title.as_deref() == Some("Fox")));

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(cache.list().unwrap().is_empty());
    }
}
