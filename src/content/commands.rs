//! Cache command handlers

use anyhow::{Result, bail};
use chrono::DateTime;
use colored::Colorize;
use std::path::Path;

use super::cache::ContentCache;
use crate::cli::{CacheAction, CacheArgs};
use crate::config::Config;

pub fn run(args: CacheArgs) -> Result<()> {
    let config = Config::load()?;
    let custom_path = config.cache.path.as_deref().map(Path::new);

    if let CacheAction::Path = args.action {
        let path = match custom_path {
            Some(p) => p.to_path_buf(),
            None => ContentCache::cache_path()?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    let cache = ContentCache::open(custom_path)?;

    match args.action {
        CacheAction::List => {
            let books = cache.list()?;
            println!("{}", format!("[Cache] {} books", books.len()).green());
            for book in books {
                let updated = DateTime::from_timestamp(book.updated_at, 0)
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "  {}  {}  {} words  {}",
                    book.book_id.dimmed(),
                    book.title.as_deref().unwrap_or("(untitled)"),
                    book.word_count,
                    updated
                );
            }
        }
        CacheAction::Remove { id } => {
            if !cache.remove(&id)? {
                bail!("Book {} is not cached", id);
            }
            println!("{}", format!("[Cache] Removed {}", id).green());
        }
        CacheAction::Clear => {
            let removed = cache.clear()?;
            println!("{}", format!("[Cache] Cleared {} books", removed).green());
        }
        CacheAction::Path => {}
    }

    Ok(())
}
