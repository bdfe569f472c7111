//! Interactive reader on the terminal

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::navigation::NavOutcome;
use super::session::{Key, OpenBook, ReaderSession, SessionOptions};
use super::settings::SettingsPatch;
use super::translation::{Anchor, WorkflowState};
use crate::cli::ReadArgs;
use crate::config::Config;
use crate::content::cache::ContentCache;
use crate::content::loader::ContentLoader;
use crate::content::{BookContent, BookType, ContentMetadata};
use crate::gateway::{ContentGateway, HttpGateway, MemoryGateway};
use crate::text::{clean_text, detect_language};

/// Words shown around the cursor
const VIEW_RADIUS: usize = 6;
const OFFLINE_USER: &str = "local";

const HELP: &str = "\
  <enter>      reveal the word, then save it, then move on
  n, p         next / previous word
  j <number>   jump to word, counting from 1 as shown
  c <id>       go to chapter, `c` alone lists chapters
  t            translate the current word
  s            save the revealed word
  x            close the translation
  f <size>     font size
  q            quit";

pub async fn run(args: ReadArgs) -> Result<()> {
    let config = Config::load()?;
    let mut options = SessionOptions::from_config(&config);

    let (loader, book) = match &args.file {
        Some(path) => {
            // Saved words and progress stay in memory for the run.
            options.user_id = Some(OFFLINE_USER.to_string());
            offline_book(path)?
        }
        None => {
            let gateway: Arc<dyn ContentGateway> = Arc::new(HttpGateway::new(&config.api)?);
            let cache = if args.no_cache {
                None
            } else {
                match ContentCache::open_configured(&config.cache) {
                    Ok(cache) => cache.map(Arc::new),
                    Err(e) => {
                        warn!("Content cache unavailable: {:#}", e);
                        None
                    }
                }
            };
            let book_type = if args.custom {
                BookType::Custom
            } else {
                BookType::Featured
            };
            let mut book = OpenBook::new(args.book.as_deref().unwrap_or_default(), book_type);
            book.title = args.title.clone();
            (ContentLoader::new(gateway, cache), book)
        }
    };

    let mut book = book.at_word(args.word.saturating_sub(1));
    book.initial_chapter = args.chapter.clone();

    let mut session = ReaderSession::new(loader, options);
    session.open(book).await?;

    println!("{}", "[Read] Type h for help".green());
    render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (cmd, arg) = match line.split_once(' ') {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => session.handle_key(Key::Enter).await,
            "n" => session.handle_key(Key::ArrowRight).await,
            "p" => session.handle_key(Key::ArrowLeft).await,
            "j" => match arg.parse::<usize>() {
                Ok(number) if number > 0 => {
                    session.jump_to(number - 1).await;
                }
                _ => println!("{}", "Usage: j <number>, counting from 1".yellow()),
            },
            "c" if arg.is_empty() => {
                list_chapters(&session);
                continue;
            }
            "c" => {
                if session.go_to_chapter(arg).await == NavOutcome::Unchanged {
                    println!("{}", format!("No chapter {}", arg).yellow());
                }
            }
            "t" => {
                let index = session.state().position().word_index;
                session.select_word(index, Anchor::default()).await;
            }
            "s" => match session.save_selected().await {
                Ok(Some(word)) => println!(
                    "{}",
                    format!("[Saved] {} (seen {} times)", word.original, word.times_encountered)
                        .green()
                ),
                Ok(None) => {}
                Err(e) => println!("{}", format!("[WARN] {}", e).yellow()),
            },
            "x" => session.close_translation(),
            "f" => match arg.parse::<u32>() {
                Ok(size) => {
                    session.update_settings(SettingsPatch::font_size(size));
                    println!("Font size {}", session.state().settings().font_size);
                }
                Err(_) => println!("{}", "Usage: f <size>".yellow()),
            },
            "h" | "?" => {
                println!("{}", HELP);
                continue;
            }
            "q" => break,
            other => {
                println!("{}", format!("Unknown command: {} (h for help)", other).yellow());
                continue;
            }
        }

        render(&session);
    }

    session.close().await;
    let position = session.state().position();
    println!(
        "{}",
        format!(
            "[Read] Stopped at word {} ({:.1}%)",
            position.word_index + 1,
            position.percentage * 100.0
        )
        .green()
    );
    Ok(())
}

/// A local text file served through the in-memory gateway. There is no
/// dictionary offline, so lookups report a failed translation.
fn offline_book(path: &Path) -> Result<(ContentLoader, OpenBook)> {
    let text = fs::read_to_string(path)
        .context(format!("Failed to read book file: {}", path.display()))?;
    let text = clean_text(&text);

    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "local".to_string());

    let mut content = BookContent::from_text(&text);
    content.metadata = Some(ContentMetadata {
        title: Some(title.clone()),
        language: Some(detect_language(&text).to_string()),
        ..Default::default()
    });

    let gateway = Arc::new(MemoryGateway::new().with_book(&title, content));
    Ok((
        ContentLoader::new(gateway, None),
        OpenBook::new(&title, BookType::Custom),
    ))
}

fn render(session: &ReaderSession) {
    let state = session.state();

    if let Some(error) = state.error() {
        println!("{}", format!("[Error] {}", error).red());
    }

    let words = state.words();
    if words.is_empty() {
        println!("{}", "(no content)".dimmed());
        return;
    }

    let position = state.position();
    let index = position.word_index;
    let start = index.saturating_sub(VIEW_RADIUS);
    let end = (index + VIEW_RADIUS + 1).min(words.len());

    let line: Vec<String> = (start..end)
        .map(|i| {
            let word = &words[i];
            if i == index {
                word.bold().underline().to_string()
            } else if state.is_saved(word) {
                word.cyan().to_string()
            } else {
                word.to_string()
            }
        })
        .collect();

    let chapter = state
        .current_chapter()
        .map(|c| format!(" {}", c.title))
        .unwrap_or_default();
    println!(
        "{} {}",
        format!(
            "[{}/{} {:.1}%{}]",
            index + 1,
            words.len(),
            position.percentage * 100.0,
            chapter
        )
        .dimmed(),
        line.join(" ")
    );

    let popup = session.translation();
    match popup.state {
        WorkflowState::Idle => {}
        WorkflowState::RevealedLoading => println!("  {} ...", popup.selected_word),
        WorkflowState::RevealedReady | WorkflowState::Saved => {
            let text = if popup.failed {
                popup.text.red().to_string()
            } else {
                popup.text.green().to_string()
            };
            let marker = if popup.state == WorkflowState::Saved {
                " [saved]".cyan().to_string()
            } else {
                String::new()
            };
            println!("  {} = {}{}", popup.selected_word.bold(), text, marker);
            if !popup.context.is_empty() {
                println!("  \"{}\"", popup.context.dimmed());
            }
            if let Some(e) = &popup.save_error {
                println!("  {}", format!("Save failed: {}", e).yellow());
            }
        }
    }
}

fn list_chapters(session: &ReaderSession) {
    let chapters = session.state().chapters();
    if chapters.is_empty() {
        println!("{}", "This book has no chapters".yellow());
        return;
    }
    let current = session.state().current_chapter().map(|c| c.id.as_str());
    for chapter in chapters {
        let marker = if Some(chapter.id.as_str()) == current { "*" } else { " " };
        println!("  {} {}  {}", marker, chapter.id.dimmed(), chapter.title);
    }
}
