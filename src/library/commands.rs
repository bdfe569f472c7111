//! Library command handler

use anyhow::Result;
use colored::Colorize;

use super::{LibraryFilter, LibraryView};
use crate::cli::LibraryArgs;
use crate::config::Config;
use crate::content::BookSummary;
use crate::gateway::{ContentGateway, HttpGateway};
use crate::text::truncate_display;
use crate::vocabulary::SortDirection;

pub async fn run(args: LibraryArgs) -> Result<()> {
    let config = Config::load()?;
    let gateway = HttpGateway::new(&config.api)?;

    let books = if args.featured {
        gateway.featured_books().await?
    } else {
        gateway.user_books(config.require_user()?).await?
    };

    let mut view = LibraryView::new(books);
    view.set_filter(LibraryFilter {
        search: args.search.unwrap_or_default(),
        language: args.language,
        format: args.format,
        sort_by: args.sort,
        direction: if args.asc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        },
    });

    let books = view.filtered();
    let heading = if args.featured { "Featured" } else { "Your books" };
    println!(
        "{}",
        format!("[Library] {}: {} of {}", heading, books.len(), view.books().len()).green()
    );

    for book in books {
        print_book(book);
    }

    Ok(())
}

fn print_book(book: &BookSummary) {
    let progress = book
        .last_position
        .map(|p| format!("{:.0}%", p * 100.0))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {}  {}  {} [{} {}] {}",
        book.id.dimmed(),
        truncate_display(&book.title, 40).bold(),
        book.author.as_deref().unwrap_or("Unknown author"),
        book.language,
        book.format.as_str(),
        progress.cyan()
    );
}
