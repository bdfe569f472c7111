//! Vocabulary command handlers

use anyhow::{Result, bail};
use colored::Colorize;

use super::{
    ExpertiseBucket, SavedWord, SortDirection, VocabularyStats, VocabularyView, WordFilterPatch,
};
use crate::cli::{WordsAction, WordsArgs};
use crate::config::Config;
use crate::gateway::{ContentGateway, HttpGateway};

pub async fn run(args: WordsArgs) -> Result<()> {
    let config = Config::load()?;
    let user_id = config.require_user()?;
    let gateway = HttpGateway::new(&config.api)?;

    let mut view = VocabularyView::new(gateway.user_words(user_id).await?);

    match args.action {
        WordsAction::List {
            search,
            bucket,
            sort,
            asc,
            limit,
        } => {
            view.set_filter(WordFilterPatch {
                search,
                bucket: Some(bucket),
                sort_by: Some(sort),
                direction: Some(if asc {
                    SortDirection::Asc
                } else {
                    SortDirection::Desc
                }),
            });
            list_words(&view, limit);
        }
        WordsAction::Stats => print_stats(view.stats()),
        WordsAction::Show { id } => {
            view.select(Some(&id));
            match view.selected() {
                Some(word) => show_word(word),
                None => bail!("No saved word with id {}", id),
            }
        }
        WordsAction::Delete { id } => {
            if !view.words().iter().any(|w| w.id == id) {
                bail!("No saved word with id {}", id);
            }
            gateway.delete_word(user_id, &id).await?;
            view.delete_word(&id);
            println!("{}", format!("[Words] Deleted {}", id).green());
            print_stats(view.stats());
        }
    }

    Ok(())
}

fn list_words(view: &VocabularyView, limit: Option<usize>) {
    let words: Vec<&SavedWord> = view.filtered().collect();
    println!(
        "{}",
        format!("[Words] {} of {}", words.len(), view.words().len()).green()
    );
    for word in words.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "  {}  {} - {}  {}",
            word.id.dimmed(),
            word.original.bold(),
            word.translation,
            level_label(word).cyan()
        );
    }
}

fn level_label(word: &SavedWord) -> String {
    let bucket = match word.bucket() {
        ExpertiseBucket::New => "new",
        ExpertiseBucket::Learning => "learning",
        _ => "mastered",
    };
    format!("{} ({})", bucket, word.expertise_level)
}

fn show_word(word: &SavedWord) {
    println!("{}", format!("[Words] {}", word.original).green());
    println!("  Translation: {}", word.translation);
    println!("  Lemma:       {}", word.lemma);
    println!("  Level:       {}", level_label(word));
    println!(
        "  Seen {} times, {} recalls, {} mistakes",
        word.times_encountered, word.successful_recalls, word.mistake_count
    );
    println!("  Last seen:   {}", word.last_seen.format("%Y-%m-%d %H:%M"));
    for context in &word.contexts {
        println!("    \"{}\" ({} @ {})", context.text, context.book_id, context.position);
    }
}

fn print_stats(stats: &VocabularyStats) {
    println!("{}", "[Words] Statistics".green());
    println!("  Total:    {}", stats.total);
    println!("  New:      {}", stats.new);
    println!("  Learning: {}", stats.learning);
    println!("  Mastered: {}", stats.mastered);
    println!("  Average expertise: {:.1}", stats.average_expertise);
    match stats.last_practiced {
        Some(at) => println!("  Last practiced: {}", at.format("%Y-%m-%d")),
        None => println!("  Last practiced: never"),
    }
}
