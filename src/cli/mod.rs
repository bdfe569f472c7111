use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::content::BookFormat;
use crate::library::BookSort;
use crate::practice::Difficulty;
use crate::vocabulary::{ExpertiseBucket, WordSort};

#[derive(Parser)]
#[command(name = "linguality")]
#[command(author, version, about = "Read books word by word, translate and collect vocabulary", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a book in the interactive reader
    Read(ReadArgs),

    /// List, inspect and delete saved words
    Words(WordsArgs),

    /// Browse featured and uploaded books
    Library(LibraryArgs),

    /// Practice saved words with a spelling game
    Practice(PracticeArgs),

    /// Manage the local content cache
    Cache(CacheArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., api.user_id)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Show config file path
    Path,

    /// Edit config file with default editor
    Edit,
}

#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Book identifier on the server
    #[arg(required_unless_present_any = ["file", "title"])]
    pub book: Option<String>,

    /// Read a local plain-text file instead of a server book
    #[arg(short, long, conflicts_with = "book")]
    pub file: Option<PathBuf>,

    /// Look the book up by title
    #[arg(long)]
    pub title: Option<String>,

    /// The book is a user upload rather than a featured title
    #[arg(long, default_value_t = false)]
    pub custom: bool,

    /// Word number to start at, counting from 1
    #[arg(short, long, default_value_t = 1)]
    pub word: usize,

    /// Chapter to start in
    #[arg(short, long)]
    pub chapter: Option<String>,

    /// Bypass the local content cache
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

#[derive(Parser, Debug)]
pub struct WordsArgs {
    #[command(subcommand)]
    pub action: WordsAction,
}

#[derive(Subcommand, Debug)]
pub enum WordsAction {
    /// List saved words
    List {
        /// Filter by original form, lemma or translation
        #[arg(short, long)]
        search: Option<String>,

        /// Expertise bucket (all, new, learning, mastered)
        #[arg(short, long, default_value = "all")]
        bucket: ExpertiseBucket,

        /// Sort key (last-seen, expertise, alphabetical)
        #[arg(long, default_value = "last-seen")]
        sort: WordSort,

        /// Ascending order (oldest, lowest or A-Z first)
        #[arg(long, default_value_t = false)]
        asc: bool,

        /// Show at most this many words
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show vocabulary statistics
    Stats,

    /// Show one word with its contexts
    Show {
        /// Word identifier
        id: String,
    },

    /// Delete a saved word
    Delete {
        /// Word identifier
        id: String,
    },
}

#[derive(Parser, Debug)]
pub struct LibraryArgs {
    /// Show featured books instead of your uploads
    #[arg(long, default_value_t = false)]
    pub featured: bool,

    /// Filter by title or author
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter by language code
    #[arg(short, long)]
    pub language: Option<String>,

    /// Filter by format (txt, epub)
    #[arg(long)]
    pub format: Option<BookFormat>,

    /// Sort key (title, upload-date, last-read)
    #[arg(long, default_value = "upload-date")]
    pub sort: BookSort,

    /// Ascending order
    #[arg(long, default_value_t = false)]
    pub asc: bool,
}

#[derive(Parser, Debug)]
pub struct PracticeArgs {
    /// Number of words in the session
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,

    /// Difficulty (easy, medium, hard)
    #[arg(short, long, default_value = "medium")]
    pub difficulty: Difficulty,

    /// Do not submit results to the server
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// List recent practice sessions instead of playing
    #[arg(long, default_value_t = false)]
    pub history: bool,
}

#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached books
    List,

    /// Remove one book and its chapters
    Remove {
        /// Book identifier
        id: String,
    },

    /// Remove everything
    Clear,

    /// Show the cache database path
    Path,
}
