//! The reading session and the pieces it is built from

pub mod commands;
pub mod navigation;
pub mod progress;
pub mod session;
pub mod settings;
pub mod state;
pub mod translation;

pub use navigation::{ChapterEntry, NavOutcome};
pub use progress::{Debouncer, ProgressPersister};
pub use session::{Key, OpenBook, ReaderSession, SessionOptions};
pub use settings::{ReaderSettings, SettingsPatch};
pub use state::{ReaderState, ReadingPosition};
pub use translation::{Anchor, TranslationState, TranslationWorkflow, WorkflowState};
