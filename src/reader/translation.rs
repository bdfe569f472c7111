//! Translation/save workflow
//!
//! `Idle -> RevealedLoading -> RevealedReady -> Saved`. Every selection
//! issues a new [`Ticket`]; results carrying an older ticket are dropped, so
//! only the latest selection ever reaches the state.

use crate::error::ReaderError;
use crate::text::{CONTEXT_WORDS, context_window};

pub const TRANSLATION_FAILED: &str = "Translation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    RevealedLoading,
    RevealedReady,
    Saved,
}

impl WorkflowState {
    pub fn is_revealed(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Screen coordinates of the selection, for popup placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationState {
    pub selected_word: String,
    pub text: String,
    pub selected_index: Option<usize>,
    pub context: String,
    pub anchor: Anchor,
    pub state: WorkflowState,
    pub failed: bool,
    pub save_error: Option<ReaderError>,
}

/// What the session needs to send to the gateway for a save.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSave {
    pub ticket: Ticket,
    pub word: String,
    pub context: String,
    pub position: usize,
}

#[derive(Debug, Default)]
pub struct TranslationWorkflow {
    current: TranslationState,
    generation: u64,
}

impl TranslationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TranslationState {
        &self.current
    }

    pub fn phase(&self) -> WorkflowState {
        self.current.state
    }

    /// Start a new selection, pre-empting whatever was in flight.
    pub fn select(&mut self, words: &[String], index: usize, anchor: Anchor) -> Option<Ticket> {
        let word = words.get(index)?;
        self.reset();
        self.current = TranslationState {
            selected_word: word.clone(),
            selected_index: Some(index),
            context: context_window(words, index, CONTEXT_WORDS),
            anchor,
            state: WorkflowState::RevealedLoading,
            ..Default::default()
        };
        Some(self.ticket())
    }

    /// Apply a translation result. Returns `false` if the ticket is stale.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<String, ReaderError>) -> bool {
        if !self.is_current(ticket) || self.current.state != WorkflowState::RevealedLoading {
            return false;
        }
        match result {
            Ok(text) => self.current.text = text,
            Err(_) => {
                self.current.text = TRANSLATION_FAILED.to_string();
                self.current.failed = true;
            }
        }
        self.current.state = WorkflowState::RevealedReady;
        true
    }

    /// Begin a save of the current selection if one is allowed.
    pub fn begin_save(&self) -> Option<PendingSave> {
        if self.current.state != WorkflowState::RevealedReady {
            return None;
        }
        let position = self.current.selected_index?;
        if self.current.selected_word.is_empty() {
            return None;
        }
        Some(PendingSave {
            ticket: self.ticket(),
            word: self.current.selected_word.clone(),
            context: self.current.context.clone(),
            position,
        })
    }

    /// Apply a save acknowledgment. On failure the state stays
    /// `RevealedReady` with the error recorded.
    pub fn complete_save(&mut self, ticket: Ticket, result: Result<(), ReaderError>) -> bool {
        if !self.is_current(ticket) || self.current.state != WorkflowState::RevealedReady {
            return false;
        }
        match result {
            Ok(()) => {
                self.current.state = WorkflowState::Saved;
                self.current.save_error = None;
            }
            Err(e) => self.current.save_error = Some(e),
        }
        true
    }

    /// Back to `Idle`; anything still in flight becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.current = TranslationState::default();
    }

    fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::split_words;

    fn words() -> Vec<String> {
        split_words("we sat down to listen to the old man tell his story once more")
    }

    #[test]
    fn test_select_reveals_optimistically() {
        let mut wf = TranslationWorkflow::new();
        let ticket = wf.select(&words(), 4, Anchor { x: 10.0, y: 20.0 });
        assert!(ticket.is_some());
        assert_eq!(wf.phase(), WorkflowState::RevealedLoading);
        assert!(wf.phase().is_revealed());
        assert_eq!(wf.state().selected_word, "listen");
        assert_eq!(wf.state().context, "we sat down to listen to the old man tell");
        assert!(wf.state().text.is_empty());
    }

    #[test]
    fn test_select_out_of_range() {
        let mut wf = TranslationWorkflow::new();
        assert!(wf.select(&words(), 100, Anchor::default()).is_none());
        assert_eq!(wf.phase(), WorkflowState::Idle);
    }

    #[test]
    fn test_failure_becomes_ready_with_sentinel() {
        let mut wf = TranslationWorkflow::new();
        let t = wf.select(&words(), 0, Anchor::default()).unwrap();
        assert!(wf.resolve(t, Err(ReaderError::TranslationFailed("down".into()))));
        assert_eq!(wf.phase(), WorkflowState::RevealedReady);
        assert_eq!(wf.state().text, TRANSLATION_FAILED);
        assert!(wf.state().failed);
    }

    #[test]
    fn test_latest_selection_wins() {
        let mut wf = TranslationWorkflow::new();
        let a = wf.select(&words(), 4, Anchor::default()).unwrap();
        let b = wf.select(&words(), 7, Anchor::default()).unwrap();

        assert!(wf.resolve(b, Ok("старый".into())));
        assert!(!wf.resolve(a, Ok("слушать".into())));
        assert_eq!(wf.state().selected_word, "old");
        assert_eq!(wf.state().text, "старый");

        // Stale result arriving before the current one is dropped too.
        let c = wf.select(&words(), 1, Anchor::default()).unwrap();
        assert!(!wf.resolve(b, Ok("старый".into())));
        assert_eq!(wf.phase(), WorkflowState::RevealedLoading);
        assert!(wf.resolve(c, Ok("сидели".into())));
        assert_eq!(wf.state().text, "сидели");
    }

    #[test]
    fn test_save_transitions() {
        let mut wf = TranslationWorkflow::new();
        let t = wf.select(&words(), 4, Anchor::default()).unwrap();
        assert!(wf.begin_save().is_none(), "cannot save while loading");

        wf.resolve(t, Ok("слушать".into()));
        let pending = wf.begin_save().unwrap();
        assert_eq!(pending.word, "listen");
        assert_eq!(pending.position, 4);

        assert!(wf.complete_save(pending.ticket, Err(ReaderError::SaveFailed("500".into()))));
        assert_eq!(wf.phase(), WorkflowState::RevealedReady);
        assert!(wf.state().save_error.is_some());

        let retry = wf.begin_save().unwrap();
        assert!(wf.complete_save(retry.ticket, Ok(())));
        assert_eq!(wf.phase(), WorkflowState::Saved);
        assert!(wf.begin_save().is_none(), "already saved");
    }

    #[test]
    fn test_save_ack_after_reselect_is_ignored() {
        let mut wf = TranslationWorkflow::new();
        let t = wf.select(&words(), 4, Anchor::default()).unwrap();
        wf.resolve(t, Ok("слушать".into()));
        let pending = wf.begin_save().unwrap();

        wf.reset();
        assert!(!wf.complete_save(pending.ticket, Ok(())));
        assert_eq!(wf.phase(), WorkflowState::Idle);
    }
}
