//! Navigation engine: moves the reading cursor and crosses chapter
//! boundaries when the current word list is exhausted.
//!
//! The engine only updates the chapter pointer and position. Loading the
//! body of a newly entered chapter is the caller's job.

use super::state::{ReaderState, ReadingPosition};
use crate::content::Chapter;

/// Where to place the cursor once the entered chapter's content is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterEntry {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavOutcome {
    Unchanged,
    Moved,
    ChapterChanged {
        chapter: Chapter,
        entry: ChapterEntry,
    },
}

impl ReaderState {
    pub fn next(&mut self) -> NavOutcome {
        let count = self.word_count();
        if count == 0 {
            return NavOutcome::Unchanged;
        }

        let index = self.position().word_index;
        if index + 1 < count {
            self.move_to(index + 1);
            return NavOutcome::Moved;
        }

        match self.linked_chapter(|c| c.next.as_deref()) {
            Some(chapter) => self.enter_chapter(chapter, ChapterEntry::Start),
            None => NavOutcome::Unchanged,
        }
    }

    pub fn previous(&mut self) -> NavOutcome {
        if self.word_count() == 0 {
            return NavOutcome::Unchanged;
        }

        let index = self.position().word_index;
        if index > 0 {
            self.move_to(index - 1);
            return NavOutcome::Moved;
        }

        match self.linked_chapter(|c| c.prev.as_deref()) {
            Some(chapter) => self.enter_chapter(chapter, ChapterEntry::End),
            None => NavOutcome::Unchanged,
        }
    }

    /// Clamp `index` into the current word list. Never crosses a chapter.
    pub fn jump_to(&mut self, index: usize) -> NavOutcome {
        let count = self.word_count();
        if count == 0 {
            return NavOutcome::Unchanged;
        }

        let target = index.min(count - 1);
        if target == self.position().word_index {
            return NavOutcome::Unchanged;
        }
        self.move_to(target);
        NavOutcome::Moved
    }

    pub fn go_to_chapter(&mut self, chapter: Chapter) -> NavOutcome {
        self.enter_chapter(chapter, ChapterEntry::Start)
    }

    fn move_to(&mut self, index: usize) {
        let chapter_id = self.position().chapter_id.clone();
        self.set_position(ReadingPosition {
            word_index: index,
            percentage: 0.0,
            chapter_id,
        });
    }

    /// Resolve a prev/next link against the chapter table. A link naming an
    /// unknown chapter counts as no link.
    fn linked_chapter<F>(&self, link: F) -> Option<Chapter>
    where
        F: Fn(&Chapter) -> Option<&str>,
    {
        let id = link(self.current_chapter()?)?;
        self.find_chapter(id).cloned()
    }

    fn enter_chapter(&mut self, chapter: Chapter, entry: ChapterEntry) -> NavOutcome {
        self.set_position(ReadingPosition::in_chapter(0, &chapter.id));
        self.set_chapter(chapter.clone());
        NavOutcome::ChapterChanged { chapter, entry }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BookContent;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    fn chapters() -> Vec<Chapter> {
        vec![
            Chapter::new("ch1", "One", 0).with_links(None, Some("ch2")),
            Chapter::new("ch2", "Two", 1).with_links(Some("ch1"), None),
        ]
    }

    fn state(n: usize, chapter: Option<&str>) -> ReaderState {
        let mut state = ReaderState::default();
        state.set_content(BookContent::from_text(&words(n)));
        let table = chapters();
        if let Some(id) = chapter {
            let current = table.iter().find(|c| c.id == id).cloned().unwrap();
            state.set_chapter(current);
        }
        state.set_chapters(table);
        state
    }

    #[test]
    fn test_jump_to_every_index() {
        let mut s = state(20, None);
        for i in 0..20 {
            s.jump_to(i);
            assert_eq!(s.position().word_index, i);
            assert_eq!(s.position().percentage, i as f64 / 20.0);
        }
    }

    #[test]
    fn test_jump_to_clamps() {
        let mut s = state(20, Some("ch1"));
        assert_eq!(s.jump_to(500), NavOutcome::Moved);
        assert_eq!(s.position().word_index, 19);
        assert_eq!(s.current_chapter().unwrap().id, "ch1");
    }

    #[test]
    fn test_next_advances() {
        let mut s = state(3, None);
        assert_eq!(s.next(), NavOutcome::Moved);
        assert_eq!(s.position().word_index, 1);
        assert_eq!(s.current_word(), Some("w1"));
    }

    #[test]
    fn test_next_at_end_without_link_is_idempotent() {
        let mut s = state(20, Some("ch2"));
        s.jump_to(19);
        let before = s.position().clone();
        for _ in 0..3 {
            assert_eq!(s.next(), NavOutcome::Unchanged);
            assert_eq!(s.position(), &before);
            assert_eq!(s.current_chapter().unwrap().id, "ch2");
        }
    }

    #[test]
    fn test_next_at_end_crosses_into_next_chapter() {
        let mut s = state(20, Some("ch1"));
        s.jump_to(19);

        match s.next() {
            NavOutcome::ChapterChanged { chapter, entry } => {
                assert_eq!(chapter.id, "ch2");
                assert_eq!(entry, ChapterEntry::Start);
            }
            other => panic!("expected chapter change, got {:?}", other),
        }
        assert_eq!(s.current_chapter().unwrap().id, "ch2");
        assert_eq!(s.position().word_index, 0);
        assert_eq!(s.position().chapter_id.as_deref(), Some("ch2"));
    }

    #[test]
    fn test_previous_at_start() {
        let mut s = state(5, Some("ch1"));
        assert_eq!(s.previous(), NavOutcome::Unchanged);

        let mut s = state(5, Some("ch2"));
        assert!(matches!(
            s.previous(),
            NavOutcome::ChapterChanged {
                entry: ChapterEntry::End,
                ..
            }
        ));
        assert_eq!(s.current_chapter().unwrap().id, "ch1");
    }

    #[test]
    fn test_link_to_unknown_chapter_holds_boundary() {
        let mut s = state(2, None);
        s.set_chapter(Chapter::new("x", "X", 0).with_links(None, Some("missing")));
        s.jump_to(1);
        assert_eq!(s.next(), NavOutcome::Unchanged);
        assert_eq!(s.position().word_index, 1);
    }

    #[test]
    fn test_go_to_chapter_resets_position() {
        let mut s = state(10, Some("ch1"));
        s.jump_to(7);
        let target = chapters().remove(1);
        s.go_to_chapter(target);
        assert_eq!(s.position().word_index, 0);
        assert_eq!(s.current_chapter().unwrap().id, "ch2");
    }

    #[test]
    fn test_empty_content_is_noop() {
        let mut s = ReaderState::default();
        assert_eq!(s.next(), NavOutcome::Unchanged);
        assert_eq!(s.previous(), NavOutcome::Unchanged);
        assert_eq!(s.jump_to(3), NavOutcome::Unchanged);
    }
}
