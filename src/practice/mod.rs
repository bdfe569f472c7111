//! Spelling practice over saved words
//!
//! Words are picked by difficulty (an expertise range) and by how long ago
//! they were last practiced. Each word gets one answer; the session ends
//! with a score and one [`PracticeResult`] per word for the gateway.

pub mod commands;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Instant;

use crate::vocabulary::SavedWord;

pub const HISTORY_LIMIT: usize = 20;
pub const SPELLING: &str = "spelling";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(format!("unknown difficulty {} (easy, medium, hard)", s)),
        }
    }
}

impl Difficulty {
    /// Expertise levels drawn for this difficulty.
    pub fn expertise_range(&self) -> RangeInclusive<u8> {
        match self {
            Self::Easy => 50..=100,
            Self::Medium => 20..=70,
            Self::Hard => 0..=40,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub word_count: usize,
    pub difficulty: Difficulty,
    pub game_type: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_count: 10,
            difficulty: Difficulty::Medium,
            game_type: SPELLING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PracticeWord {
    pub id: String,
    pub original: String,
    pub translation: String,
    pub expertise_level: u8,
    pub last_practiced: Option<DateTime<Utc>>,
}

impl From<&SavedWord> for PracticeWord {
    fn from(word: &SavedWord) -> Self {
        Self {
            id: word.id.clone(),
            original: word.original.clone(),
            translation: word.translation.clone(),
            expertise_level: word.expertise_level,
            last_practiced: word.last_practiced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResult {
    pub word_id: String,
    pub correct: bool,
    pub attempt_count: u32,
    /// Seconds spent on the word
    pub time_spent: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mistakes: Vec<String>,
}

/// Pick up to `word_count` words in the difficulty's range, least recently
/// practiced first. Falls back to the whole vocabulary when nothing is in
/// range.
pub fn select_words(words: &[SavedWord], config: &GameConfig) -> Vec<PracticeWord> {
    let range = config.difficulty.expertise_range();
    let in_range: Vec<&SavedWord> = words
        .iter()
        .filter(|w| range.contains(&w.expertise_level))
        .collect();

    let mut pool = if in_range.is_empty() {
        words.iter().collect()
    } else {
        in_range
    };

    // `None` sorts before any timestamp, so unpracticed words come first.
    pool.sort_by_key(|w| w.last_practiced);
    pool.into_iter()
        .take(config.word_count)
        .map(PracticeWord::from)
        .collect()
}

pub fn check_answer(answer: &str, expected: &str) -> bool {
    answer.trim().to_lowercase() == expected.to_lowercase()
}

/// The first third of the word (rounded up), then an ellipsis.
pub fn hint(word: &str) -> String {
    let len = word.chars().count();
    let shown: String = word.chars().take(len.div_ceil(3)).collect();
    format!("{}...", shown)
}

pub fn score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerDetail {
    /// The prompt shown, i.e. the translation
    pub word: String,
    pub correct: bool,
    pub user_answer: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub score: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
    /// Seconds
    pub time_spent: u64,
    pub details: Vec<AnswerDetail>,
    pub results: Vec<PracticeResult>,
}

impl GameSummary {
    pub fn session(&self, game_type: &str) -> PracticeSession {
        PracticeSession {
            timestamp: Utc::now(),
            game_type: game_type.to_string(),
            word_count: self.results.len(),
            correct_count: self.correct_answers,
            total_time: self.time_spent,
        }
    }
}

pub struct SpellingGame {
    words: Vec<PracticeWord>,
    index: usize,
    details: Vec<AnswerDetail>,
    results: Vec<PracticeResult>,
    started: Instant,
    word_started: Instant,
}

impl SpellingGame {
    pub fn new(words: Vec<PracticeWord>) -> Self {
        let now = Instant::now();
        Self {
            words,
            index: 0,
            details: Vec::new(),
            results: Vec::new(),
            started: now,
            word_started: now,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Zero-based index of the word being asked.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&PracticeWord> {
        self.words.get(self.index)
    }

    pub fn hint(&self) -> Option<String> {
        self.current().map(|w| hint(&w.original))
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.words.len()
    }

    /// Check the answer for the current word and move on.
    pub fn submit(&mut self, answer: &str) -> Option<&AnswerDetail> {
        let word = self.words.get(self.index)?;
        let correct = check_answer(answer, &word.original);
        let answer = answer.trim().to_string();

        self.results.push(PracticeResult {
            word_id: word.id.clone(),
            correct,
            attempt_count: 1,
            time_spent: self.word_started.elapsed().as_secs(),
            mistakes: if correct { Vec::new() } else { vec![answer.clone()] },
        });
        self.details.push(AnswerDetail {
            word: word.translation.clone(),
            correct,
            user_answer: answer,
            correct_answer: word.original.clone(),
        });

        self.index += 1;
        self.word_started = Instant::now();
        self.details.last()
    }

    pub fn finish(self) -> GameSummary {
        let correct_answers = self.details.iter().filter(|d| d.correct).count();
        let total_questions = self.words.len();
        GameSummary {
            score: score(correct_answers, total_questions),
            correct_answers,
            total_questions,
            time_spent: self.started.elapsed().as_secs(),
            details: self.details,
            results: self.results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub timestamp: DateTime<Utc>,
    pub game_type: String,
    pub word_count: usize,
    pub correct_count: usize,
    /// Seconds
    pub total_time: u64,
}

/// Most recent sessions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeHistory {
    sessions: Vec<PracticeSession>,
}

impl PracticeHistory {
    pub fn push(&mut self, session: PracticeSession) {
        self.sessions.insert(0, session);
        self.sessions.truncate(HISTORY_LIMIT);
    }

    pub fn last(&self) -> Option<&PracticeSession> {
        self.sessions.first()
    }

    pub fn sessions(&self) -> &[PracticeSession] {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::tests::word;
    use chrono::{Duration, TimeZone};

    fn pool() -> Vec<SavedWord> {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut a = word("a", "listen", "слушать", 25);
        a.last_practiced = Some(base + Duration::days(3));
        let mut b = word("b", "river", "река", 60);
        b.last_practiced = Some(base);
        let c = word("c", "house", "дом", 40);
        let d = word("d", "apple", "яблоко", 95);
        vec![a, b, c, d]
    }

    fn ids(words: &[PracticeWord]) -> Vec<&str> {
        words.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!("HARD".parse(), Ok(Difficulty::Hard));
        assert_eq!("easy".parse(), Ok(Difficulty::Easy));
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_select_orders_by_last_practiced() {
        let selected = select_words(&pool(), &GameConfig::default());
        assert_eq!(ids(&selected), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_select_respects_limit_and_range() {
        let config = GameConfig {
            word_count: 1,
            difficulty: Difficulty::Easy,
            ..Default::default()
        };
        assert_eq!(ids(&select_words(&pool(), &config)), vec!["d"]);
    }

    #[test]
    fn test_select_falls_back_when_range_empty() {
        let words = vec![word("x", "apple", "яблоко", 95)];
        let config = GameConfig {
            difficulty: Difficulty::Hard,
            ..Default::default()
        };
        assert_eq!(ids(&select_words(&words, &config)), vec!["x"]);
    }

    #[test]
    fn test_answer_check_and_hint() {
        assert!(check_answer("  Listen ", "listen"));
        assert!(!check_answer("lisen", "listen"));
        assert_eq!(hint("listen"), "li...");
        assert_eq!(hint("river"), "ri...");
        assert_eq!(hint("дом"), "д...");
    }

    #[test]
    fn test_score_rounds() {
        assert_eq!(score(2, 3), 67);
        assert_eq!(score(1, 3), 33);
        assert_eq!(score(0, 0), 0);
    }

    #[test]
    fn test_game_records_one_result_per_word() {
        let words: Vec<PracticeWord> = pool().iter().take(2).map(PracticeWord::from).collect();
        let mut game = SpellingGame::new(words);
        assert_eq!(game.hint().as_deref(), Some("li..."));

        assert!(game.submit("listen").unwrap().correct);
        let detail = game.submit("rivr").unwrap();
        assert!(!detail.correct);
        assert_eq!(detail.correct_answer, "river");
        assert!(game.is_finished());
        assert!(game.submit("extra").is_none());

        let summary = game.finish();
        assert_eq!(summary.score, 50);
        assert_eq!(summary.correct_answers, 1);
        assert_eq!(summary.results[1].mistakes, vec!["rivr".to_string()]);
    }

    #[test]
    fn test_history_keeps_newest_twenty() {
        let mut history = PracticeHistory::default();
        for i in 0..25 {
            history.push(PracticeSession {
                timestamp: Utc::now(),
                game_type: SPELLING.into(),
                word_count: i,
                correct_count: 0,
                total_time: 0,
            });
        }
        assert_eq!(history.sessions().len(), HISTORY_LIMIT);
        assert_eq!(history.last().unwrap().word_count, 24);
    }

    #[test]
    fn test_result_json_shape() {
        let result = PracticeResult {
            word_id: "w1".into(),
            correct: true,
            attempt_count: 1,
            time_spent: 4,
            mistakes: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["wordId"], "w1");
        assert_eq!(json["attemptCount"], 1);
        assert!(json.get("mistakes").is_none());
    }
}
