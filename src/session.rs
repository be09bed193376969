use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::results::NewGameResult;
use crate::util::{accuracy_percent, live_words_per_minute, words_per_minute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Finished,
}

/// What a keystroke did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// The session was not accepting input
    Ignored,
}

/// State of one attempt at typing a passage.
///
/// Transitions take the state by value and return the next one, so the host
/// UI owns the lifecycle and decides when to re-render. `current_index`
/// counts chars, never decreases while a session runs, and never exceeds the
/// text length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub text: String,
    pub current_index: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub mistakes: u32,
    pub phase: Phase,
}

impl SessionState {
    /// Load a passage without starting
    pub fn idle(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn expected_char(&self) -> Option<char> {
        self.text.chars().nth(self.current_index)
    }

    /// Begin timing with cleared counters. A running session is left as is,
    /// and an empty text never starts.
    pub fn start(self, now: DateTime<Utc>) -> Self {
        if self.is_active() || self.is_empty() {
            return self;
        }
        Self {
            started_at: Some(now),
            phase: Phase::Active,
            ..Self::idle(self.text)
        }
    }

    /// Process one typed character
    pub fn keystroke(self, c: char, now: DateTime<Utc>) -> (Self, Outcome) {
        if !self.is_active() {
            return (self, Outcome::Ignored);
        }

        let Some(expected) = self.expected_char() else {
            return (self, Outcome::Ignored);
        };

        if c != expected {
            return (
                Self {
                    mistakes: self.mistakes + 1,
                    ..self
                },
                Outcome::Incorrect,
            );
        }

        let current_index = self.current_index + 1;
        if current_index >= self.len() {
            let ended_at = match self.started_at {
                Some(start) if now < start => start,
                _ => now,
            };
            (
                Self {
                    current_index,
                    ended_at: Some(ended_at),
                    phase: Phase::Finished,
                    ..self
                },
                Outcome::Correct,
            )
        } else {
            (
                Self {
                    current_index,
                    ..self
                },
                Outcome::Correct,
            )
        }
    }

    /// Back to idle on the same text, clearing counters and timers
    pub fn reset(self) -> Self {
        Self::idle(self.text)
    }

    /// Milliseconds between start and `now` (or the end, once finished)
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            (Some(start), None) => (now - start).num_milliseconds().max(0),
            _ => 0,
        }
    }

    /// WPM while typing; zero unless active
    pub fn live_wpm(&self, now: DateTime<Utc>) -> f64 {
        if !self.is_active() {
            return 0.0;
        }
        live_words_per_minute(self.current_index, self.elapsed_ms(now))
    }

    /// WPM over the whole session, unguarded so short games keep their rate;
    /// zero until finished
    pub fn final_wpm(&self) -> f64 {
        match (self.phase, self.started_at, self.ended_at) {
            (Phase::Finished, Some(start), Some(end)) => {
                words_per_minute(self.current_index, (end - start).num_milliseconds())
            }
            _ => 0.0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.current_index, self.mistakes)
    }

    /// Fraction of the text typed, 0.0 to 1.0
    pub fn progress(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            len => self.current_index as f64 / len as f64,
        }
    }

    /// Metrics to record for a finished session
    pub fn result(&self, game_mode: &str) -> Option<NewGameResult> {
        if !self.is_finished() {
            return None;
        }
        let elapsed_ms = self.elapsed_ms(Utc::now());
        Some(NewGameResult {
            wpm: self.final_wpm(),
            accuracy: self.accuracy(),
            time_spent: elapsed_ms as f64 / 1000.0,
            text_length: self.len() as u32,
            mistakes: self.mistakes,
            game_mode: game_mode.to_string(),
        })
    }
}
