use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::identity::AuthProvider;
use crate::leaderboard::LeaderboardEntry;
use crate::passage::{Difficulty, Passage};
use crate::results::ResultId;
use crate::session::{Outcome, SessionState};
use crate::stats::UserStats;

pub const SIGN_IN_TO_SAVE: &str = "Sign in to save your results";

/// Whether the event loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Host state around one typing session: the loaded passage, the session
/// itself, and the read models shown next to it.
pub struct App<A: AuthProvider> {
    pub backend: Backend<A>,
    pub passage: Passage,
    pub session: SessionState,
    pub difficulty: Difficulty,
    pub show_stats: bool,
    /// Restrict the leaderboard to the current difficulty
    pub leaderboard_by_mode: bool,
    pub stats: Option<UserStats>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// One-line notice shown until the next game starts
    pub status: Option<String>,
    pub last_saved: Option<ResultId>,
}

impl<A: AuthProvider> App<A> {
    /// Seed passages if needed and load a random one for `difficulty`
    pub fn new(mut backend: Backend<A>, difficulty: Difficulty, show_stats: bool) -> Result<Self> {
        backend.initialize_texts()?;
        let passage = backend.get_random_text(Some(difficulty))?;

        let mut app = Self {
            session: SessionState::idle(passage.content.clone()),
            passage,
            backend,
            difficulty,
            show_stats,
            leaderboard_by_mode: false,
            stats: None,
            leaderboard: Vec::new(),
            status: None,
            last_saved: None,
        };
        app.refresh_read_models()?;
        Ok(app)
    }

    pub fn game_mode(&self) -> String {
        self.difficulty.to_string()
    }

    pub fn start_game(&mut self, now: DateTime<Utc>) {
        if self.session.is_active() {
            return;
        }
        self.status = None;
        self.last_saved = None;
        self.session = std::mem::take(&mut self.session).start(now);
    }

    pub fn reset_game(&mut self) {
        self.session = std::mem::take(&mut self.session).reset();
    }

    /// Load another random passage; ignored mid-game
    pub fn new_passage(&mut self) -> Result<()> {
        if self.session.is_active() {
            return Ok(());
        }
        self.passage = self.backend.get_random_text(Some(self.difficulty))?;
        self.session = SessionState::idle(self.passage.content.clone());
        Ok(())
    }

    /// Move to the next difficulty and load a passage for it; ignored mid-game
    pub fn cycle_difficulty(&mut self) -> Result<()> {
        if self.session.is_active() {
            return Ok(());
        }
        self.difficulty = self.difficulty.next();
        self.new_passage()?;
        if self.leaderboard_by_mode {
            self.refresh_read_models()?;
        }
        Ok(())
    }

    pub fn toggle_stats(&mut self) -> Result<()> {
        self.show_stats = !self.show_stats;
        if self.show_stats {
            self.refresh_read_models()?;
        }
        Ok(())
    }

    pub fn toggle_leaderboard_mode(&mut self) -> Result<()> {
        self.leaderboard_by_mode = !self.leaderboard_by_mode;
        self.refresh_read_models()
    }

    pub fn refresh_read_models(&mut self) -> Result<()> {
        self.stats = self.backend.get_user_stats()?;
        let mode = self.leaderboard_by_mode.then(|| self.game_mode());
        self.leaderboard = self.backend.get_leaderboard(mode.as_deref())?;
        Ok(())
    }

    /// Feed one character to the session, saving the result when it finishes
    pub fn type_char(&mut self, c: char, now: DateTime<Utc>) -> Outcome {
        let was_finished = self.session.is_finished();
        let (session, outcome) = std::mem::take(&mut self.session).keystroke(c, now);
        self.session = session;

        if !was_finished && self.session.is_finished() {
            self.record_result();
        }
        outcome
    }

    fn record_result(&mut self) {
        let Some(metrics) = self.session.result(&self.game_mode()) else {
            return;
        };

        match self.backend.save_game_result(&metrics) {
            Ok(id) => {
                self.last_saved = Some(id);
                self.status = Some(format!(
                    "Saved: {} wpm, {}% accuracy",
                    metrics.wpm, metrics.accuracy
                ));
            }
            Err(Error::Unauthenticated) => {
                self.status = Some(SIGN_IN_TO_SAVE.to_string());
            }
            Err(e) => {
                log::error!("failed to save result: {e}");
                self.status = Some(format!("Could not save result: {e}"));
            }
        }

        if let Err(e) = self.refresh_read_models() {
            log::error!("failed to refresh stats: {e}");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Utc>) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        // chords are never typing or commands
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Control::Continue;
        }

        let outcome = if self.session.is_active() {
            match key.code {
                KeyCode::Esc | KeyCode::Tab => self.reset_game(),
                KeyCode::Char(c) => {
                    self.type_char(c, now);
                }
                _ => {}
            }
            Ok(())
        } else {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                KeyCode::Enter => {
                    self.start_game(now);
                    Ok(())
                }
                KeyCode::Tab | KeyCode::Char('r') => {
                    self.reset_game();
                    Ok(())
                }
                KeyCode::Char('n') => self.new_passage(),
                KeyCode::Char('d') => self.cycle_difficulty(),
                KeyCode::Char('s') => self.toggle_stats(),
                KeyCode::Char('m') => self.toggle_leaderboard_mode(),
                _ => Ok(()),
            }
        };

        if let Err(e) = outcome {
            log::error!("{e}");
            self.status = Some(e.to_string());
        }
        Control::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticAuth;
    use crate::store::TypingDb;
    use chrono::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn signed_in_app() -> App<StaticAuth> {
        let db = TypingDb::open_in_memory().unwrap();
        let user = db.upsert_user(Some("Ada"), None).unwrap();
        App::new(Backend::new(db, StaticAuth::signed_in(user)), Difficulty::Easy, false).unwrap()
    }

    fn anonymous_app() -> App<StaticAuth> {
        let db = TypingDb::open_in_memory().unwrap();
        App::new(Backend::new(db, StaticAuth::anonymous()), Difficulty::Hard, false).unwrap()
    }

    fn finish(app: &mut App<StaticAuth>, start: DateTime<Utc>) {
        app.start_game(start);
        let text = app.session.text.clone();
        let end = start + Duration::seconds(10);
        for c in text.chars() {
            app.type_char(c, end);
        }
    }

    #[test]
    fn new_app_loads_passage_for_difficulty() {
        let app = signed_in_app();

        assert_eq!(app.passage.difficulty, Difficulty::Easy);
        assert!(!app.passage.is_builtin());
        assert_eq!(app.session, SessionState::idle(app.passage.content.clone()));
    }

    #[test]
    fn finishing_saves_the_result() {
        let mut app = signed_in_app();

        finish(&mut app, Utc::now());

        assert!(app.session.is_finished());
        assert!(app.last_saved.is_some());
        let stats = app.stats.as_ref().unwrap();
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.recent_results[0].game_mode, "easy");
        assert_eq!(app.leaderboard.len(), 1);
    }

    #[test]
    fn anonymous_finish_shows_sign_in_notice() {
        let mut app = anonymous_app();

        finish(&mut app, Utc::now());

        assert!(app.session.is_finished());
        assert_eq!(app.last_saved, None);
        assert_eq!(app.status.as_deref(), Some(SIGN_IN_TO_SAVE));
        assert!(app.leaderboard.is_empty());
    }

    #[test]
    fn difficulty_is_locked_while_active() {
        let mut app = signed_in_app();
        app.start_game(Utc::now());

        app.cycle_difficulty().unwrap();

        assert_eq!(app.difficulty, Difficulty::Easy);
    }

    #[test]
    fn letters_are_commands_only_when_not_active() {
        let mut app = signed_in_app();
        let now = Utc::now();

        assert_eq!(app.handle_key(key(KeyCode::Char('d')), now), Control::Continue);
        assert_eq!(app.difficulty, Difficulty::Medium);

        app.handle_key(key(KeyCode::Enter), now);
        assert!(app.session.is_active());

        let expected = app.session.expected_char().unwrap();
        app.handle_key(key(KeyCode::Char(expected)), now);
        assert_eq!(app.session.current_index, 1);
        assert_eq!(app.difficulty, Difficulty::Medium);
    }

    #[test]
    fn escape_resets_while_active_and_quits_otherwise() {
        let mut app = signed_in_app();
        let now = Utc::now();
        app.handle_key(key(KeyCode::Enter), now);

        assert_eq!(app.handle_key(key(KeyCode::Esc), now), Control::Continue);
        assert!(!app.session.is_active());
        assert_eq!(app.session.current_index, 0);

        assert_eq!(app.handle_key(key(KeyCode::Esc), now), Control::Quit);
    }

    #[test]
    fn modifier_chords_are_not_typed() {
        let mut app = signed_in_app();
        let now = Utc::now();
        app.handle_key(key(KeyCode::Enter), now);
        let expected = app.session.expected_char().unwrap();

        let chord = KeyEvent::new(
            KeyCode::Char(expected),
            KeyModifiers::CONTROL | KeyModifiers::ALT,
        );
        assert_eq!(app.handle_key(chord, now), Control::Continue);
        let alt = KeyEvent::new(KeyCode::Char(expected), KeyModifiers::ALT);
        app.handle_key(alt, now);

        assert_eq!(app.session.current_index, 0);
        assert_eq!(app.session.mistakes, 0);

        let shifted = KeyEvent::new(KeyCode::Char(expected), KeyModifiers::SHIFT);
        app.handle_key(shifted, now);
        assert_eq!(app.session.current_index, 1);
    }

    #[test]
    fn modifier_chords_are_not_commands() {
        let mut app = signed_in_app();

        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        app.handle_key(ctrl_d, Utc::now());

        assert_eq!(app.difficulty, Difficulty::Easy);
    }

    #[test]
    fn ctrl_c_always_quits() {
        let mut app = signed_in_app();
        app.start_game(Utc::now());

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.handle_key(ctrl_c, Utc::now()), Control::Quit);
    }

    #[test]
    fn leaderboard_mode_filter_follows_difficulty() {
        let mut app = signed_in_app();
        finish(&mut app, Utc::now());
        app.cycle_difficulty().unwrap();

        app.toggle_leaderboard_mode().unwrap();
        assert!(app.leaderboard.is_empty());

        app.toggle_leaderboard_mode().unwrap();
        assert_eq!(app.leaderboard.len(), 1);
    }

    #[test]
    fn starting_again_clears_notice() {
        let mut app = anonymous_app();
        finish(&mut app, Utc::now());
        assert!(app.status.is_some());

        app.start_game(Utc::now());

        assert!(app.status.is_none());
        assert!(app.session.is_active());
    }
}
