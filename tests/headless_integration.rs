use std::sync::mpsc;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typerush::app::{App, Control, SIGN_IN_TO_SAVE};
use typerush::backend::Backend;
use typerush::identity::StaticAuth;
use typerush::passage::Difficulty;
use typerush::runtime::{ChannelEvents, GameEvent, Runner};
use typerush::store::TypingDb;

fn key(code: KeyCode) -> GameEvent {
    GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Drive the app like the binary does until it quits or the steps run out
fn drive(app: &mut App<StaticAuth>, runner: &Runner) -> bool {
    for _ in 0..2_000u32 {
        if let GameEvent::Key(key) = runner.step() {
            if app.handle_key(key, Utc::now()) == Control::Quit {
                return true;
            }
        }
    }
    false
}

fn runner(rx: mpsc::Receiver<GameEvent>) -> Runner {
    Runner::new(ChannelEvents::new(rx), Duration::from_millis(1))
}

// Headless flow through Runner/ChannelEvents without a TTY: start, type the
// passage with one slip, then quit from the results screen.
#[test]
fn headless_game_is_saved_for_signed_in_player() {
    let db = TypingDb::open_in_memory().unwrap();
    let user = db.upsert_user(Some("Ada"), None).unwrap();
    let mut app = App::new(
        Backend::new(db, StaticAuth::signed_in(user)),
        Difficulty::Easy,
        true,
    )
    .unwrap();
    let text = app.session.text.clone();

    let (tx, rx) = mpsc::channel();
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char('#'))).unwrap();
    for c in text.chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Char('q'))).unwrap();

    assert!(drive(&mut app, &runner(rx)), "app should quit after the game");

    assert!(app.session.is_finished());
    assert_eq!(app.session.mistakes, 1);
    assert!(app.last_saved.is_some());

    let stats = app.stats.as_ref().unwrap();
    assert_eq!(stats.games_played, 1);
    assert_eq!(stats.recent_results[0].mistakes, 1);
    assert_eq!(stats.recent_results[0].text_length as usize, text.chars().count());
    assert_eq!(app.leaderboard[0].username, "Ada");
}

#[test]
fn headless_game_for_anonymous_player_is_not_saved() {
    let db = TypingDb::open_in_memory().unwrap();
    let mut app = App::new(
        Backend::new(db, StaticAuth::anonymous()),
        Difficulty::Medium,
        false,
    )
    .unwrap();
    let text = app.session.text.clone();

    let (tx, rx) = mpsc::channel();
    tx.send(key(KeyCode::Enter)).unwrap();
    for c in text.chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Esc)).unwrap();

    assert!(drive(&mut app, &runner(rx)));

    assert!(app.session.is_finished());
    assert_eq!(app.status.as_deref(), Some(SIGN_IN_TO_SAVE));
    assert_eq!(app.stats, None);
    assert!(app.backend.get_leaderboard(None).unwrap().is_empty());
}

#[test]
fn headless_reset_mid_game_discards_progress() {
    let db = TypingDb::open_in_memory().unwrap();
    let user = db.upsert_user(None, Some("ada@example.com")).unwrap();
    let mut app = App::new(
        Backend::new(db, StaticAuth::signed_in(user)),
        Difficulty::Hard,
        false,
    )
    .unwrap();
    let first = app.session.expected_char().unwrap();

    let (tx, rx) = mpsc::channel();
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char(first))).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();
    tx.send(key(KeyCode::Char('q'))).unwrap();

    assert!(drive(&mut app, &runner(rx)));

    assert!(!app.session.is_active());
    assert_eq!(app.session.current_index, 0);
    assert_eq!(app.last_saved, None);
    assert_eq!(app.stats.as_ref().unwrap().games_played, 0);
}
