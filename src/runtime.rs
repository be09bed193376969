use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// What the event loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// No input arrived within the tick interval
    Tick,
}

/// Map a terminal event to a game event. Key releases (reported on some
/// platforms) and mouse/focus/paste events are dropped.
pub fn translate(event: Event) -> Option<GameEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(GameEvent::Key(key)),
        Event::Resize(_, _) => Some(GameEvent::Resize),
        _ => None,
    }
}

/// Channel-backed queue of game events. The binary feeds it from a terminal
/// reader thread; tests feed it directly.
pub struct ChannelEvents {
    rx: Receiver<GameEvent>,
}

impl ChannelEvents {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }

    /// Spawn a thread that reads crossterm events until the receiver goes away
    pub fn terminal() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            match event::read() {
                Ok(ev) => {
                    if let Some(ev) = translate(ev) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    log::error!("terminal event read failed: {e}");
                    break;
                }
            }
        });

        Self::new(rx)
    }
}

/// Drives the loop one event at a time, ticking when input is idle
pub struct Runner {
    events: ChannelEvents,
    tick: Duration,
}

impl Runner {
    pub fn new(events: ChannelEvents, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Wait up to one tick for the next event. A closed channel reads as
    /// ticks so the caller decides when to stop.
    pub fn step(&self) -> GameEvent {
        self.events
            .rx
            .recv_timeout(self.tick)
            .unwrap_or(GameEvent::Tick)
    }
}
