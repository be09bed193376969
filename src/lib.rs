// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod backend;
pub mod config;
pub mod error;
pub mod identity;
pub mod leaderboard;
pub mod passage;
pub mod results;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod texts;
pub mod ui;
pub mod util;

pub use error::{Error, Result};
