use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend as TerminalBackend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

use chrono::Utc;
use typerush::{
    app::{App, Control},
    app_dirs::AppDirs,
    backend::Backend,
    config::{Config, ConfigStore, FileConfigStore},
    identity::StaticAuth,
    passage::Difficulty,
    runtime::{ChannelEvents, GameEvent, Runner},
    store::TypingDb,
    ui,
};

const TICK_RATE_MS: u64 = 100;

/// typing speed game with computer science passages, personal stats and a leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// passage difficulty (remembered for next time)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// display name to sign in with (remembered for next time)
    #[clap(short = 'n', long)]
    name: Option<String>,

    /// email to sign in with (remembered for next time)
    #[clap(short = 'e', long)]
    email: Option<String>,

    /// play without signing in; results are not saved
    #[clap(long, conflicts_with_all = ["name", "email"])]
    anonymous: bool,

    /// path to the database file
    #[clap(long)]
    db: Option<PathBuf>,

    /// show personal stats and the leaderboard
    #[clap(short = 's', long)]
    stats: bool,

    /// print the stored passages as JSON and exit
    #[clap(long)]
    list_texts: bool,

    /// only list passages in this category (with --list-texts)
    #[clap(long, requires = "list_texts")]
    category: Option<String>,

    /// write your results to a CSV file and exit
    #[clap(long, value_name = "PATH", conflicts_with = "list_texts")]
    export: Option<PathBuf>,
}

impl Cli {
    /// Overlay the flags onto the saved config
    fn merge_into(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(name) = &self.name {
            config.name = Some(name.clone());
        }
        if let Some(email) = &self.email {
            config.email = Some(email.clone());
        }
        if self.stats {
            config.show_stats = true;
        }
        config
    }
}

fn init_logging() {
    let path = AppDirs::log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    // the terminal belongs to the TUI, so logs go to a file or nowhere
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().filter_or("TYPERUSH_LOG", "info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_target(false)
        .try_init();
}

/// Resolve who is playing, creating the user row on first sign-in
fn resolve_auth(db: &TypingDb, config: &Config, anonymous: bool) -> typerush::Result<StaticAuth> {
    if anonymous || !config.has_identity() {
        return Ok(StaticAuth::anonymous());
    }
    let user = db.upsert_user(config.name.as_deref(), config.email.as_deref())?;
    Ok(StaticAuth::signed_in(user))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());
    if let Err(e) = store.save(&config) {
        log::warn!("could not save config: {e}");
    }

    let db = match &cli.db {
        Some(path) => TypingDb::open(path)?,
        None => TypingDb::open_default()?,
    };
    let auth = resolve_auth(&db, &config, cli.anonymous)?;
    let mut backend = Backend::new(db, auth);

    if cli.list_texts {
        backend.initialize_texts()?;
        let texts = backend.get_typing_texts(cli.difficulty, cli.category.as_deref())?;
        println!("{}", serde_json::to_string_pretty(&texts)?);
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let written = backend.export_results(path)?;
        println!("exported {written} results to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(backend, config.difficulty, config.show_stats)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    let outcome = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome?;

    let last = Config {
        difficulty: app.difficulty,
        show_stats: app.show_stats,
        ..config
    };
    if let Err(e) = store.save(&last) {
        log::warn!("could not save config: {e}");
    }

    Ok(())
}

fn start_tui<B: TerminalBackend>(
    terminal: &mut Terminal<B>,
    app: &mut App<StaticAuth>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        ChannelEvents::terminal(),
        Duration::from_millis(TICK_RATE_MS),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                // live wpm moves with the clock
                if app.session.is_active() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            GameEvent::Key(key) => {
                if app.handle_key(key, Utc::now()) == Control::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    Ok(())
}
