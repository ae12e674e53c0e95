use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

use steady::{
    app::{Action, App, Control},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, SessionSettings},
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    session::{RepSchedule, DEFAULT_TICKS_PER_REP},
};

/// Longest wait between redraws when no timer is pending
const IDLE_REDRAW_MS: u64 = 250;

/// balance exercise session with a countdown and simulated motion sensors
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A balance exercise session timer: counts down the exercise, simulates a six-axis motion sensor and tracks reps and calories."
)]
pub struct Cli {
    /// session length label; digits are read as seconds (e.g. "90 seg")
    #[clap(short = 'd', long)]
    duration: Option<String>,

    /// exercise name shown in the header
    #[clap(short = 'e', long)]
    exercise: Option<String>,

    /// how reps are credited while the session runs
    #[clap(long, value_enum)]
    rep_mode: Option<RepMode>,

    /// per-tick rep probability for the random rep mode
    #[clap(long, default_value_t = 1.0 / DEFAULT_TICKS_PER_REP as f64, value_parser = parse_probability)]
    rep_chance: f64,

    /// seed for the simulated sensor feed, for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// start the countdown immediately
    #[clap(short = 'a', long)]
    autostart: bool,

    /// write the effective settings back to the config file
    #[clap(long)]
    save_config: bool,
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if p.is_finite() && (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!("`{s}` is not a probability between 0 and 1"))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum RepMode {
    Periodic,
    Random,
}

impl Cli {
    /// Layer command line flags over the stored configuration
    fn apply_to(&self, cfg: &Config) -> Config {
        let mut merged = cfg.clone();
        if let Some(duration) = &self.duration {
            merged.duration = duration.clone();
        }
        if let Some(exercise) = &self.exercise {
            merged.exercise = exercise.clone();
        }
        merged.rep_schedule = match self.rep_mode {
            Some(RepMode::Periodic) => RepSchedule::default(),
            Some(RepMode::Random) => RepSchedule::Probabilistic {
                chance: self.rep_chance,
            },
            None => cfg.rep_schedule,
        };
        merged
    }

    fn to_session_settings(&self, cfg: &Config) -> SessionSettings {
        SessionSettings {
            seed: self.seed,
            ..SessionSettings::from(cfg)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let loaded = store.try_load();
    let config = cli.apply_to(loaded.as_ref().unwrap_or(&Config::default()));

    // Keep the guard alive until exit so buffered log lines are flushed.
    // Problems are reported before the screen is taken over.
    let _log_guard = match AppDirs::log_dir() {
        Some(dir) => match logging::init(&dir, &config.log_level) {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("steady: logging disabled: {err}");
                None
            }
        },
        None => {
            eprintln!("steady: logging disabled: no log directory");
            None
        }
    };

    if let Err(err) = &loaded {
        eprintln!(
            "steady: ignoring config {}: {err}",
            store.path().display()
        );
        warn!(%err, path = %store.path().display(), "ignoring unreadable config");
    }

    if cli.save_config {
        if let Err(err) = store.save(&config) {
            error!(%err, path = %store.path().display(), "could not save config");
        }
    }

    let settings = cli.to_session_settings(&config);
    info!(
        exercise = %settings.exercise,
        duration = %settings.duration_label,
        "opening session"
    );

    let mut app = App::new(&settings);
    if cli.autostart {
        app.apply(Action::Start, Instant::now());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!(%err, "session screen failed");
    }
    info!(summary = %app.session().summary(), "leaving session");

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(IDLE_REDRAW_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        let event = runner.step_until(app.next_deadline(), Instant::now());
        let now = Instant::now();

        let redraw = match event {
            AppEvent::Tick => app.on_tick(now),
            AppEvent::Resize => true,
            AppEvent::Disconnected => {
                warn!("terminal input closed, leaving session");
                break;
            }
            AppEvent::Key(key) => {
                if app.on_key(key, now) == Control::Quit {
                    break;
                }
                true
            }
        };

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
