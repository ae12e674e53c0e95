use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use crate::config::SessionSettings;
use crate::schedule::{Scheduler, TickKind};
use crate::session::{Phase, Session};

/// User intents on the session screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    TogglePause,
    Stop,
    Reset,
    Quit,
}

impl Action {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }
        match key.code {
            KeyCode::Char('s') | KeyCode::Enter => Some(Action::Start),
            KeyCode::Char('p') | KeyCode::Char(' ') => Some(Action::TogglePause),
            KeyCode::Char('x') => Some(Action::Stop),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The exercise session screen: owns the session and the timers that drive it.
///
/// Every transition is followed by a timer sync, so ticks never outlive the
/// phase that armed them.
#[derive(Debug)]
pub struct App<R = StdRng> {
    pub exercise: String,
    pub duration_label: String,
    session: Session<R>,
    scheduler: Scheduler,
}

impl App<StdRng> {
    pub fn new(settings: &SessionSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(settings, rng)
    }
}

impl<R: Rng> App<R> {
    pub fn with_rng(settings: &SessionSettings, rng: R) -> Self {
        Self {
            exercise: settings.exercise.clone(),
            duration_label: settings.duration_label.clone(),
            session: Session::with_rng(settings.total_seconds(), settings.rep_schedule, rng),
            scheduler: Scheduler::new(settings.countdown_interval, settings.sensor_interval),
        }
    }

    pub fn session(&self) -> &Session<R> {
        &self.session
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        match Action::from_key(key) {
            Some(action) => self.apply(action, now),
            None => Control::Continue,
        }
    }

    pub fn apply(&mut self, action: Action, now: Instant) -> Control {
        match action {
            Action::Start => {
                self.session.start();
            }
            Action::TogglePause => {
                self.session.toggle_pause();
            }
            Action::Stop => {
                self.session.stop();
            }
            Action::Reset => self.session.reset(),
            Action::Quit => {
                self.scheduler.cancel();
                return Control::Quit;
            }
        }
        self.scheduler.sync(self.session.phase(), now);
        Control::Continue
    }

    /// Run every tick that has come due by `now`. Returns true if anything changed.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(kind) = self.scheduler.next_due(now) {
            trace!(?kind, "tick");
            let before = self.session.phase();
            changed |= match kind {
                TickKind::Countdown => self.session.countdown_tick(),
                TickKind::Sensor => self.session.sensor_tick(),
            };
            if self.session.phase() != before {
                self.scheduler.sync(self.session.phase(), now);
            }
        }
        changed
    }
}
