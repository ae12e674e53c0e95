use std::fmt;

use crate::session::{Phase, SessionState};

/// Seconds left at or below which the clock turns to a warning colour
pub const WARNING_SECS: u32 = 30;
/// Seconds left at or below which the clock turns critical
pub const CRITICAL_SECS: u32 = 10;

/// Render seconds as a zero padded `MM:SS` clock
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Share of the countdown remaining, as a percentage
pub fn progress_percent(remaining: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (remaining.min(total) as f64 / total as f64) * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

impl Urgency {
    pub fn for_remaining(seconds: u32) -> Self {
        if seconds <= CRITICAL_SECS {
            Urgency::Critical
        } else if seconds <= WARNING_SECS {
            Urgency::Warning
        } else {
            Urgency::Normal
        }
    }
}

/// Snapshot of a session used for the results line and log records
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub phase: Phase,
    pub elapsed_seconds: u32,
    pub total_seconds: u32,
    pub reps: u32,
    pub calories: f64,
}

impl From<&SessionState> for Summary {
    fn from(state: &SessionState) -> Self {
        Self {
            phase: state.phase,
            elapsed_seconds: state.elapsed_seconds(),
            total_seconds: state.total_seconds,
            reps: state.reps,
            calories: state.calories(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} · {} reps · {:.1} kcal",
            format_clock(self.elapsed_seconds),
            format_clock(self.total_seconds),
            self.reps,
            self.calories
        )
    }
}
