use std::time::{Duration, Instant};

use crate::session::Phase;

pub const DEFAULT_COUNTDOWN_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_SENSOR_INTERVAL: Duration = Duration::from_millis(200);

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A cancellable periodic timer driven by caller supplied instants.
///
/// A cancelled timer never reports a tick until it is armed again.
#[derive(Debug, Clone)]
pub struct Timer {
    period: Duration,
    next_due: Option<Instant>,
}

impl Timer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// First tick fires one full period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Consume a single tick if one is due at `now`.
    ///
    /// The next deadline advances by exactly one period so the cadence does not
    /// drift with the caller's polling jitter.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                self.next_due = Some(due + self.period);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Countdown,
    Sensor,
}

/// The two timers behind a running session: the one-second countdown and the
/// fast sensor/metrics tick.
#[derive(Debug, Clone)]
pub struct Scheduler {
    countdown: Timer,
    sensor: Timer,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_INTERVAL, DEFAULT_SENSOR_INTERVAL)
    }
}

impl Scheduler {
    pub fn new(countdown_interval: Duration, sensor_interval: Duration) -> Self {
        Self {
            countdown: Timer::new(countdown_interval),
            sensor: Timer::new(sensor_interval),
        }
    }

    pub fn countdown(&self) -> &Timer {
        &self.countdown
    }

    pub fn sensor(&self) -> &Timer {
        &self.sensor
    }

    /// Align the timers with a session phase.
    ///
    /// Timers run only while Running: entering Running arms whichever timer is
    /// idle, any other phase cancels both.
    pub fn sync(&mut self, phase: Phase, now: Instant) {
        if phase == Phase::Running {
            if !self.countdown.is_armed() {
                self.countdown.arm(now);
            }
            if !self.sensor.is_armed() {
                self.sensor.arm(now);
            }
        } else {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        self.countdown.cancel();
        self.sensor.cancel();
    }

    pub fn is_armed(&self) -> bool {
        self.countdown.is_armed() || self.sensor.is_armed()
    }

    /// Earliest pending deadline across both timers
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.countdown.next_due(), self.sensor.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Pop the earliest tick due at `now`, the countdown winning ties.
    ///
    /// Callers apply each tick before asking for the next one, so a tick that
    /// ends the session can cancel everything queued behind it.
    pub fn next_due(&mut self, now: Instant) -> Option<TickKind> {
        let countdown = self.countdown.next_due().filter(|due| *due <= now);
        let sensor = self.sensor.next_due().filter(|due| *due <= now);

        let kind = match (countdown, sensor) {
            (Some(c), Some(s)) if s < c => TickKind::Sensor,
            (Some(_), _) => TickKind::Countdown,
            (None, Some(_)) => TickKind::Sensor,
            (None, None) => return None,
        };

        let fired = match kind {
            TickKind::Countdown => self.countdown.fire(now),
            TickKind::Sensor => self.sensor.fire(now),
        };
        debug_assert!(fired);
        Some(kind)
    }
}
