use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::display::Summary;
use crate::sensor::SensorReading;

/// Calories added per sensor tick, in hundredths of a kcal (0.05 kcal)
pub const CALORIE_HUNDREDTHS_PER_TICK: u32 = 5;

/// Sensor ticks between two reps with the default schedule (15 x 200ms = 3s)
pub const DEFAULT_TICKS_PER_REP: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// How repetitions are credited while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RepSchedule {
    /// One rep every `every_ticks` sensor ticks
    Periodic { every_ticks: u32 },
    /// Each sensor tick credits a rep with probability `chance`
    Probabilistic { chance: f64 },
}

impl Default for RepSchedule {
    fn default() -> Self {
        RepSchedule::Periodic {
            every_ticks: DEFAULT_TICKS_PER_REP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub total_seconds: u32,
    pub reps: u32,
    pub sensor: SensorReading,
    calorie_hundredths: u32,
}

impl SessionState {
    pub fn new(total_seconds: u32) -> Self {
        Self {
            phase: Phase::Idle,
            remaining_seconds: total_seconds,
            total_seconds,
            reps: 0,
            sensor: SensorReading::baseline(),
            calorie_hundredths: 0,
        }
    }

    /// Burned calories rounded to one decimal place
    pub fn calories(&self) -> f64 {
        (self.calorie_hundredths as f64 / 10.0).round() / 10.0
    }

    pub fn calorie_hundredths(&self) -> u32 {
        self.calorie_hundredths
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }
}

/// A timed exercise session: countdown, simulated sensor feed and rep/calorie counters.
///
/// Every operation is total. Transitions that make no sense in the current
/// phase leave the state untouched and return `false`.
#[derive(Debug)]
pub struct Session<R = StdRng> {
    state: SessionState,
    rep_schedule: RepSchedule,
    ticks_since_rep: u32,
    rng: R,
}

impl Session<StdRng> {
    pub fn new(total_seconds: u32, rep_schedule: RepSchedule) -> Self {
        Self::with_rng(total_seconds, rep_schedule, StdRng::from_entropy())
    }

    pub fn seeded(total_seconds: u32, rep_schedule: RepSchedule, seed: u64) -> Self {
        Self::with_rng(total_seconds, rep_schedule, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    /// A zero duration is bumped to one second so the countdown always has a tick to run
    pub fn with_rng(total_seconds: u32, rep_schedule: RepSchedule, rng: R) -> Self {
        Self {
            state: SessionState::new(total_seconds.max(1)),
            rep_schedule,
            ticks_since_rep: 0,
            rng,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Running or paused
    pub fn is_active(&self) -> bool {
        matches!(self.state.phase, Phase::Running | Phase::Paused)
    }

    pub fn summary(&self) -> Summary {
        Summary::from(&self.state)
    }

    pub fn start(&mut self) -> bool {
        match self.state.phase {
            Phase::Idle => {}
            // a new round on the same counters
            Phase::Finished => self.state.remaining_seconds = self.state.total_seconds,
            Phase::Running | Phase::Paused => return false,
        }
        self.transition(Phase::Running);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.transition(Phase::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state.phase != Phase::Paused {
            return false;
        }
        self.transition(Phase::Running);
        true
    }

    /// The single pause button: pauses a running session, resumes a paused one
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::Finished => false,
        }
    }

    /// Halt the session. Counters and the last reading stay visible until `reset`.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.ticks_since_rep = 0;
        self.transition(Phase::Idle);
        info!(summary = %self.summary(), "session stopped");
        true
    }

    pub fn reset(&mut self) {
        let total = self.state.total_seconds;
        self.state = SessionState::new(total);
        self.ticks_since_rep = 0;
        debug!(total_seconds = total, "session reset");
    }

    /// One-second countdown step
    pub fn countdown_tick(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.transition(Phase::Finished);
            info!(summary = %self.summary(), "session finished");
        }
        true
    }

    /// Fast step: new sensor sample, rep accrual and calorie burn
    pub fn sensor_tick(&mut self) -> bool {
        if self.state.phase != Phase::Running {
            return false;
        }
        self.state.sensor = self.state.sensor.perturb(&mut self.rng);
        if self.rep_due() {
            self.state.reps += 1;
        }
        self.state.calorie_hundredths = self
            .state
            .calorie_hundredths
            .saturating_add(CALORIE_HUNDREDTHS_PER_TICK);
        true
    }

    fn rep_due(&mut self) -> bool {
        match self.rep_schedule {
            RepSchedule::Periodic { every_ticks } => {
                self.ticks_since_rep += 1;
                if self.ticks_since_rep >= every_ticks.max(1) {
                    self.ticks_since_rep = 0;
                    true
                } else {
                    false
                }
            }
            RepSchedule::Probabilistic { chance } => {
                // gen_bool panics on NaN
                let chance = if chance.is_finite() {
                    chance.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                self.rng.gen_bool(chance)
            }
        }
    }

    fn transition(&mut self, to: Phase) {
        debug!(from = %self.state.phase, %to, remaining = self.state.remaining_seconds, "phase change");
        self.state.phase = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session(secs: u32) -> Session {
        crate::logging::init_test();
        Session::seeded(secs, RepSchedule::default(), 11)
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session(60);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.state().remaining_seconds, 60);
        assert_eq!(s.state().total_seconds, 60);
        assert_eq!(s.state().reps, 0);
        assert_eq!(s.state().calories(), 0.0);
        assert_eq!(s.state().sensor, SensorReading::baseline());
    }

    #[test]
    fn test_zero_duration_is_bumped() {
        let s = session(0);
        assert_eq!(s.state().total_seconds, 1);
    }

    #[test]
    fn test_start_pause_resume_stop() {
        let mut s = session(60);
        assert!(s.start());
        assert_eq!(s.phase(), Phase::Running);
        assert!(!s.start(), "start while running is a no-op");

        assert!(s.pause());
        assert_eq!(s.phase(), Phase::Paused);
        assert!(!s.start(), "start while paused is a no-op");
        assert!(!s.pause());

        assert!(s.resume());
        assert_eq!(s.phase(), Phase::Running);
        assert!(!s.resume());

        assert!(s.stop());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!s.stop());
    }

    #[test]
    fn test_invalid_transitions_from_idle() {
        let mut s = session(60);
        assert!(!s.pause());
        assert!(!s.resume());
        assert!(!s.toggle_pause());
        assert!(!s.stop());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_toggle_pause() {
        let mut s = session(60);
        s.start();
        assert!(s.toggle_pause());
        assert_eq!(s.phase(), Phase::Paused);
        assert!(s.toggle_pause());
        assert_eq!(s.phase(), Phase::Running);
    }

    #[test]
    fn test_stop_from_paused() {
        let mut s = session(60);
        s.start();
        s.pause();
        assert!(s.stop());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_countdown_runs_to_finished() {
        let mut s = session(3);
        s.start();
        assert!(s.countdown_tick());
        assert_eq!(s.state().remaining_seconds, 2);
        assert!(s.countdown_tick());
        assert_eq!(s.state().remaining_seconds, 1);
        assert!(s.countdown_tick());
        assert_eq!(s.state().remaining_seconds, 0);
        assert_eq!(s.phase(), Phase::Finished);

        assert!(!s.countdown_tick());
        assert_eq!(s.state().remaining_seconds, 0);
        assert!(!s.sensor_tick());
    }

    #[test]
    fn test_ticks_ignored_unless_running() {
        let mut s = session(10);
        assert!(!s.countdown_tick());
        assert!(!s.sensor_tick());

        s.start();
        s.pause();
        let before = s.state().clone();
        assert!(!s.countdown_tick());
        assert!(!s.sensor_tick());
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_stop_keeps_counters() {
        let mut s = session(60);
        s.start();
        for _ in 0..30 {
            s.sensor_tick();
        }
        s.countdown_tick();
        let reps = s.state().reps;
        let calories = s.state().calories();
        let reading = s.state().sensor;
        s.stop();

        assert_eq!(s.state().reps, reps);
        assert_eq!(s.state().calories(), calories);
        assert_eq!(s.state().sensor, reading);
        assert_eq!(s.state().remaining_seconds, 59);
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut s = session(60);
        s.start();
        for _ in 0..45 {
            s.sensor_tick();
        }
        for _ in 0..5 {
            s.countdown_tick();
        }
        assert!(s.state().reps > 0);

        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.state().remaining_seconds, 60);
        assert_eq!(s.state().reps, 0);
        assert_eq!(s.state().calories(), 0.0);
        assert_eq!(s.state().sensor, SensorReading::baseline());
    }

    #[test]
    fn test_reset_while_running() {
        let mut s = session(20);
        s.start();
        s.countdown_tick();
        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.state().remaining_seconds, 20);
    }

    #[test]
    fn test_periodic_reps_every_fifteen_ticks() {
        let mut s = session(60);
        s.start();
        for _ in 0..14 {
            s.sensor_tick();
        }
        assert_eq!(s.state().reps, 0);
        s.sensor_tick();
        assert_eq!(s.state().reps, 1);
        for _ in 0..15 {
            s.sensor_tick();
        }
        assert_eq!(s.state().reps, 2);
    }

    #[test]
    fn test_periodic_counter_survives_pause() {
        let mut s = session(60);
        s.start();
        for _ in 0..10 {
            s.sensor_tick();
        }
        s.pause();
        s.resume();
        for _ in 0..5 {
            s.sensor_tick();
        }
        assert_eq!(s.state().reps, 1);
    }

    #[test]
    fn test_periodic_zero_interval_counts_every_tick() {
        let mut s = Session::seeded(60, RepSchedule::Periodic { every_ticks: 0 }, 1);
        s.start();
        s.sensor_tick();
        s.sensor_tick();
        assert_eq!(s.state().reps, 2);
    }

    #[test]
    fn test_probabilistic_extremes() {
        let mut never = Session::seeded(60, RepSchedule::Probabilistic { chance: 0.0 }, 5);
        let mut always = Session::seeded(60, RepSchedule::Probabilistic { chance: 1.0 }, 5);
        never.start();
        always.start();
        for _ in 0..50 {
            never.sensor_tick();
            always.sensor_tick();
        }
        assert_eq!(never.state().reps, 0);
        assert_eq!(always.state().reps, 50);
    }

    #[test]
    fn test_probabilistic_out_of_range_chance_is_clamped() {
        let mut s = Session::seeded(60, RepSchedule::Probabilistic { chance: 7.5 }, 5);
        s.start();
        s.sensor_tick();
        assert_eq!(s.state().reps, 1);
    }

    #[test]
    fn test_calories_accrue_per_sensor_tick() {
        let mut s = session(60);
        s.start();
        s.sensor_tick();
        assert_eq!(s.state().calorie_hundredths(), 5);
        assert_eq!(s.state().calories(), 0.1);
        s.sensor_tick();
        assert_eq!(s.state().calories(), 0.1);
        for _ in 0..18 {
            s.sensor_tick();
        }
        // 20 ticks x 0.05
        assert_eq!(s.state().calories(), 1.0);
    }

    #[test]
    fn test_calories_non_decreasing() {
        let mut s = session(600);
        s.start();
        let mut last = 0.0;
        for _ in 0..1_000 {
            s.sensor_tick();
            let now = s.state().calories();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_sensor_tick_moves_reading_within_bounds() {
        let mut s = session(600);
        s.start();
        for _ in 0..2_000 {
            s.sensor_tick();
            assert!(s.state().sensor.within_bounds());
        }
    }

    #[test]
    fn test_start_from_finished_keeps_counters() {
        let mut s = Session::seeded(1, RepSchedule::Periodic { every_ticks: 1 }, 1);
        s.start();
        s.sensor_tick();
        s.countdown_tick();
        assert_eq!(s.phase(), Phase::Finished);
        let reading = s.state().sensor;

        assert!(s.start());
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.state().remaining_seconds, 1);
        assert_eq!(s.state().reps, 1);
        assert_eq!(s.state().calorie_hundredths(), 5);
        assert_eq!(s.state().sensor, reading);

        s.sensor_tick();
        assert_eq!(s.state().reps, 2);
    }

    #[test]
    fn test_non_finite_chance_never_credits() {
        for chance in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut s = Session::seeded(60, RepSchedule::Probabilistic { chance }, 1);
            s.start();
            for _ in 0..20 {
                assert!(s.sensor_tick());
            }
            assert_eq!(s.state().reps, 0);
        }
    }

    #[test]
    fn test_calories_saturate() {
        let mut s = session(60);
        s.start();
        s.state.calorie_hundredths = u32::MAX - 2;
        s.sensor_tick();
        assert_eq!(s.state().calorie_hundredths(), u32::MAX);
        s.sensor_tick();
        assert_eq!(s.state().calorie_hundredths(), u32::MAX);
    }

    #[test]
    fn test_elapsed() {
        let mut s = session(4);
        assert_eq!(s.state().elapsed_seconds(), 0);
        s.start();
        s.countdown_tick();
        assert_eq!(s.state().elapsed_seconds(), 1);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Idle.to_string(), "Idle");
        assert_eq!(Phase::Finished.to_string(), "Finished");
    }

    #[test]
    fn test_rep_schedule_serde() {
        let json = serde_json::to_string(&RepSchedule::default()).unwrap();
        assert_eq!(json, r#"{"mode":"periodic","every_ticks":15}"#);
        let parsed: RepSchedule =
            serde_json::from_str(r#"{"mode":"probabilistic","chance":0.1}"#).unwrap();
        assert_matches!(parsed, RepSchedule::Probabilistic { chance } if chance == 0.1);
    }
}
