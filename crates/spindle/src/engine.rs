use crate::easing::angular_speed;
use crate::error::WheelError;
use crate::segment::SegmentModel;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::Display as StrumDisplay;

/// Frame length the speed curve is calibrated against.
pub const NOMINAL_FRAME_MS: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    pub acceleration_ms: f64,
    pub total_ms: f64,
    /// Lower bound (inclusive) of the sampled peak speed, degrees per nominal frame.
    pub min_velocity: f64,
    /// Upper bound (exclusive) of the sampled peak speed.
    pub max_velocity: f64,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            acceleration_ms: 3000.0,
            total_ms: 12000.0,
            min_velocity: 10.0,
            max_velocity: 20.0,
        }
    }
}

impl SpinTiming {
    pub fn validate(&self) -> Result<(), WheelError> {
        if !(self.acceleration_ms > 0.0) {
            return Err(WheelError::InvalidTiming("acceleration must be positive"));
        }
        if !(self.total_ms > self.acceleration_ms) {
            return Err(WheelError::InvalidTiming(
                "total duration must exceed the acceleration window",
            ));
        }
        if !(self.min_velocity > 0.0 && self.max_velocity > self.min_velocity) {
            return Err(WheelError::InvalidTiming(
                "velocity range must be positive and non-empty",
            ));
        }
        Ok(())
    }
}

/// Bookkeeping for a spin in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    started_at: Option<f64>,
    last_frame_at: Option<f64>,
    elapsed_ms: f64,
    initial_velocity: f64,
    // entries are frozen at start; the winner is resolved against these
    entry_count: usize,
    slice_width: f64,
}

impl Spin {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinState {
    Idle,
    Spinning(Spin),
    Settled { winning_index: usize },
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SpinPhase {
    Idle,
    Spinning,
    Settled,
}

impl From<&SpinState> for SpinPhase {
    fn from(state: &SpinState) -> Self {
        match state {
            SpinState::Idle => SpinPhase::Idle,
            SpinState::Spinning(_) => SpinPhase::Spinning,
            SpinState::Settled { .. } => SpinPhase::Settled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No spin is running; the frame was ignored.
    Idle,
    Spinning { base_angle: f64 },
    Settled { winning_index: usize },
}

/// Drives one wheel's spins. The engine never schedules itself: the owner calls
/// [`SpinEngine::tick`] once per frame until it reports [`TickOutcome::Settled`].
#[derive(Debug)]
pub struct SpinEngine<R = SmallRng> {
    rng: R,
    timing: SpinTiming,
    state: SpinState,
}

impl SpinEngine<SmallRng> {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for SpinEngine<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SpinEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            timing: SpinTiming::default(),
            state: SpinState::Idle,
        }
    }

    pub fn with_timing(mut self, timing: SpinTiming) -> Result<Self, WheelError> {
        timing.validate()?;
        self.timing = timing;
        Ok(self)
    }

    /// Replaces the timing for future spins; the current spin keeps running on it.
    pub fn set_timing(&mut self, timing: SpinTiming) -> Result<(), WheelError> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    pub fn state(&self) -> &SpinState {
        &self.state
    }

    pub fn phase(&self) -> SpinPhase {
        SpinPhase::from(&self.state)
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.state, SpinState::Spinning(_))
    }

    pub fn winning_index(&self) -> Option<usize> {
        match self.state {
            SpinState::Settled { winning_index } => Some(winning_index),
            _ => None,
        }
    }

    pub fn initial_velocity(&self) -> Option<f64> {
        match &self.state {
            SpinState::Spinning(spin) => Some(spin.initial_velocity),
            _ => None,
        }
    }

    /// Starts a spin with a freshly sampled peak speed. Does nothing while a
    /// spin is already running.
    pub fn start(&mut self, model: &SegmentModel) -> Result<(), WheelError> {
        if self.is_spinning() {
            log::debug!("Spin already in progress, ignoring start");
            return Ok(());
        }
        let slice_width = model.slice_width()?;
        let velocity = self
            .rng
            .gen_range(self.timing.min_velocity..self.timing.max_velocity);
        self.begin(model.len(), slice_width, velocity);
        Ok(())
    }

    /// Like [`SpinEngine::start`] but with a caller-chosen peak speed.
    pub fn start_with_velocity(
        &mut self,
        model: &SegmentModel,
        initial_velocity: f64,
    ) -> Result<(), WheelError> {
        if self.is_spinning() {
            log::debug!("Spin already in progress, ignoring start");
            return Ok(());
        }
        let slice_width = model.slice_width()?;
        self.begin(model.len(), slice_width, initial_velocity);
        Ok(())
    }

    fn begin(&mut self, entry_count: usize, slice_width: f64, initial_velocity: f64) {
        log::info!(
            "Spinning {} entries at {:.2} deg/frame",
            entry_count,
            initial_velocity
        );
        self.state = SpinState::Spinning(Spin {
            started_at: None,
            last_frame_at: None,
            elapsed_ms: 0.0,
            initial_velocity,
            entry_count,
            slice_width,
        });
    }

    /// Stops a running spin without picking a winner.
    pub fn cancel(&mut self) -> bool {
        if !self.is_spinning() {
            return false;
        }
        log::info!("Spin cancelled");
        self.state = SpinState::Idle;
        true
    }

    pub fn tick(&mut self, model: &mut SegmentModel, timestamp_ms: f64) -> TickOutcome {
        let SpinState::Spinning(spin) = &mut self.state else {
            return TickOutcome::Idle;
        };

        // the first frame only latches the clock
        let started_at = *spin.started_at.get_or_insert(timestamp_ms);
        let last_frame_at = spin.last_frame_at.replace(timestamp_ms).unwrap_or(timestamp_ms);
        let delta_ms = timestamp_ms - last_frame_at;
        spin.elapsed_ms = timestamp_ms - started_at;

        if spin.elapsed_ms >= self.timing.total_ms {
            let winning_index =
                resolve_winner(model.base_angle(), spin.entry_count, spin.slice_width);
            log::info!(
                "Spin settled on index {} after {:.0} ms",
                winning_index,
                spin.elapsed_ms
            );
            self.state = SpinState::Settled { winning_index };
            return TickOutcome::Settled { winning_index };
        }

        let speed = angular_speed(spin.elapsed_ms, spin.initial_velocity, &self.timing);
        let frame_scale = delta_ms / NOMINAL_FRAME_MS;
        model.advance((speed * frame_scale).to_radians());

        TickOutcome::Spinning {
            base_angle: model.base_angle(),
        }
    }
}

/// Index of the segment under the pointer for a wheel rotated by `base_angle`.
///
/// The pointer counter-rotates by the same amount as the wheel, so the relative
/// angle is doubled; the +90 degrees puts angle zero under the pointer.
pub fn resolve_winner(base_angle: f64, entry_count: usize, slice_width: f64) -> usize {
    let degrees = (2.0 * base_angle).to_degrees() + 90.0;
    let arc = slice_width.to_degrees();
    let offset = (360.0 - degrees.rem_euclid(360.0)).rem_euclid(360.0);
    ((offset / arc).floor() as usize).min(entry_count.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn model(labels: &[&str]) -> SegmentModel {
        SegmentModel::from_labels(labels.iter().copied())
    }

    fn run_at_cadence(
        engine: &mut SpinEngine,
        model: &mut SegmentModel,
        step_ms: f64,
    ) -> (usize, usize) {
        let mut frames = 0;
        loop {
            let ts = 1000.0 + frames as f64 * step_ms;
            frames += 1;
            if let TickOutcome::Settled { winning_index } = engine.tick(model, ts) {
                return (frames, winning_index);
            }
            assert!(frames < 100_000, "spin never settled");
        }
    }

    #[test]
    fn test_start_on_empty_wheel_fails() {
        let mut engine = SpinEngine::seeded(1);
        let empty = SegmentModel::new();
        assert_eq!(engine.start(&empty), Err(WheelError::EmptyWheel));
        assert_eq!(engine.phase(), SpinPhase::Idle);
    }

    #[test]
    fn test_second_start_does_not_resample() {
        let mut engine = SpinEngine::seeded(7);
        let wheel = model(&["A", "B"]);
        engine.start(&wheel).unwrap();
        let first = engine.initial_velocity().unwrap();
        assert!((10.0..20.0).contains(&first));

        engine.start(&wheel).unwrap();
        assert_eq!(engine.initial_velocity(), Some(first));
    }

    #[test]
    fn test_first_tick_latches_without_moving() {
        let mut engine = SpinEngine::seeded(3);
        let mut wheel = model(&["A", "B", "C"]);
        engine.start(&wheel).unwrap();
        let outcome = engine.tick(&mut wheel, 5_000.0);
        assert_eq!(outcome, TickOutcome::Spinning { base_angle: 0.0 });
    }

    #[test]
    fn test_spin_tracks_elapsed_time_from_first_frame() {
        let mut engine = SpinEngine::seeded(3);
        let mut wheel = model(&["A", "B", "C"]);
        engine.start(&wheel).unwrap();
        engine.tick(&mut wheel, 1_000.0);
        engine.tick(&mut wheel, 1_250.0);

        let SpinState::Spinning(spin) = engine.state() else {
            panic!("expected a running spin, got {:?}", engine.state());
        };
        assert_eq!(spin.elapsed_ms(), 250.0);
        assert_eq!(spin.entry_count(), 3);
        assert_eq!(engine.initial_velocity(), Some(spin.initial_velocity()));
    }

    #[test]
    fn test_tick_while_idle_is_ignored() {
        let mut engine = SpinEngine::seeded(3);
        let mut wheel = model(&["A"]);
        assert_eq!(engine.tick(&mut wheel, 10.0), TickOutcome::Idle);
        assert_eq!(wheel.base_angle(), 0.0);
    }

    #[test]
    fn test_four_entries_at_nominal_cadence() {
        let mut engine = SpinEngine::seeded(0);
        let mut wheel = model(&["A", "B", "C", "D"]);
        engine.start_with_velocity(&wheel, 15.0).unwrap();

        let (frames, winner) = run_at_cadence(&mut engine, &mut wheel, NOMINAL_FRAME_MS);

        // frame 0 latches, frame 800 reaches 12000 ms and settles
        assert_eq!(frames, 801);
        assert!(winner < 4);
        assert_eq!(engine.winning_index(), Some(winner));

        let timing = SpinTiming::default();
        let expected: f64 = (1..800)
            .map(|k| angular_speed(k as f64 * NOMINAL_FRAME_MS, 15.0, &timing).to_radians())
            .sum();
        assert!((wheel.base_angle() - expected).abs() < 1e-9);
        assert_eq!(winner, resolve_winner(expected, 4, PI / 2.0));
    }

    #[test]
    fn test_settling_frame_does_not_move_the_wheel() {
        let mut engine = SpinEngine::seeded(0);
        let mut wheel = model(&["A", "B"]);
        engine.start_with_velocity(&wheel, 12.0).unwrap();
        engine.tick(&mut wheel, 0.0);
        engine.tick(&mut wheel, 11_990.0);
        let before = wheel.base_angle();
        let outcome = engine.tick(&mut wheel, 12_000.0);
        assert!(matches!(outcome, TickOutcome::Settled { .. }));
        assert_eq!(wheel.base_angle(), before);
    }

    #[test]
    fn test_single_entry_always_wins() {
        for seed in 0..16 {
            let mut engine = SpinEngine::seeded(seed);
            let mut wheel = model(&["OnlyOne"]);
            engine.start(&wheel).unwrap();
            let (_, winner) = run_at_cadence(&mut engine, &mut wheel, 16.7);
            assert_eq!(winner, 0);
        }
    }

    #[test]
    fn test_winner_is_always_in_range() {
        for seed in 0..32 {
            let mut engine = SpinEngine::seeded(seed);
            let mut wheel = model(&["A", "B", "C", "D", "E", "F", "G"]);
            engine.start(&wheel).unwrap();
            let (_, winner) = run_at_cadence(&mut engine, &mut wheel, 8.3);
            assert!(winner < 7);
        }
    }

    #[test]
    fn test_same_frames_same_winner() {
        let spin = || {
            let mut engine = SpinEngine::seeded(99);
            let mut wheel = model(&["A", "B", "C", "D", "E"]);
            engine.start(&wheel).unwrap();
            let outcome = run_at_cadence(&mut engine, &mut wheel, 16.0);
            (outcome, wheel.base_angle())
        };
        assert_eq!(spin(), spin());
    }

    #[test]
    fn test_resolve_winner_at_rest() {
        // 90 degrees puts the pointer 270 degrees into a four-way wheel
        assert_eq!(resolve_winner(0.0, 4, PI / 2.0), 3);
        assert_eq!(resolve_winner(PI / 4.0, 4, PI / 2.0), 2);
        assert_eq!(resolve_winner(123.456, 1, 2.0 * PI), 0);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut engine = SpinEngine::seeded(5);
        let mut wheel = model(&["A", "B"]);
        engine.start(&wheel).unwrap();
        engine.tick(&mut wheel, 0.0);
        assert!(engine.cancel());
        assert_eq!(engine.phase(), SpinPhase::Idle);
        assert_eq!(engine.winning_index(), None);
        assert!(!engine.cancel());
    }

    #[test]
    fn test_restart_after_settle_clears_winner() {
        let mut engine = SpinEngine::seeded(11);
        let mut wheel = model(&["A", "B", "C"]);
        engine.start(&wheel).unwrap();
        run_at_cadence(&mut engine, &mut wheel, 15.0);
        assert!(engine.winning_index().is_some());

        engine.start(&wheel).unwrap();
        assert_eq!(engine.phase(), SpinPhase::Spinning);
        assert_eq!(engine.winning_index(), None);
    }

    #[test]
    fn test_invalid_timing_is_rejected() {
        let timing = SpinTiming {
            acceleration_ms: 5000.0,
            total_ms: 4000.0,
            ..SpinTiming::default()
        };
        assert!(matches!(
            SpinEngine::seeded(0).with_timing(timing),
            Err(WheelError::InvalidTiming(_))
        ));
    }
}
