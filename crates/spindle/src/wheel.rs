use crate::colors::{Palette, Swatch};
use crate::engine::{SpinEngine, SpinPhase, SpinTiming, TickOutcome};
use crate::error::WheelError;
use crate::frame::FrameSource;
use crate::segment::{Label, SegmentModel, SegmentSpan};
use rand::Rng;
use rand::rngs::SmallRng;
use std::fmt;

/// What a renderer needs to draw one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentView<'a> {
    pub index: usize,
    pub label: &'a Label,
    pub span: SegmentSpan,
    pub color: Swatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelStats {
    pub participants: usize,
    pub chance_percent: Option<u32>,
}

impl fmt::Display for WheelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chance_percent {
            Some(chance) => write!(
                f,
                "{} participants, {}% chance to win",
                self.participants, chance
            ),
            None => write!(f, "{} participants", self.participants),
        }
    }
}

/// A segment model and its spin engine behind one owner.
///
/// Entries are frozen while a spin runs, so the settled index always points at
/// the entry that was under the pointer.
#[derive(Debug)]
pub struct Wheel<R = SmallRng> {
    segments: SegmentModel,
    engine: SpinEngine<R>,
    palette: Palette,
    last_winner: Option<Label>,
}

impl Wheel<SmallRng> {
    pub fn new(segments: SegmentModel) -> Self {
        Self::with_engine(segments, SpinEngine::new())
    }
}

impl<R: Rng> Wheel<R> {
    pub fn with_engine(segments: SegmentModel, engine: SpinEngine<R>) -> Self {
        Self {
            segments,
            engine,
            palette: Palette::default(),
            last_winner: None,
        }
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_timing(&mut self, timing: SpinTiming) -> Result<(), WheelError> {
        self.engine.set_timing(timing)
    }

    pub fn model(&self) -> &SegmentModel {
        &self.segments
    }

    pub fn engine(&self) -> &SpinEngine<R> {
        &self.engine
    }

    pub fn entries(&self) -> &[Label] {
        self.segments.entries()
    }

    fn ensure_idle(&self) -> Result<(), WheelError> {
        if self.engine.is_spinning() {
            return Err(WheelError::SpinInProgress);
        }
        Ok(())
    }

    pub fn add_entry(&mut self, raw: &str) -> Result<usize, WheelError> {
        self.ensure_idle()?;
        self.segments.add_entry(raw)
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<Label, WheelError> {
        self.ensure_idle()?;
        self.segments.remove_entry(index)
    }

    /// Swaps in a new entry list, keeping the wheel's orientation.
    pub fn replace_entries<I, S>(&mut self, labels: I) -> Result<(), WheelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_idle()?;
        let base_angle = self.segments.base_angle();
        self.segments = SegmentModel::from_labels(labels);
        self.segments.advance(base_angle);
        Ok(())
    }

    pub fn spin(&mut self) -> Result<(), WheelError> {
        let already_spinning = self.engine.is_spinning();
        self.engine.start(&self.segments)?;
        if !already_spinning {
            self.last_winner = None;
        }
        Ok(())
    }

    pub fn tick(&mut self, timestamp_ms: f64) -> TickOutcome {
        let outcome = self.engine.tick(&mut self.segments, timestamp_ms);
        if let TickOutcome::Settled { winning_index } = outcome {
            self.last_winner = self.segments.get(winning_index).cloned();
            if let Some(winner) = &self.last_winner {
                log::info!("Winner: {}", winner);
            }
        }
        outcome
    }

    pub fn cancel(&mut self) -> bool {
        self.engine.cancel()
    }

    /// Spins and drives the wheel from `frames` until it settles.
    pub fn roll<F>(&mut self, frames: &mut F) -> Result<usize, WheelError>
    where
        F: FrameSource + ?Sized,
    {
        self.spin()?;
        while let Some(timestamp_ms) = frames.next_frame() {
            match self.tick(timestamp_ms) {
                TickOutcome::Spinning { .. } => {}
                TickOutcome::Settled { winning_index } => return Ok(winning_index),
                TickOutcome::Idle => return Err(WheelError::NotSpinning),
            }
        }
        Err(WheelError::FramesExhausted)
    }

    pub fn phase(&self) -> SpinPhase {
        self.engine.phase()
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    pub fn base_angle(&self) -> f64 {
        self.segments.base_angle()
    }

    /// The pointer turns against the wheel.
    pub fn pointer_angle(&self) -> f64 {
        -self.segments.base_angle()
    }

    pub fn last_winner(&self) -> Option<&Label> {
        self.last_winner.as_ref()
    }

    pub fn stats(&self) -> WheelStats {
        WheelStats {
            participants: self.segments.len(),
            chance_percent: self.segments.win_chance_percent(),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = SegmentView<'_>> + '_ {
        let base_angle = self.segments.base_angle();
        self.segments
            .entries()
            .iter()
            .enumerate()
            .filter_map(move |(index, label)| {
                let span = self.segments.segment_span(index, base_angle).ok()?;
                Some(SegmentView {
                    index,
                    label,
                    span,
                    color: self.palette.color_of(index),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SpinState;
    use crate::frame::FixedCadence;
    use std::f64::consts::PI;

    fn wheel(labels: &[&str]) -> Wheel {
        Wheel::with_engine(
            SegmentModel::from_labels(labels.iter().copied()),
            SpinEngine::seeded(42),
        )
    }

    #[test]
    fn test_entries_are_frozen_while_spinning() {
        let mut wheel = wheel(&["A", "B", "C"]);
        wheel.spin().unwrap();
        wheel.tick(0.0);

        assert_eq!(wheel.add_entry("D"), Err(WheelError::SpinInProgress));
        assert_eq!(wheel.remove_entry(0), Err(WheelError::SpinInProgress));
        assert_eq!(
            wheel.replace_entries(["X"]),
            Err(WheelError::SpinInProgress)
        );
        assert_eq!(wheel.entries().len(), 3);

        wheel.cancel();
        assert_eq!(wheel.add_entry("D"), Ok(3));
    }

    #[test]
    fn test_spin_snapshots_the_entry_list() {
        let mut wheel = wheel(&["A", "B", "C", "D"]);
        wheel.spin().unwrap();
        wheel.tick(0.0);
        wheel.tick(16.0);

        let SpinState::Spinning(spin) = wheel.engine().state() else {
            panic!("expected a running spin");
        };
        assert_eq!(spin.entry_count(), wheel.model().len());
        assert_eq!(wheel.model().base_angle(), wheel.base_angle());
        assert!(wheel.base_angle() > 0.0);
    }

    #[test]
    fn test_roll_records_winner_label() {
        let mut wheel = wheel(&["Alice", "Bob", "Charlie", "David"]);
        let index = wheel.roll(&mut FixedCadence::sixty_hz()).unwrap();
        assert!(index < 4);
        assert_eq!(wheel.phase(), SpinPhase::Settled);
        assert_eq!(wheel.last_winner(), wheel.entries().get(index));

        // settled wheels accept edits again, the winner label stays put
        let winner = wheel.last_winner().cloned();
        wheel.remove_entry(index).unwrap();
        assert_eq!(wheel.last_winner().cloned(), winner);
    }

    #[test]
    fn test_roll_on_empty_wheel() {
        let mut wheel = wheel(&[]);
        assert_eq!(
            wheel.roll(&mut FixedCadence::sixty_hz()),
            Err(WheelError::EmptyWheel)
        );
        assert_eq!(wheel.phase(), SpinPhase::Idle);
    }

    #[test]
    fn test_roll_runs_out_of_frames() {
        let mut wheel = wheel(&["A", "B"]);
        let mut frames = (0..10).map(|i| i as f64 * 16.0);
        assert_eq!(wheel.roll(&mut frames), Err(WheelError::FramesExhausted));
        assert!(wheel.is_spinning());
    }

    #[test]
    fn test_replace_entries_keeps_orientation() {
        let mut wheel = wheel(&["A", "B"]);
        wheel.roll(&mut FixedCadence::sixty_hz()).unwrap();
        let angle = wheel.base_angle();
        assert!(angle > 0.0);

        wheel.replace_entries(["X", " ", "Y", "Z"]).unwrap();
        assert_eq!(wheel.entries().len(), 3);
        assert_eq!(wheel.base_angle(), angle);
    }

    #[test]
    fn test_segment_views() {
        let wheel = wheel(&["A", "B", "C", "D"]);
        let views: Vec<_> = wheel.segments().collect();
        assert_eq!(views.len(), 4);
        assert_eq!(views[1].label.as_str(), "B");
        assert!((views[1].span.start - PI / 2.0).abs() < 1e-12);
        assert!((views[1].span.center - 3.0 * PI / 4.0).abs() < 1e-12);
        assert_eq!(views[1].color, wheel.palette().color_of(1));
        assert_eq!(wheel.pointer_angle(), 0.0);
    }

    #[test]
    fn test_stats_line() {
        let full = wheel(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        assert_eq!(full.stats().to_string(), "8 participants, 12% chance to win");
        assert_eq!(wheel(&[]).stats().to_string(), "0 participants");
    }
}
