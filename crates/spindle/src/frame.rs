/// Supplies frame timestamps, in milliseconds, to whatever is driving a spin.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<f64>;
}

/// Evenly spaced, never-ending frames, for offline spins and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCadence {
    next: f64,
    step_ms: f64,
}

impl FixedCadence {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            next: start_ms,
            step_ms,
        }
    }

    /// 60 Hz starting at zero.
    pub fn sixty_hz() -> Self {
        Self::new(0.0, 1000.0 / 60.0)
    }
}

impl Iterator for FixedCadence {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let now = self.next;
        self.next += self.step_ms;
        Some(now)
    }
}

impl<I> FrameSource for I
where
    I: Iterator<Item = f64>,
{
    fn next_frame(&mut self) -> Option<f64> {
        self.next()
    }
}
