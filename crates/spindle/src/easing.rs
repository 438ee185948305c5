//! Angular speed curve of a spin, in degrees per nominal frame.

use crate::engine::SpinTiming;

/// Cubic ease-in from 0 to `peak` over `duration`.
pub fn ease_in_cubic(t: f64, peak: f64, duration: f64) -> f64 {
    let t = t / duration;
    peak * t * t * t
}

/// Quintic ease-out progress from 0 to `peak` over `duration`.
pub fn ease_out_quintic(t: f64, peak: f64, duration: f64) -> f64 {
    let t = t / duration - 1.0;
    peak * (t.powi(5) + 1.0)
}

/// Speed `elapsed_ms` into a spin: ramps up to `initial_velocity` during the
/// acceleration window, then decays back to zero at `timing.total_ms`.
pub fn angular_speed(elapsed_ms: f64, initial_velocity: f64, timing: &SpinTiming) -> f64 {
    if elapsed_ms < timing.acceleration_ms {
        ease_in_cubic(elapsed_ms, initial_velocity, timing.acceleration_ms)
    } else {
        let decelerating = elapsed_ms - timing.acceleration_ms;
        let window = timing.total_ms - timing.acceleration_ms;
        initial_velocity - ease_out_quintic(decelerating, initial_velocity, window)
    }
}
