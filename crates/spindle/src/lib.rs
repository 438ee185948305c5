//! Spinning-wheel picker core: entries laid out as equal segments, and a
//! frame-driven spin engine that eases the wheel up to speed, lets it coast
//! down, and reports the segment that ends up under the pointer.

pub mod colors;
pub mod easing;
pub mod engine;
pub mod error;
pub mod frame;
mod macros;
pub mod protocol;
pub mod segment;
pub mod wheel;

pub use colors::{Palette, PaletteName, Swatch};
pub use engine::{SpinEngine, SpinPhase, SpinState, SpinTiming, TickOutcome};
pub use error::WheelError;
pub use frame::{FixedCadence, FrameSource};
pub use segment::{Label, SegmentModel, SegmentSpan};
pub use wheel::{SegmentView, Wheel, WheelStats};
