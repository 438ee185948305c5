use crate::error::WheelError;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

impl Label {
    /// Trims surrounding whitespace, rejecting labels that end up empty or
    /// that contain line breaks or other control characters.
    pub fn parse(raw: &str) -> Result<Self, WheelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WheelError::EmptyLabel);
        }
        if trimmed.chars().any(char::is_control) {
            return Err(WheelError::InvalidLabel(trimmed.escape_debug().to_string()));
        }
        Ok(Self::new(trimmed))
    }
}

/// Angular bounds of one segment, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    pub start: f64,
    pub center: f64,
    pub end: f64,
}

/// Ordered wheel entries plus the wheel's absolute orientation.
///
/// Segment `i` starts at `base_angle + i * slice_width`. The base angle keeps
/// accumulating across spins and is never wrapped.
#[derive(Debug, Clone, Default)]
pub struct SegmentModel {
    entries: Vec<Label>,
    base_angle: f64,
}

impl SegmentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = labels
            .into_iter()
            .filter_map(|s| match Label::parse(s.as_ref()) {
                Ok(label) => Some(label),
                Err(e) => {
                    log::warn!("Skipping entry {:?}: {}", s.as_ref(), e);
                    None
                }
            })
            .collect();
        Self {
            entries,
            base_angle: 0.0,
        }
    }

    pub fn entries(&self) -> &[Label] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.entries.get(index)
    }

    pub fn add_entry(&mut self, raw: &str) -> Result<usize, WheelError> {
        let label = Label::parse(raw)?;
        self.entries.push(label);
        Ok(self.entries.len() - 1)
    }

    pub fn remove_entry(&mut self, index: usize) -> Result<Label, WheelError> {
        let len = self.entries.len();
        if index >= len {
            return Err(WheelError::IndexOutOfRange { index, len });
        }
        Ok(self.entries.remove(index))
    }

    pub fn slice_width(&self) -> Result<f64, WheelError> {
        slice_width_for(self.entries.len())
    }

    pub fn angle_center_of(&self, index: usize, base_angle: f64) -> Result<f64, WheelError> {
        let slice = self.slice_width()?;
        Ok(base_angle + index as f64 * slice + slice / 2.0)
    }

    pub fn segment_span(&self, index: usize, base_angle: f64) -> Result<SegmentSpan, WheelError> {
        let slice = self.slice_width()?;
        let start = base_angle + index as f64 * slice;
        Ok(SegmentSpan {
            start,
            center: start + slice / 2.0,
            end: start + slice,
        })
    }

    /// Whole-number percentage each entry has of being picked.
    pub fn win_chance_percent(&self) -> Option<u32> {
        (!self.entries.is_empty()).then(|| 100 / self.entries.len() as u32)
    }

    pub fn base_angle(&self) -> f64 {
        self.base_angle
    }

    pub(crate) fn advance(&mut self, radians: f64) {
        self.base_angle += radians;
    }
}

pub(crate) fn slice_width_for(count: usize) -> Result<f64, WheelError> {
    if count == 0 {
        return Err(WheelError::EmptyWheel);
    }
    Ok(TAU / count as f64)
}
