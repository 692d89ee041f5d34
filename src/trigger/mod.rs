//! Per-channel trigger stabilization.
//!
//! A trigger maps a nominal sample index (derived from the frame clock) to a corrected index
//! whose window lines up in phase with previous frames.

use serde::{Deserialize, Serialize};

use crate::audio::source::SampleSource;
use crate::foundation::error::{WavelockError, WavelockResult};

/// Correlation search with edge refinement.
pub mod correlation;

pub use correlation::CorrelationTrigger;

/// Per-channel aligner contract.
///
/// Implementations own all of their state; one instance serves exactly one channel for the
/// lifetime of a render session.
pub trait Trigger: Send {
    /// Return the corrected sample index for `nominal`.
    fn get_trigger(&mut self, source: &SampleSource, nominal: i64) -> i64;
}

/// Trigger that performs no correction (fixed stride windows).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTrigger;

impl Trigger for NullTrigger {
    fn get_trigger(&mut self, _source: &SampleSource, nominal: i64) -> i64 {
        nominal
    }
}

/// Which trigger implementation a channel uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// [`CorrelationTrigger`].
    #[default]
    Correlation,
    /// [`NullTrigger`].
    Null,
}

/// Signal direction the edge refinement snaps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    /// Negative-to-positive crossing.
    Rising,
    /// Positive-to-negative crossing.
    Falling,
}

/// Where the trigger index sits inside its window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAnchor {
    /// The trigger index is the window center.
    #[default]
    Center,
    /// The trigger index is the first sample of the window.
    Left,
}

impl WindowAnchor {
    /// Offset (in window slots) from the trigger index to the first window slot.
    pub fn start_offset(self, length: usize) -> i64 {
        match self {
            Self::Center => -((length / 2) as i64),
            Self::Left => 0,
        }
    }
}

/// Trigger tuning, as supplied by the session config.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Trigger implementation.
    pub kind: TriggerKind,
    /// Maximum correction in full-rate samples either side of the nominal index.
    /// `None` uses half the trigger window.
    pub search_radius: Option<u32>,
    /// Reference blend factor in `[0, 1]`; higher adapts faster.
    pub responsiveness: f32,
    /// Edge to snap to after the correlation search; `None` disables refinement.
    pub edge: Option<EdgeDirection>,
    /// Window anchoring relative to the trigger index.
    pub anchor: WindowAnchor,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            kind: TriggerKind::Correlation,
            search_radius: None,
            responsiveness: 0.1,
            edge: Some(EdgeDirection::Rising),
            anchor: WindowAnchor::Center,
        }
    }
}

/// Largest accepted `search_radius`, in full-rate samples.
pub const MAX_SEARCH_RADIUS: u32 = 1 << 20;

impl TriggerConfig {
    /// Check tuning values, naming fields under `prefix`.
    pub fn validate(&self, prefix: &str) -> WavelockResult<()> {
        if let Some(r) = self.search_radius
            && r > MAX_SEARCH_RADIUS
        {
            return Err(WavelockError::config(
                format!("{prefix}.search_radius"),
                format!("must be <= {MAX_SEARCH_RADIUS} samples, got {r}"),
            ));
        }
        if !self.responsiveness.is_finite() || !(0.0..=1.0).contains(&self.responsiveness) {
            return Err(WavelockError::config(
                format!("{prefix}.responsiveness"),
                format!("must be within [0, 1], got {}", self.responsiveness),
            ));
        }
        Ok(())
    }
}

/// Build the trigger for one channel.
///
/// `length` is the trigger window in slots and `stride` the subsampling factor between slots.
pub fn create_trigger(
    cfg: &TriggerConfig,
    length: usize,
    stride: usize,
) -> WavelockResult<Box<dyn Trigger>> {
    match cfg.kind {
        TriggerKind::Correlation => Ok(Box::new(CorrelationTrigger::new(cfg, length, stride)?)),
        TriggerKind::Null => Ok(Box::new(NullTrigger)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/mod.rs"]
mod tests;
