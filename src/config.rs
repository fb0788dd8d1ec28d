//! Playback tuning configuration

use crate::processing::curve::{DEFAULT_MAX_STEPS, DEFAULT_MIN_STEP_INTERVAL};
use crate::recorder::error::{RecordingError, RecordingResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs controlling how human-like a replay looks.
///
/// Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum timing jitter as a fraction of each inter-action gap (0.05 = ±5%)
    pub jitter_fraction: f64,
    /// Curve bend as a fraction of the straight-line move distance
    pub curve_intensity: f64,
    /// Minimum time between cursor updates along a curve, in milliseconds
    pub min_step_interval_ms: u64,
    /// Maximum number of positions in one curve
    pub max_curve_steps: usize,
    /// Fixed RNG seed for reproducible jitter and curves
    pub seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            jitter_fraction: 0.05,
            curve_intensity: 0.3,
            min_step_interval_ms: (DEFAULT_MIN_STEP_INTERVAL * 1000.0).round() as u64,
            max_curve_steps: DEFAULT_MAX_STEPS,
            seed: None,
        }
    }
}

impl PlaybackConfig {
    /// Exact timing: no jitter and straight-line curves
    pub fn deterministic() -> Self {
        Self {
            jitter_fraction: 0.0,
            curve_intensity: 0.0,
            seed: Some(0),
            ..Self::default()
        }
    }

    pub fn min_step_interval(&self) -> f64 {
        self.min_step_interval_ms as f64 / 1000.0
    }

    pub fn validate(&self) -> RecordingResult<()> {
        if !self.jitter_fraction.is_finite() || !(0.0..0.5).contains(&self.jitter_fraction) {
            return Err(RecordingError::invalid_parameter(format!(
                "jitter_fraction must be in [0, 0.5), got {}",
                self.jitter_fraction
            )));
        }
        if !self.curve_intensity.is_finite() || self.curve_intensity < 0.0 {
            return Err(RecordingError::invalid_parameter(format!(
                "curve_intensity must be non-negative, got {}",
                self.curve_intensity
            )));
        }
        if self.min_step_interval_ms == 0 || self.max_curve_steps == 0 {
            return Err(RecordingError::invalid_parameter(
                "min_step_interval_ms and max_curve_steps must be positive",
            ));
        }
        Ok(())
    }

    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> RecordingResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            RecordingError::invalid_parameter(format!(
                "failed to parse {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;

        tracing::info!(
            "Loaded playback config from {}: jitter={}, intensity={}",
            path.display(),
            config.jitter_fraction,
            config.curve_intensity
        );
        Ok(config)
    }
}
