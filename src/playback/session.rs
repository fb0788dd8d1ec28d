//! Playback session parameters and results

use crate::recorder::error::{RecordingError, RecordingResult};
use crate::recorder::recording::Recording;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// How many times a looped replay runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopCount {
    Times(u32),
    /// Run until cancelled
    Infinite,
}

impl LoopCount {
    pub const ONCE: LoopCount = LoopCount::Times(1);

    /// Whether another iteration follows the `completed`-th one
    pub fn has_more(&self, completed: u32) -> bool {
        match self {
            LoopCount::Times(n) => completed < *n,
            LoopCount::Infinite => true,
        }
    }
}

impl std::fmt::Display for LoopCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoopCount::Times(n) => write!(f, "{}", n),
            LoopCount::Infinite => write!(f, "infinite"),
        }
    }
}

/// Per-call replay options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayOptions {
    /// Playback rate (2.0 plays twice as fast)
    pub speed: f64,
    /// Replace cursor jumps with curved motion
    pub use_bezier: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            speed: 1.0,
            use_bezier: true,
        }
    }
}

impl ReplayOptions {
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_bezier(mut self, use_bezier: bool) -> Self {
        self.use_bezier = use_bezier;
        self
    }
}

/// One replay invocation over a borrowed recording
#[derive(Debug)]
pub struct PlaybackSession<'a> {
    pub id: Uuid,
    pub recording: &'a Recording,
    pub speed: f64,
    pub loop_count: LoopCount,
    /// Seconds between iterations
    pub loop_delay: f64,
    pub use_bezier: bool,
}

impl<'a> PlaybackSession<'a> {
    /// Validate parameters. Nothing is touched if this fails.
    pub fn new(
        recording: &'a Recording,
        options: ReplayOptions,
        loop_count: LoopCount,
        loop_delay: f64,
    ) -> RecordingResult<Self> {
        if !options.speed.is_finite() || options.speed <= 0.0 {
            return Err(RecordingError::invalid_parameter(format!(
                "speed multiplier must be positive, got {}",
                options.speed
            )));
        }
        if loop_count == LoopCount::Times(0) {
            return Err(RecordingError::invalid_parameter("loop count must be at least 1"));
        }
        if !loop_delay.is_finite() || loop_delay < 0.0 {
            return Err(RecordingError::invalid_parameter(format!(
                "loop delay must be non-negative, got {}",
                loop_delay
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            recording,
            speed: options.speed,
            loop_count,
            loop_delay,
            use_bezier: options.use_bezier,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayOutcome {
    Completed,
    /// Stopped by the cancellation token; not an error
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub session_id: Uuid,
    pub outcome: ReplayOutcome,
    /// Iterations started (the last may be partial if cancelled)
    pub iterations: u32,
    pub actions_delivered: usize,
    /// Wall-clock time from the start of the replay (including queueing for the device)
    pub elapsed: Duration,
}
