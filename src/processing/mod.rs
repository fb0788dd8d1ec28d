//! Processing module for recording transformations
//!
//! This module contains the curve generator used to humanize cursor motion
//! during playback, plus the optimizer and statistics applied to finished
//! recordings.

pub mod curve;
pub mod optimize;
pub mod stats;

pub use curve::{generate_curve, generate_curve_with_rng, steps_for_duration};
pub use optimize::optimize_actions;
pub use stats::RecordingStats;
