//! Playback module for replaying recordings
//!
//! The scheduler turns recorded offsets into real-time deadlines (scaled by
//! speed, with optional jitter) and delivers each action through a shared
//! input device.

pub mod scheduler;
pub mod session;
pub mod timeline;

pub use scheduler::{PlaybackHandle, Scheduler};
pub use session::{LoopCount, PlaybackSession, ReplayOptions, ReplayOutcome, ReplayReport};
pub use timeline::Timeline;
