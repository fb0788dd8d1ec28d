//! Virtual Input - record and replay mouse and keyboard macros.
//!
//! This is the main library crate. It records timestamped input actions,
//! optimizes and persists them, and replays them through a pluggable input
//! backend with speed control, looping, curved cursor motion and timing jitter.

pub mod config;
pub mod input;
pub mod playback;
pub mod processing;
pub mod recorder;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::PlaybackConfig;
pub use input::{InputBackend, InputDevice, MouseButton, Point, ScrollDirection, SharedDevice};
pub use playback::{LoopCount, PlaybackHandle, ReplayOptions, ReplayOutcome, ReplayReport, Scheduler};
pub use processing::RecordingStats;
pub use recorder::{Action, ActionKind, ActionPayload, Recorder, Recording, RecordingError, RecordingResult};
pub use storage::{Macro, MacroLibrary};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the default tracing subscriber.
///
/// Honors `RUST_LOG` and falls back to debug output for this crate. Does
/// nothing if the host application already installed a subscriber.
pub fn init_tracing() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "virtual_input=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Starting Virtual Input v{}", env!("CARGO_PKG_VERSION"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BackendCall, MockBackend};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn test_record_save_load_replay() -> anyhow::Result<()> {
        let mut recorder = Recorder::new();
        recorder.start_recording()?;
        recorder.record_mouse_move(10, 10, 0.0)?;
        recorder.record_mouse_move(20, 20, 0.0)?;
        tokio::time::advance(Duration::from_millis(500)).await;
        recorder.record_hotkey(&["ctrl", "c"])?;
        recorder.record_pause(0.25)?;
        recorder.record_pause(0.25)?;
        recorder.stop_recording()?;

        let optimized = recorder.optimize()?;
        assert_eq!(optimized.action_count(), 3);

        let dir = tempfile::tempdir()?;
        let library = MacroLibrary::open(dir.path())?;
        library.save("copy", optimized)?;
        let loaded = library.load("copy")?;
        assert_eq!(loaded.recording().action_count(), 3);

        let backend = MockBackend::new();
        let scheduler = Scheduler::with_backend(backend.clone(), PlaybackConfig::deterministic())?;
        let report = scheduler
            .replay_macro(&loaded, ReplayOptions::default(), &CancellationToken::new())
            .await?;

        assert_eq!(report.outcome, ReplayOutcome::Completed);
        assert_eq!(report.actions_delivered, 3);
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Move(20, 20),
                BackendCall::PressKey("ctrl".into()),
                BackendCall::PressKey("c".into()),
                BackendCall::ReleaseKey("c".into()),
                BackendCall::ReleaseKey("ctrl".into()),
            ]
        );
        // Hotkey at 0.5s, then the merged half-second pause
        assert!((report.elapsed.as_secs_f64() - 1.0).abs() < 0.005);
        Ok(())
    }
}
