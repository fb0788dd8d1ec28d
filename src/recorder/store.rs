//! The recording store
//!
//! A [`Recorder`] owns one [`Recording`] and enforces the recording state
//! machine: actions can only be appended while recording, and the log can only
//! be saved, optimized or replayed once it is frozen.

use crate::input::types::{MouseButton, Point, ScrollDirection};
use crate::processing::stats::RecordingStats;
use crate::recorder::action::{
    Action, ActionPayload, HotkeyData, KeyPressData, KeyTypeData, MouseClickData, MouseDragData,
    MouseMoveData, PauseData, ScrollData,
};
use crate::recorder::error::{RecordingError, RecordingResult};
use crate::recorder::recording::Recording;
use crate::recorder::state::RecorderState;
use crate::storage::format;
use std::path::Path;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct Recorder {
    state: RecorderState,
    recording: Recording,
    /// Monotonic instant the current session started at
    origin: Option<Instant>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Begin a new session, discarding any previous actions
    pub fn start_recording(&mut self) -> RecordingResult<()> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }

        self.recording = Recording::new();
        self.origin = Some(Instant::now());
        self.state = RecorderState::Recording;

        tracing::info!("Recording started at {}", self.recording.created_at());
        Ok(())
    }

    /// End the session and freeze the recording
    pub fn stop_recording(&mut self) -> RecordingResult<()> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }

        self.state = RecorderState::Idle;
        self.origin = None;

        tracing::info!(
            "Recording stopped (actions={}, duration={:.3}s)",
            self.recording.action_count(),
            self.recording.duration()
        );
        Ok(())
    }

    fn require_idle(&self) -> RecordingResult<()> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }
        Ok(())
    }

    /// Seconds since the session started, never earlier than the last action
    fn now_offset(&self) -> RecordingResult<f64> {
        let origin = self.origin.ok_or(RecordingError::NotRecording)?;
        let elapsed = origin.elapsed().as_secs_f64();
        let last = self
            .recording
            .actions()
            .last()
            .map(Action::timestamp)
            .unwrap_or(0.0);
        Ok(elapsed.max(last))
    }

    fn record_now(&mut self, payload: ActionPayload) -> RecordingResult<()> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }
        let timestamp = self.now_offset()?;
        tracing::debug!("Recorded {} at {:.3}s", payload.kind(), timestamp);
        self.recording.push(Action::new(timestamp, payload))
    }

    /// Append an action captured elsewhere at an explicit offset (seconds since start).
    ///
    /// Used to feed live OS capture into the store. The offset must not be earlier
    /// than the last recorded action.
    pub fn record_action_at(&mut self, offset: f64, payload: ActionPayload) -> RecordingResult<()> {
        if !self.is_recording() {
            return Err(RecordingError::NotRecording);
        }
        self.recording.push(Action::new(offset, payload))
    }

    pub fn record_mouse_move(&mut self, x: i32, y: i32, duration: f64) -> RecordingResult<()> {
        self.record_now(ActionPayload::MouseMove(MouseMoveData { x, y, duration }))
    }

    pub fn record_click(
        &mut self,
        x: i32,
        y: i32,
        button: MouseButton,
        clicks: u32,
    ) -> RecordingResult<()> {
        self.record_now(ActionPayload::MouseClick(MouseClickData {
            x,
            y,
            button,
            clicks,
        }))
    }

    pub fn record_drag(
        &mut self,
        start: Point,
        end: Point,
        button: MouseButton,
        duration: f64,
    ) -> RecordingResult<()> {
        self.record_now(ActionPayload::MouseDrag(MouseDragData {
            start_x: start.x,
            start_y: start.y,
            end_x: end.x,
            end_y: end.y,
            button,
            duration,
        }))
    }

    pub fn record_key_press(&mut self, key: &str) -> RecordingResult<()> {
        self.record_now(ActionPayload::KeyPress(KeyPressData {
            key: key.to_string(),
        }))
    }

    pub fn record_key_type(&mut self, text: &str, interval: f64) -> RecordingResult<()> {
        self.record_now(ActionPayload::KeyType(KeyTypeData {
            text: text.to_string(),
            interval,
        }))
    }

    pub fn record_hotkey<S: AsRef<str>>(&mut self, keys: &[S]) -> RecordingResult<()> {
        self.record_now(ActionPayload::Hotkey(HotkeyData {
            keys: keys.iter().map(|k| k.as_ref().to_string()).collect(),
        }))
    }

    pub fn record_pause(&mut self, duration: f64) -> RecordingResult<()> {
        self.record_now(ActionPayload::Pause(PauseData { duration }))
    }

    pub fn record_scroll(
        &mut self,
        direction: ScrollDirection,
        amount: i32,
        at: Option<Point>,
    ) -> RecordingResult<()> {
        self.record_now(ActionPayload::Scroll(ScrollData {
            direction,
            amount,
            x: at.map(|p| p.x),
            y: at.map(|p| p.y),
        }))
    }

    pub fn action_count(&self) -> usize {
        self.recording.action_count()
    }

    pub fn duration(&self) -> f64 {
        self.recording.duration()
    }

    /// Borrow the frozen recording
    pub fn recording(&self) -> RecordingResult<&Recording> {
        self.require_idle()?;
        Ok(&self.recording)
    }

    /// Clone the frozen recording for sharing with playback sessions
    pub fn snapshot(&self) -> RecordingResult<Arc<Recording>> {
        self.require_idle()?;
        Ok(Arc::new(self.recording.clone()))
    }

    pub fn optimize(&self) -> RecordingResult<Recording> {
        self.require_idle()?;
        let optimized = self.recording.optimize();
        tracing::info!(
            "Optimized recording: {} -> {} actions",
            self.recording.action_count(),
            optimized.action_count()
        );
        Ok(optimized)
    }

    pub fn stats(&self) -> RecordingResult<RecordingStats> {
        self.require_idle()?;
        Ok(self.recording.stats())
    }

    /// Drop all recorded actions
    pub fn clear(&mut self) -> RecordingResult<()> {
        self.require_idle()?;
        self.recording = Recording::new();
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> RecordingResult<()> {
        self.require_idle()?;
        format::write_recording(path.as_ref(), &self.recording, None)
    }

    /// Replace the store's contents with a recording read from disk.
    ///
    /// The store is left unchanged if the file cannot be read or parsed.
    pub fn load(&mut self, path: impl AsRef<Path>) -> RecordingResult<()> {
        self.require_idle()?;
        let loaded = format::read_recording(path.as_ref())?;
        self.recording = loaded.recording;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::action::ActionKind;
    use std::time::Duration;

    #[test]
    fn test_start_twice_fails() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();
        assert!(matches!(
            recorder.start_recording(),
            Err(RecordingError::AlreadyRecording)
        ));
    }

    #[test]
    fn test_stop_without_start_fails() {
        let mut recorder = Recorder::new();
        assert!(matches!(
            recorder.stop_recording(),
            Err(RecordingError::NotRecording)
        ));
    }

    #[test]
    fn test_record_requires_active_session() {
        let mut recorder = Recorder::new();
        assert!(matches!(
            recorder.record_key_press("a"),
            Err(RecordingError::NotRecording)
        ));

        recorder.start_recording().unwrap();
        recorder.record_key_press("a").unwrap();
        recorder.stop_recording().unwrap();

        // Frozen after stop
        assert!(matches!(
            recorder.record_key_press("b"),
            Err(RecordingError::NotRecording)
        ));
        assert_eq!(recorder.action_count(), 1);
    }

    #[test]
    fn test_frozen_operations_rejected_while_recording() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();

        assert!(matches!(recorder.stats(), Err(RecordingError::AlreadyRecording)));
        assert!(matches!(recorder.optimize(), Err(RecordingError::AlreadyRecording)));
        assert!(matches!(recorder.snapshot(), Err(RecordingError::AlreadyRecording)));
        assert!(matches!(recorder.clear(), Err(RecordingError::AlreadyRecording)));
    }

    #[test]
    fn test_start_resets_previous_actions() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();
        recorder.record_key_press("a").unwrap();
        recorder.stop_recording().unwrap();

        recorder.start_recording().unwrap();
        assert_eq!(recorder.action_count(), 0);
    }

    #[test]
    fn test_invalid_parameters_do_not_append() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();

        let empty: [&str; 0] = [];
        assert!(matches!(
            recorder.record_hotkey(&empty),
            Err(RecordingError::InvalidParameter(_))
        ));
        assert!(matches!(
            recorder.record_pause(-0.5),
            Err(RecordingError::InvalidParameter(_))
        ));
        assert_eq!(recorder.action_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timestamps_follow_elapsed_time() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();
        recorder.record_click(100, 200, MouseButton::Left, 1).unwrap();

        tokio::time::advance(Duration::from_millis(1200)).await;
        recorder.record_key_type("hi", 0.0).unwrap();
        recorder.stop_recording().unwrap();

        assert_eq!(recorder.action_count(), 2);
        assert!((recorder.duration() - 1.2).abs() < 1e-9);

        let recording = recorder.recording().unwrap();
        assert_eq!(recording.actions()[0].timestamp(), 0.0);
        assert_eq!(recording.actions()[1].kind(), ActionKind::KeyType);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_offset_keeps_order() {
        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();

        recorder
            .record_action_at(
                5.0,
                ActionPayload::KeyPress(KeyPressData { key: "x".into() }),
            )
            .unwrap();
        // Wall clock is behind the external event; the next action is clamped to it
        recorder.record_key_press("y").unwrap();
        assert!(recorder
            .record_action_at(
                1.0,
                ActionPayload::KeyPress(KeyPressData { key: "z".into() }),
            )
            .is_err());
        recorder.stop_recording().unwrap();

        let actions = recorder.recording().unwrap().actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].timestamp(), 5.0);
    }

    #[test]
    fn test_load_failure_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let bad_path = dir.path().join("bad.json");
        std::fs::write(&bad_path, "{ not json").unwrap();

        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();
        recorder.record_key_press("a").unwrap();
        recorder.stop_recording().unwrap();

        let result = recorder.load(&bad_path);
        assert!(matches!(
            result,
            Err(RecordingError::InvalidRecordingFormat(_))
        ));
        assert_eq!(recorder.action_count(), 1);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macro.json");

        let mut recorder = Recorder::new();
        recorder.start_recording().unwrap();
        recorder.record_click(100, 200, MouseButton::Left, 1).unwrap();
        recorder.record_hotkey(&["ctrl", "c"]).unwrap();
        recorder.stop_recording().unwrap();
        recorder.save(&path).unwrap();

        let mut other = Recorder::new();
        other.load(&path).unwrap();
        assert_eq!(
            other.recording().unwrap().actions(),
            recorder.recording().unwrap().actions()
        );
        assert_eq!(other.duration(), recorder.duration());
    }
}
