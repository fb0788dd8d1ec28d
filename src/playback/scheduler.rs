//! Playback scheduler
//!
//! Replays a recording through a shared input device in real time. A replay
//! locks the device for its whole run, so concurrent replays against the same
//! device queue up in arrival order instead of interleaving.
//!
//! Cancellation is cooperative: the token is checked while waiting for each
//! action, between curve steps, and before every backend call.

use crate::config::PlaybackConfig;
use crate::input::backend::InputBackend;
use crate::input::device::{InputDevice, SharedDevice};
use crate::input::types::Point;
use crate::playback::session::{LoopCount, PlaybackSession, ReplayOptions, ReplayOutcome, ReplayReport};
use crate::playback::timeline::{instant_after, Timeline};
use crate::processing::curve::{generate_curve_with_rng, steps_for_duration};
use crate::recorder::action::{Action, ActionPayload};
use crate::recorder::error::{RecordingError, RecordingResult};
use crate::recorder::recording::Recording;
use crate::storage::library::Macro;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Drives replays of recordings through a shared input device
pub struct Scheduler<B: InputBackend> {
    device: SharedDevice<B>,
    config: PlaybackConfig,
}

impl<B: InputBackend> Clone for Scheduler<B> {
    fn clone(&self) -> Self {
        Self {
            device: self.device.clone(),
            config: self.config.clone(),
        }
    }
}

/// A looped replay running on its own task.
///
/// Dropping the handle cancels the replay, so a detached infinite loop cannot
/// hold the device forever.
pub struct PlaybackHandle {
    cancel: CancellationToken,
    task: JoinHandle<RecordingResult<ReplayReport>>,
}

impl PlaybackHandle {
    /// Ask the replay to stop at its next suspension point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the replay to finish
    pub async fn join(mut self) -> RecordingResult<ReplayReport> {
        match (&mut self.task).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(RecordingError::TaskFailed(e.to_string())),
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Sleep until `deadline`. Returns true if cancelled first.
async fn wait_until(deadline: Instant, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => true,
        _ = tokio::time::sleep_until(deadline) => false,
    }
}

impl<B: InputBackend + 'static> Scheduler<B> {
    pub fn new(device: SharedDevice<B>, config: PlaybackConfig) -> RecordingResult<Self> {
        config.validate()?;
        Ok(Self { device, config })
    }

    /// Scheduler over a device that is not shared with anything else
    pub fn with_backend(backend: B, config: PlaybackConfig) -> RecordingResult<Self> {
        Self::new(InputDevice::shared(backend), config)
    }

    pub fn device(&self) -> &SharedDevice<B> {
        &self.device
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    fn rng(&self) -> SmallRng {
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    /// Replay a recording once
    pub async fn replay(
        &self,
        recording: &Recording,
        options: ReplayOptions,
        cancel: &CancellationToken,
    ) -> RecordingResult<ReplayReport> {
        let session = PlaybackSession::new(recording, options, LoopCount::ONCE, 0.0)?;
        self.run(&session, cancel).await
    }

    /// Replay a recording `loop_count` times with `loop_delay` seconds between
    /// iterations (none after the last). Infinite loops run until `cancel` fires.
    pub async fn replay_looped(
        &self,
        recording: &Recording,
        options: ReplayOptions,
        loop_count: LoopCount,
        loop_delay: f64,
        cancel: &CancellationToken,
    ) -> RecordingResult<ReplayReport> {
        let session = PlaybackSession::new(recording, options, loop_count, loop_delay)?;
        self.run(&session, cancel).await
    }

    /// Replay a named macro once
    pub async fn replay_macro(
        &self,
        macro_: &Macro,
        options: ReplayOptions,
        cancel: &CancellationToken,
    ) -> RecordingResult<ReplayReport> {
        tracing::info!("Executing macro {:?}", macro_.name());
        self.replay(macro_.recording(), options, cancel).await
    }

    /// Start a looped replay on a background task.
    ///
    /// Parameters are validated before the task is spawned.
    pub fn spawn_looped(
        &self,
        recording: Arc<Recording>,
        options: ReplayOptions,
        loop_count: LoopCount,
        loop_delay: f64,
    ) -> RecordingResult<PlaybackHandle> {
        PlaybackSession::new(&recording, options, loop_count, loop_delay)?;

        let cancel = CancellationToken::new();
        let scheduler = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            scheduler
                .replay_looped(&recording, options, loop_count, loop_delay, &token)
                .await
        });

        Ok(PlaybackHandle { cancel, task })
    }

    async fn run(
        &self,
        session: &PlaybackSession<'_>,
        cancel: &CancellationToken,
    ) -> RecordingResult<ReplayReport> {
        let started = Instant::now();
        let mut report = ReplayReport {
            session_id: session.id,
            outcome: ReplayOutcome::Completed,
            iterations: 0,
            actions_delivered: 0,
            elapsed: Duration::ZERO,
        };

        if session.recording.is_empty() {
            tracing::debug!("Replay {} has nothing to play", session.id);
            return Ok(report);
        }

        // Queue behind any replay already using the device
        let mut device = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.outcome = ReplayOutcome::Cancelled;
                report.elapsed = started.elapsed();
                return Ok(report);
            }
            guard = self.device.lock() => guard,
        };

        tracing::info!(
            "Replay {} started on {} backend ({} actions, {:.3}s, speed={}x, loops={}, bezier={})",
            session.id,
            device.backend().name(),
            session.recording.action_count(),
            session.recording.duration(),
            session.speed,
            session.loop_count,
            session.use_bezier
        );

        let mut rng = self.rng();
        let result = self
            .run_iterations(&mut device, session, cancel, &mut rng, &mut report)
            .await;

        if result.is_err() || report.outcome == ReplayOutcome::Cancelled {
            if let Err(e) = device.release_all().await {
                tracing::warn!("Replay {} could not release held input: {}", session.id, e);
            }
        }

        report.elapsed = started.elapsed();
        match result {
            Ok(()) => {
                tracing::info!(
                    "Replay {} {:?} after {} iteration(s), {} actions in {:.3}s",
                    session.id,
                    report.outcome,
                    report.iterations,
                    report.actions_delivered,
                    report.elapsed.as_secs_f64()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(
                    "Replay {} aborted in iteration {} after {} actions: {}",
                    session.id,
                    report.iterations,
                    report.actions_delivered,
                    e
                );
                Err(e)
            }
        }
    }

    async fn run_iterations(
        &self,
        device: &mut InputDevice<B>,
        session: &PlaybackSession<'_>,
        cancel: &CancellationToken,
        rng: &mut SmallRng,
        report: &mut ReplayReport,
    ) -> RecordingResult<()> {
        loop {
            if cancel.is_cancelled() {
                report.outcome = ReplayOutcome::Cancelled;
                return Ok(());
            }

            report.iterations += 1;
            tracing::debug!("Replay {} iteration {}", session.id, report.iterations);

            if self.play_once(device, session, cancel, rng, report).await? == ReplayOutcome::Cancelled {
                report.outcome = ReplayOutcome::Cancelled;
                return Ok(());
            }

            if !session.loop_count.has_more(report.iterations) {
                return Ok(());
            }

            if session.loop_delay > 0.0 {
                let deadline = instant_after(Instant::now(), session.loop_delay);
                if wait_until(deadline, cancel).await {
                    report.outcome = ReplayOutcome::Cancelled;
                    return Ok(());
                }
            } else {
                // Let the canceller run even when nothing in the loop suspends
                tokio::task::yield_now().await;
            }
        }
    }

    async fn play_once(
        &self,
        device: &mut InputDevice<B>,
        session: &PlaybackSession<'_>,
        cancel: &CancellationToken,
        rng: &mut SmallRng,
        report: &mut ReplayReport,
    ) -> RecordingResult<ReplayOutcome> {
        let mut timeline = Timeline::new(Instant::now(), session.speed, self.config.jitter_fraction);

        for action in session.recording.actions() {
            let deadline = timeline.next_deadline(action.timestamp(), rng);
            if wait_until(deadline, cancel).await {
                return Ok(ReplayOutcome::Cancelled);
            }

            tracing::debug!(
                "Replay {}: {} recorded at {:.3}s",
                session.id,
                action.kind(),
                action.timestamp()
            );

            if let ActionPayload::Pause(pause) = action.payload() {
                let seconds = pause.duration / session.speed;
                if wait_until(instant_after(deadline, seconds), cancel).await {
                    return Ok(ReplayOutcome::Cancelled);
                }
                timeline.shift(seconds);
            } else if self.deliver(device, action, session, cancel, rng).await? == ReplayOutcome::Cancelled {
                return Ok(ReplayOutcome::Cancelled);
            }

            report.actions_delivered += 1;
        }

        Ok(ReplayOutcome::Completed)
    }

    async fn deliver(
        &self,
        device: &mut InputDevice<B>,
        action: &Action,
        session: &PlaybackSession<'_>,
        cancel: &CancellationToken,
        rng: &mut SmallRng,
    ) -> RecordingResult<ReplayOutcome> {
        let speed = session.speed;
        let bezier = session.use_bezier;

        macro_rules! checked {
            ($call:expr) => {{
                if cancel.is_cancelled() {
                    return Ok(ReplayOutcome::Cancelled);
                }
                $call.await?;
            }};
        }

        match action.payload() {
            ActionPayload::MouseMove(data) => {
                let target = Point::new(data.x, data.y);
                return self
                    .move_cursor(device, target, data.duration / speed, bezier, cancel, rng)
                    .await;
            }
            ActionPayload::MouseClick(data) => {
                let target = Point::new(data.x, data.y);
                if device.cursor() != Some(target) {
                    checked!(device.move_to(target));
                }
                for _ in 0..data.clicks {
                    checked!(device.press_button(data.button));
                    checked!(device.release_button(data.button));
                }
            }
            ActionPayload::MouseDrag(data) => {
                if device.cursor() != Some(data.start()) {
                    checked!(device.move_to(data.start()));
                }
                checked!(device.press_button(data.button));
                let outcome = self
                    .move_cursor(device, data.end(), data.duration / speed, bezier, cancel, rng)
                    .await?;
                if outcome == ReplayOutcome::Cancelled {
                    return Ok(outcome);
                }
                checked!(device.release_button(data.button));
            }
            ActionPayload::KeyPress(data) => {
                checked!(device.press_key(&data.key));
                checked!(device.release_key(&data.key));
            }
            ActionPayload::KeyType(data) => {
                let interval = data.interval / speed;
                for (i, ch) in data.text.chars().enumerate() {
                    if i > 0
                        && interval > 0.0
                        && wait_until(instant_after(Instant::now(), interval), cancel).await
                    {
                        return Ok(ReplayOutcome::Cancelled);
                    }
                    let key = ch.to_string();
                    checked!(device.press_key(&key));
                    checked!(device.release_key(&key));
                }
            }
            ActionPayload::Hotkey(data) => {
                for key in &data.keys {
                    checked!(device.press_key(key));
                }
                for key in data.keys.iter().rev() {
                    checked!(device.release_key(key));
                }
            }
            ActionPayload::Scroll(data) => {
                if let Some(position) = data.position() {
                    if device.cursor() != Some(position) {
                        checked!(device.move_to(position));
                    }
                }
                checked!(device.scroll(data.direction, data.amount));
            }
            // Pauses are timed by the caller
            ActionPayload::Pause(_) => {}
        }

        Ok(ReplayOutcome::Completed)
    }

    /// Move to `target` over `duration` seconds, along a curve when enabled and
    /// the starting position is known; otherwise jump directly.
    async fn move_cursor(
        &self,
        device: &mut InputDevice<B>,
        target: Point,
        duration: f64,
        use_bezier: bool,
        cancel: &CancellationToken,
        rng: &mut SmallRng,
    ) -> RecordingResult<ReplayOutcome> {
        let path = match device.cursor() {
            Some(start) if use_bezier && start != target => {
                let steps = steps_for_duration(
                    duration,
                    self.config.min_step_interval(),
                    self.config.max_curve_steps,
                );
                generate_curve_with_rng(start, target, self.config.curve_intensity, steps, rng)
            }
            _ => vec![target],
        };

        let curved = use_bezier && path.len() > 1;
        let step = if curved { duration / path.len() as f64 } else { 0.0 };
        let begin = Instant::now();

        for (i, point) in path.into_iter().enumerate() {
            if step > 0.0 {
                let due = instant_after(begin, step * (i + 1) as f64);
                if wait_until(due, cancel).await {
                    return Ok(ReplayOutcome::Cancelled);
                }
            }
            if cancel.is_cancelled() {
                return Ok(ReplayOutcome::Cancelled);
            }
            device.move_to(point).await?;
        }

        Ok(ReplayOutcome::Completed)
    }
}
