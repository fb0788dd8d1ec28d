//! Test doubles shared by the unit test suites

use crate::input::backend::{BackendError, BackendResult, InputBackend};
use crate::input::types::{MouseButton, ScrollDirection};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Move(i32, i32),
    PressButton(MouseButton),
    ReleaseButton(MouseButton),
    PressKey(String),
    ReleaseKey(String),
    Scroll(ScrollDirection, i32),
}

/// Backend that records every call with the (tokio) instant it happened.
///
/// The call log is shared, so tests can keep a handle after the backend is
/// moved into a device.
#[derive(Clone, Default)]
pub struct MockBackend {
    log: Arc<parking_lot::Mutex<Vec<(Instant, BackendCall)>>>,
    fail_on: Option<&'static str>,
    fail_after: usize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call to `operation`
    pub fn fail_on(&mut self, operation: &'static str) {
        self.fail_on = Some(operation);
        self.fail_after = 0;
    }

    /// Succeed for the first `successes` calls to `operation`, then fail
    pub fn fail_on_after(&mut self, operation: &'static str, successes: usize) {
        self.fail_on = Some(operation);
        self.fail_after = successes;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.log.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, BackendCall)> {
        self.log.lock().clone()
    }

    fn record(&mut self, operation: &'static str, call: BackendCall) -> BackendResult<()> {
        if self.fail_on == Some(operation) {
            if self.fail_after == 0 {
                return Err(BackendError::new(operation, "injected failure"));
            }
            self.fail_after -= 1;
        }
        self.log.lock().push((Instant::now(), call));
        Ok(())
    }
}

#[async_trait]
impl InputBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn move_cursor(&mut self, x: i32, y: i32) -> BackendResult<()> {
        self.record("move_cursor", BackendCall::Move(x, y))
    }

    async fn press_button(&mut self, button: MouseButton) -> BackendResult<()> {
        self.record("press_button", BackendCall::PressButton(button))
    }

    async fn release_button(&mut self, button: MouseButton) -> BackendResult<()> {
        self.record("release_button", BackendCall::ReleaseButton(button))
    }

    async fn press_key(&mut self, key: &str) -> BackendResult<()> {
        self.record("press_key", BackendCall::PressKey(key.to_string()))
    }

    async fn release_key(&mut self, key: &str) -> BackendResult<()> {
        self.record("release_key", BackendCall::ReleaseKey(key.to_string()))
    }

    async fn scroll(&mut self, direction: ScrollDirection, amount: i32) -> BackendResult<()> {
        self.record("scroll", BackendCall::Scroll(direction, amount))
    }
}
