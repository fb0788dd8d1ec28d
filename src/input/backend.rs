//! Input backend trait
//!
//! Defines the interface to the operating system's input injection layer.
//! Platform implementations are chosen once by the caller and injected into
//! an [`InputDevice`](super::InputDevice); the engine never inspects which one it got.

use crate::input::types::{MouseButton, ScrollDirection};
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an input backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct BackendError {
    /// The backend operation that failed (e.g., "move_cursor")
    pub operation: &'static str,
    /// Backend-specific description
    pub message: String,
}

impl BackendError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Trait for OS-level input injection
///
/// Each call maps to a single synthetic event. The engine guarantees at most one
/// call in flight per backend instance.
#[async_trait]
pub trait InputBackend: Send {
    /// Get a short backend name for logging (e.g., "quartz", "sendinput")
    fn name(&self) -> &str;

    /// Move the cursor to an absolute position
    async fn move_cursor(&mut self, x: i32, y: i32) -> BackendResult<()>;

    /// Press a mouse button at the current cursor position
    async fn press_button(&mut self, button: MouseButton) -> BackendResult<()>;

    /// Release a mouse button at the current cursor position
    async fn release_button(&mut self, button: MouseButton) -> BackendResult<()>;

    /// Press a key identified by name (e.g., "a", "ctrl", "enter")
    async fn press_key(&mut self, key: &str) -> BackendResult<()>;

    /// Release a key identified by name
    async fn release_key(&mut self, key: &str) -> BackendResult<()>;

    /// Scroll the wheel by `amount` notches in `direction`
    async fn scroll(&mut self, direction: ScrollDirection, amount: i32) -> BackendResult<()>;
}
