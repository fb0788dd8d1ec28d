//! Mouse and keyboard facade over an input backend
//!
//! Tracks which keys and buttons are currently held and where the cursor was
//! last placed, so a session can be torn down without leaving stuck input.

use crate::input::backend::{BackendResult, InputBackend};
use crate::input::types::{MouseButton, Point, ScrollDirection};
use std::sync::Arc;
use tokio::sync::Mutex;

/// An input device shared between playback sessions.
///
/// Sessions lock it for the duration of a replay, which serializes access to the
/// physical pointer and keyboard state.
pub type SharedDevice<B> = Arc<Mutex<InputDevice<B>>>;

pub struct InputDevice<B: InputBackend> {
    backend: B,
    /// Keys currently held down, in press order
    pressed_keys: Vec<String>,
    /// Buttons currently held down, in press order
    pressed_buttons: Vec<MouseButton>,
    /// Last position this device moved the cursor to
    cursor: Option<Point>,
}

impl<B: InputBackend> InputDevice<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pressed_keys: Vec::new(),
            pressed_buttons: Vec::new(),
            cursor: None,
        }
    }

    /// Wrap the device for sharing between playback sessions
    pub fn shared(backend: B) -> SharedDevice<B> {
        Arc::new(Mutex::new(Self::new(backend)))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Last known cursor position, if this device has moved it
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn pressed_keys(&self) -> &[String] {
        &self.pressed_keys
    }

    pub fn pressed_buttons(&self) -> &[MouseButton] {
        &self.pressed_buttons
    }

    pub async fn move_to(&mut self, point: Point) -> BackendResult<()> {
        self.backend.move_cursor(point.x, point.y).await?;
        self.cursor = Some(point);
        Ok(())
    }

    pub async fn press_button(&mut self, button: MouseButton) -> BackendResult<()> {
        self.backend.press_button(button).await?;
        if !self.pressed_buttons.contains(&button) {
            self.pressed_buttons.push(button);
        }
        Ok(())
    }

    pub async fn release_button(&mut self, button: MouseButton) -> BackendResult<()> {
        self.backend.release_button(button).await?;
        self.pressed_buttons.retain(|b| *b != button);
        Ok(())
    }

    /// Press and release a button `clicks` times
    pub async fn click(&mut self, button: MouseButton, clicks: u32) -> BackendResult<()> {
        for _ in 0..clicks {
            self.press_button(button).await?;
            self.release_button(button).await?;
        }
        Ok(())
    }

    pub async fn press_key(&mut self, key: &str) -> BackendResult<()> {
        self.backend.press_key(key).await?;
        if !self.pressed_keys.iter().any(|k| k == key) {
            self.pressed_keys.push(key.to_string());
        }
        Ok(())
    }

    pub async fn release_key(&mut self, key: &str) -> BackendResult<()> {
        self.backend.release_key(key).await?;
        self.pressed_keys.retain(|k| k != key);
        Ok(())
    }

    /// Press and immediately release a key
    pub async fn tap_key(&mut self, key: &str) -> BackendResult<()> {
        self.press_key(key).await?;
        self.release_key(key).await
    }

    /// Press keys in order, then release them in reverse order
    pub async fn hotkey(&mut self, keys: &[String]) -> BackendResult<()> {
        for key in keys {
            self.press_key(key).await?;
        }
        for key in keys.iter().rev() {
            self.release_key(key).await?;
        }
        Ok(())
    }

    pub async fn scroll(&mut self, direction: ScrollDirection, amount: i32) -> BackendResult<()> {
        self.backend.scroll(direction, amount).await
    }

    /// Release every key and button still held, most recent first.
    ///
    /// Keeps going after a failure so one bad release does not leave the rest
    /// stuck; the first error is returned.
    pub async fn release_all(&mut self) -> BackendResult<()> {
        let mut first_error = None;

        while let Some(key) = self.pressed_keys.pop() {
            if let Err(e) = self.backend.release_key(&key).await {
                tracing::warn!("Failed to release key {}: {}", key, e);
                first_error.get_or_insert(e);
            }
        }

        while let Some(button) = self.pressed_buttons.pop() {
            if let Err(e) = self.backend.release_button(button).await {
                tracing::warn!("Failed to release {} button: {}", button, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
