//! Recorded input actions
//!
//! An action is a closed tagged variant: the [`ActionKind`] tag plus a typed
//! payload. Playback dispatches on the tag.

use crate::input::types::{MouseButton, Point, ScrollDirection};
use crate::recorder::error::{RecordingError, RecordingResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MouseMove,
    MouseClick,
    MouseDrag,
    KeyPress,
    KeyType,
    Hotkey,
    Pause,
    Scroll,
}

impl ActionKind {
    pub const ALL: [ActionKind; 8] = [
        ActionKind::MouseMove,
        ActionKind::MouseClick,
        ActionKind::MouseDrag,
        ActionKind::KeyPress,
        ActionKind::KeyType,
        ActionKind::Hotkey,
        ActionKind::Pause,
        ActionKind::Scroll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::MouseMove => "mouse_move",
            ActionKind::MouseClick => "mouse_click",
            ActionKind::MouseDrag => "mouse_drag",
            ActionKind::KeyPress => "key_press",
            ActionKind::KeyType => "key_type",
            ActionKind::Hotkey => "hotkey",
            ActionKind::Pause => "pause",
            ActionKind::Scroll => "scroll",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseMoveData {
    pub x: i32,
    pub y: i32,
    /// Seconds the motion should take when replayed along a curve
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseClickData {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default = "one")]
    pub clicks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseDragData {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub duration: f64,
}

impl MouseDragData {
    pub fn start(&self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPressData {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTypeData {
    pub text: String,
    /// Seconds between characters
    #[serde(default)]
    pub interval: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotkeyData {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseData {
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollData {
    pub direction: ScrollDirection,
    pub amount: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl ScrollData {
    /// Position to scroll at, when both coordinates were captured
    pub fn position(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Typed payload of an action, keyed by kind
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    MouseMove(MouseMoveData),
    MouseClick(MouseClickData),
    MouseDrag(MouseDragData),
    KeyPress(KeyPressData),
    KeyType(KeyTypeData),
    Hotkey(HotkeyData),
    Pause(PauseData),
    Scroll(ScrollData),
}

fn check_seconds(field: &str, value: f64) -> RecordingResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RecordingError::invalid_parameter(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, value
        )));
    }
    Ok(())
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::MouseMove(_) => ActionKind::MouseMove,
            ActionPayload::MouseClick(_) => ActionKind::MouseClick,
            ActionPayload::MouseDrag(_) => ActionKind::MouseDrag,
            ActionPayload::KeyPress(_) => ActionKind::KeyPress,
            ActionPayload::KeyType(_) => ActionKind::KeyType,
            ActionPayload::Hotkey(_) => ActionKind::Hotkey,
            ActionPayload::Pause(_) => ActionKind::Pause,
            ActionPayload::Scroll(_) => ActionKind::Scroll,
        }
    }

    /// Check field-level constraints that the type system cannot express
    pub fn validate(&self) -> RecordingResult<()> {
        match self {
            ActionPayload::MouseMove(data) => check_seconds("duration", data.duration),
            ActionPayload::MouseClick(data) => {
                if data.clicks == 0 {
                    return Err(RecordingError::invalid_parameter("clicks must be at least 1"));
                }
                Ok(())
            }
            ActionPayload::MouseDrag(data) => check_seconds("duration", data.duration),
            ActionPayload::KeyPress(data) => {
                if data.key.is_empty() {
                    return Err(RecordingError::invalid_parameter("key must not be empty"));
                }
                Ok(())
            }
            ActionPayload::KeyType(data) => check_seconds("interval", data.interval),
            ActionPayload::Hotkey(data) => {
                if data.keys.is_empty() || data.keys.iter().any(String::is_empty) {
                    return Err(RecordingError::invalid_parameter(
                        "hotkey needs at least one non-empty key",
                    ));
                }
                Ok(())
            }
            ActionPayload::Pause(data) => check_seconds("duration", data.duration),
            ActionPayload::Scroll(_) => Ok(()),
        }
    }

    /// Cursor positions this action visits, in order
    pub fn points(&self) -> Vec<Point> {
        match self {
            ActionPayload::MouseMove(data) => vec![Point::new(data.x, data.y)],
            ActionPayload::MouseClick(data) => vec![Point::new(data.x, data.y)],
            ActionPayload::MouseDrag(data) => vec![data.start(), data.end()],
            _ => Vec::new(),
        }
    }
}

/// One recorded input event
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Seconds since the start of the recording
    timestamp: f64,
    payload: ActionPayload,
}

impl Action {
    pub fn new(timestamp: f64, payload: ActionPayload) -> Self {
        Self { timestamp, payload }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &ActionPayload {
        &self.payload
    }
}
