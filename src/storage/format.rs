//! Versioned JSON file format for recordings
//!
//! ```text
//! {
//!   "version": "1.0",
//!   "total_duration": 1.2,
//!   "action_count": 2,
//!   "created_at": 1700000000.25,
//!   "actions": [
//!     { "action_type": "mouse_click", "timestamp": 0.0, "data": { "x": 100, "y": 200, ... } },
//!     ...
//!   ]
//! }
//! ```
//!
//! Loading is all-or-nothing: any schema or payload problem rejects the whole file.
//!
//! Action timestamps and durations round-trip bit-exactly. `created_at` is stored
//! as fractional epoch seconds, which at present-day epochs resolves to a few
//! hundred nanoseconds, so it is only preserved to well within a millisecond.

use crate::recorder::action::{Action, ActionKind, ActionPayload};
use crate::recorder::error::{RecordingError, RecordingResult};
use crate::recorder::recording::Recording;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Format version written to and required from every file
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Serialize, Deserialize)]
struct RecordingFile {
    version: String,
    total_duration: f64,
    action_count: usize,
    /// Unix epoch seconds
    created_at: f64,
    /// Only present for named macros
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    actions: Vec<ActionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActionRecord {
    action_type: ActionKind,
    timestamp: f64,
    data: Value,
}

/// A recording read back from disk, with its macro name if it had one
#[derive(Debug, Clone)]
pub struct LoadedRecording {
    pub name: Option<String>,
    pub recording: Recording,
}

/// Lossy below roughly 0.25µs at present-day epochs (f64 mantissa)
fn to_epoch_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

fn from_epoch_seconds(seconds: f64) -> RecordingResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(RecordingError::invalid_format(format!(
            "created_at is not a valid timestamp: {}",
            seconds
        )));
    }
    let secs = seconds.floor();
    let nanos = (((seconds - secs) * 1e9).round() as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(secs as i64, nanos).ok_or_else(|| {
        RecordingError::invalid_format(format!("created_at is out of range: {}", seconds))
    })
}

fn encode_payload(payload: &ActionPayload) -> serde_json::Result<Value> {
    match payload {
        ActionPayload::MouseMove(data) => serde_json::to_value(data),
        ActionPayload::MouseClick(data) => serde_json::to_value(data),
        ActionPayload::MouseDrag(data) => serde_json::to_value(data),
        ActionPayload::KeyPress(data) => serde_json::to_value(data),
        ActionPayload::KeyType(data) => serde_json::to_value(data),
        ActionPayload::Hotkey(data) => serde_json::to_value(data),
        ActionPayload::Pause(data) => serde_json::to_value(data),
        ActionPayload::Scroll(data) => serde_json::to_value(data),
    }
}

fn decode_payload(kind: ActionKind, data: Value) -> serde_json::Result<ActionPayload> {
    match kind {
        ActionKind::MouseMove => serde_json::from_value(data).map(ActionPayload::MouseMove),
        ActionKind::MouseClick => serde_json::from_value(data).map(ActionPayload::MouseClick),
        ActionKind::MouseDrag => serde_json::from_value(data).map(ActionPayload::MouseDrag),
        ActionKind::KeyPress => serde_json::from_value(data).map(ActionPayload::KeyPress),
        ActionKind::KeyType => serde_json::from_value(data).map(ActionPayload::KeyType),
        ActionKind::Hotkey => serde_json::from_value(data).map(ActionPayload::Hotkey),
        ActionKind::Pause => serde_json::from_value(data).map(ActionPayload::Pause),
        ActionKind::Scroll => serde_json::from_value(data).map(ActionPayload::Scroll),
    }
}

/// Serialize a recording (and optional macro name) to pretty-printed JSON
pub fn encode(recording: &Recording, name: Option<&str>) -> RecordingResult<Vec<u8>> {
    let actions = recording
        .actions()
        .iter()
        .map(|action| {
            Ok(ActionRecord {
                action_type: action.kind(),
                timestamp: action.timestamp(),
                data: encode_payload(action.payload())?,
            })
        })
        .collect::<serde_json::Result<Vec<_>>>()
        .map_err(|e| RecordingError::invalid_format(e.to_string()))?;

    let file = RecordingFile {
        version: FORMAT_VERSION.to_string(),
        total_duration: recording.duration(),
        action_count: recording.action_count(),
        created_at: to_epoch_seconds(recording.created_at()),
        name: name.map(str::to_string),
        actions,
    };

    serde_json::to_vec_pretty(&file).map_err(|e| RecordingError::invalid_format(e.to_string()))
}

/// Parse a recording from JSON bytes
pub fn decode(bytes: &[u8]) -> RecordingResult<LoadedRecording> {
    let file: RecordingFile =
        serde_json::from_slice(bytes).map_err(|e| RecordingError::invalid_format(e.to_string()))?;

    if file.version != FORMAT_VERSION {
        return Err(RecordingError::invalid_format(format!(
            "unsupported version {:?} (expected {:?})",
            file.version, FORMAT_VERSION
        )));
    }

    if file.action_count != file.actions.len() {
        return Err(RecordingError::invalid_format(format!(
            "action_count is {} but {} actions are present",
            file.action_count,
            file.actions.len()
        )));
    }

    let created_at = from_epoch_seconds(file.created_at)?;

    let mut actions = Vec::with_capacity(file.actions.len());
    for (index, record) in file.actions.into_iter().enumerate() {
        let payload = decode_payload(record.action_type, record.data).map_err(|e| {
            RecordingError::invalid_format(format!(
                "action {} ({}): {}",
                index, record.action_type, e
            ))
        })?;
        actions.push(Action::new(record.timestamp, payload));
    }

    let recording = Recording::from_actions(created_at, actions).map_err(|e| match e {
        RecordingError::InvalidParameter(message) => RecordingError::InvalidRecordingFormat(message),
        other => other,
    })?;

    if (recording.duration() - file.total_duration).abs() > 1e-6 {
        tracing::warn!(
            "Stored total_duration {} does not match actions ({}); using the latter",
            file.total_duration,
            recording.duration()
        );
    }

    Ok(LoadedRecording {
        name: file.name,
        recording,
    })
}

/// Write a recording to `path`, replacing any existing file atomically
pub fn write_recording(path: &Path, recording: &Recording, name: Option<&str>) -> RecordingResult<()> {
    let data = encode(recording, name)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(
        "Saved {} actions to {}",
        recording.action_count(),
        path.display()
    );
    Ok(())
}

pub fn read_recording(path: &Path) -> RecordingResult<LoadedRecording> {
    let data = std::fs::read(path)?;
    let loaded = decode(&data)?;

    tracing::info!(
        "Loaded {} actions from {}",
        loaded.recording.action_count(),
        path.display()
    );
    Ok(loaded)
}
