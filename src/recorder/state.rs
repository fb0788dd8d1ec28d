use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Recorder`](super::Recorder)
///
/// `Idle -> Recording -> Idle`. While idle the current recording is frozen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "idle"),
            RecorderState::Recording => write!(f, "recording"),
        }
    }
}
