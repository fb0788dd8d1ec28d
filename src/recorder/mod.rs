//! Recording store: actions, recordings and the recorder state machine

pub mod action;
pub mod error;
pub mod recording;
pub mod state;
pub mod store;

pub use action::{
    Action, ActionKind, ActionPayload, HotkeyData, KeyPressData, KeyTypeData, MouseClickData,
    MouseDragData, MouseMoveData, PauseData, ScrollData,
};
pub use error::{RecordingError, RecordingResult};
pub use recording::Recording;
pub use state::RecorderState;
pub use store::Recorder;
