//! Input injection: the backend capability and the device facade over it
//!
//! The backend is the only part that talks to the operating system. Everything
//! above it (recording, playback) is platform independent.

pub mod backend;
pub mod device;
pub mod types;

pub use backend::{BackendError, BackendResult, InputBackend};
pub use device::{InputDevice, SharedDevice};
pub use types::{MouseButton, Point, ScrollDirection};
