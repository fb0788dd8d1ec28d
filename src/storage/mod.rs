//! Persistence: the recording file format and the macro library

pub mod format;
pub mod library;

pub use format::{LoadedRecording, FORMAT_VERSION};
pub use library::{Macro, MacroLibrary};
