//! Named macros and the directory that stores them

use crate::recorder::error::{RecordingError, RecordingResult};
use crate::recorder::recording::Recording;
use crate::storage::format;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MACRO_EXTENSION: &str = "json";

/// A named recording intended for repeated, independent execution
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    name: String,
    recording: Arc<Recording>,
}

fn validate_name(name: &str) -> RecordingResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.'));
    if !valid {
        return Err(RecordingError::invalid_parameter(format!(
            "invalid macro name {:?}",
            name
        )));
    }
    Ok(())
}

impl Macro {
    pub fn new(name: impl Into<String>, recording: Recording) -> RecordingResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            recording: Arc::new(recording),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recording(&self) -> &Arc<Recording> {
        &self.recording
    }

    pub fn save(&self, path: impl AsRef<Path>) -> RecordingResult<()> {
        format::write_recording(path.as_ref(), &self.recording, Some(&self.name))
    }

    /// Load a macro file. Files without a stored name are named after the file stem.
    pub fn load(path: impl AsRef<Path>) -> RecordingResult<Self> {
        let path = path.as_ref();
        let loaded = format::read_recording(path)?;
        let name = match loaded.name {
            Some(name) => name,
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default(),
        };
        Self::new(name, loaded.recording)
    }
}

/// A directory of macro files with an in-memory cache of loaded macros
pub struct MacroLibrary {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<Macro>>>,
}

impl MacroLibrary {
    /// Open (and create if needed) a macro directory
    pub fn open(root: impl Into<PathBuf>) -> RecordingResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        tracing::info!("Macro library opened at {}", root.display());
        Ok(Self {
            root,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, MACRO_EXTENSION))
    }

    /// Persist a recording under `name`, replacing any macro with that name
    pub fn save(&self, name: &str, recording: Recording) -> RecordingResult<Arc<Macro>> {
        let macro_ = Arc::new(Macro::new(name, recording)?);
        macro_.save(self.path_for(name))?;
        self.cache.write().insert(name.to_string(), macro_.clone());
        Ok(macro_)
    }

    /// Load a macro by name, from cache when possible
    pub fn load(&self, name: &str) -> RecordingResult<Arc<Macro>> {
        validate_name(name)?;
        if let Some(cached) = self.cache.read().get(name) {
            return Ok(cached.clone());
        }

        let path = self.path_for(name);
        if !path.is_file() {
            return Err(RecordingError::MacroNotFound(name.to_string()));
        }

        let loaded = format::read_recording(&path)?;
        if let Some(stored) = loaded.name.as_deref() {
            if stored != name {
                tracing::warn!(
                    "Macro file {} is named {:?}; using file name {:?}",
                    path.display(),
                    stored,
                    name
                );
            }
        }

        let macro_ = Arc::new(Macro::new(name, loaded.recording)?);
        self.cache.write().insert(name.to_string(), macro_.clone());
        Ok(macro_)
    }

    /// Names of all stored macros, sorted
    pub fn list(&self) -> RecordingResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(MACRO_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn contains(&self, name: &str) -> bool {
        validate_name(name).is_ok() && self.path_for(name).is_file()
    }

    pub fn remove(&self, name: &str) -> RecordingResult<()> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(RecordingError::MacroNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        self.cache.write().remove(name);

        tracing::info!("Removed macro {:?}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::action::{Action, ActionPayload, KeyPressData};
    use chrono::Utc;

    fn recording(keys: &[&str]) -> Recording {
        let actions = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                Action::new(
                    i as f64 * 0.1,
                    ActionPayload::KeyPress(KeyPressData { key: k.to_string() }),
                )
            })
            .collect();
        Recording::from_actions(Utc::now(), actions).unwrap()
    }

    #[test]
    fn test_save_load_list_remove() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::open(dir.path().join("macros")).unwrap();

        library.save("login", recording(&["a", "b"])).unwrap();
        library.save("logout", recording(&["c"])).unwrap();
        assert_eq!(library.list().unwrap(), vec!["login", "logout"]);

        // Fresh library reads from disk rather than cache
        let reopened = MacroLibrary::open(library.root()).unwrap();
        let login = reopened.load("login").unwrap();
        assert_eq!(login.name(), "login");
        assert_eq!(login.recording().action_count(), 2);

        reopened.remove("login").unwrap();
        assert!(!reopened.contains("login"));
        assert!(matches!(
            reopened.load("login"),
            Err(RecordingError::MacroNotFound(_))
        ));
    }

    #[test]
    fn test_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::open(dir.path()).unwrap();
        library.save("m", recording(&["a"])).unwrap();

        let first = library.load("m").unwrap();
        let second = library.load("m").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let library = MacroLibrary::open(dir.path()).unwrap();

        for bad in ["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(
                    library.save(bad, recording(&["a"])),
                    Err(RecordingError::InvalidParameter(_))
                ),
                "name {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_macro_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.json");
        let original = Macro::new("copy paste", recording(&["ctrl", "v"])).unwrap();

        original.save(&path).unwrap();
        let loaded = Macro::load(&path).unwrap();
        assert_eq!(loaded.name(), "copy paste");
        assert_eq!(loaded.recording().actions(), original.recording().actions());
    }
}
