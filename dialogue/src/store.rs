//! Durable copy of the definition document and the in-memory snapshot the engine reads.

use crate::definition::DialogueDefinition;
use arc_swap::ArcSwap;
use menubot_core::{BotError, DefinitionError, Result};
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Raw document text together with its parsed form.
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub text: String,
    pub definition: DialogueDefinition,
}

/// File-backed definition document.
///
/// The text is stored exactly as given: unedited content round-trips byte for byte.
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    path: PathBuf,
    welcome: String,
}

impl DefinitionStore {
    pub fn new(path: impl Into<PathBuf>, welcome: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            welcome: welcome.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    /// Current durable text.
    pub fn read_text(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Parses `text` with this store's welcome action without touching the file.
    pub fn validate(&self, text: &str) -> std::result::Result<DialogueDefinition, DefinitionError> {
        DialogueDefinition::parse(text, &self.welcome)
    }

    /// Reads and parses the document.
    pub fn load(&self) -> Result<LoadedDefinition> {
        let text = self.read_text()?;
        let definition = self.validate(&text)?;
        Ok(LoadedDefinition { text, definition })
    }

    /// Replaces the document with `text` via temp file + fsync + rename.
    pub fn persist(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(text.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            BotError::Config(format!(
                "definition path has no file name: {}",
                self.path.display()
            ))
        })?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        Ok(self.path.with_file_name(tmp_name))
    }
}

/// Shared, atomically swappable definition. Readers take an owned snapshot, so an execution
/// that already started keeps the definition it began with.
#[derive(Clone)]
pub struct DefinitionHandle {
    inner: Arc<ArcSwap<DialogueDefinition>>,
}

impl DefinitionHandle {
    pub fn new(initial: DialogueDefinition) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(initial)),
        }
    }

    pub fn snapshot(&self) -> Arc<DialogueDefinition> {
        self.inner.load_full()
    }

    pub fn replace(&self, definition: DialogueDefinition) {
        self.inner.store(Arc::new(definition));
    }
}
