use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Single-value persistence for the activation phrase.
pub trait PhraseStore {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, phrase: &str) -> Result<(), StoreError>;
}

impl<T: PhraseStore + ?Sized> PhraseStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&self, phrase: &str) -> Result<(), StoreError> {
        (**self).save(phrase)
    }
}

#[derive(Serialize, Deserialize)]
struct PhraseRecord {
    voice_phrase: String,
}

/// Keeps `{"voice_phrase": "..."}` in a JSON file.
pub struct JsonPhraseStore {
    path: PathBuf,
}

impl JsonPhraseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PhraseStore for JsonPhraseStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // A damaged file reads as "no phrase stored".
        let Ok(record) = serde_json::from_str::<PhraseRecord>(&raw) else {
            log::warn!("ignoring malformed phrase store {}", self.path.display());
            return Ok(None);
        };
        let phrase = record.voice_phrase.trim().to_lowercase();
        Ok((!phrase.is_empty()).then_some(phrase))
    }

    fn save(&self, phrase: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let record = PhraseRecord {
            voice_phrase: phrase.to_lowercase(),
        };
        fs::write(&self.path, serde_json::to_string(&record)?)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPhraseStore {
    phrase: Mutex<Option<String>>,
}

impl MemoryPhraseStore {
    pub fn new(phrase: Option<&str>) -> Self {
        Self {
            phrase: Mutex::new(phrase.map(str::to_lowercase)),
        }
    }
}

impl PhraseStore for MemoryPhraseStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .phrase
            .lock()
            .map(|phrase| phrase.clone())
            .unwrap_or_default())
    }

    fn save(&self, phrase: &str) -> Result<(), StoreError> {
        if let Ok(mut slot) = self.phrase.lock() {
            *slot = Some(phrase.to_lowercase());
        }
        Ok(())
    }
}
