//! This module provides local key-value stores, used to persist deadlines, themes and streaks

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::mock_behaviour::MockBehaviour;
use crate::traits::KeyValueStore;

const FILE_EXTENSION: &str = ".json";

/// A store that keeps every blob in its own file, in a given folder
#[derive(Clone, Debug, PartialEq)]
pub struct FileStore {
    backing_folder: PathBuf,
}

impl FileStore {
    /// Create a store backed by `folder`. The folder is created on the first write
    pub fn new(folder: &Path) -> Self {
        Self {
            backing_folder: PathBuf::from(folder),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.backing_folder
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, Box<dyn Error>> {
        let valid = key.is_empty() == false
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid == false {
            return Err(format!("Invalid key {:?}", key).into());
        }
        Ok(self.backing_folder.join(format!("{}{}", key, FILE_EXTENSION)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let path = self.blob_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Unable to read file {:?}: {}", path, err).into()),
        }
    }

    async fn set_blob(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let path = self.blob_path(key)?;
        std::fs::create_dir_all(&self.backing_folder)?;

        // Write next to the target, then rename, so that a crash never leaves a truncated blob
        let tmp_path = path.with_extension("json.tmp");
        if let Err(err) = std::fs::write(&tmp_path, value) {
            return Err(format!("Unable to save file {:?}: {}", tmp_path, err).into());
        }
        std::fs::rename(&tmp_path, &path)?;
        log::trace!("Saved {} bytes to {:?}", value.len(), path);
        Ok(())
    }

    async fn remove_blob(&self, key: &str) -> Result<(), Box<dyn Error>> {
        let path = self.blob_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(format!("Unable to remove file {:?}: {}", path, err).into()),
        }
    }
}



/// A store that only lives in memory. Its behaviour can be tweaked to simulate storage failures
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
    mock_behaviour: Mutex<MockBehaviour>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behaviour(behaviour: MockBehaviour) -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            mock_behaviour: Mutex::new(behaviour),
        }
    }

    /// Replace the current mock behaviour
    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.mock_behaviour.lock().unwrap() = behaviour;
    }

    /// Direct access to a blob, bypassing the mock behaviour
    pub fn raw_blob(&self, key: &str) -> Option<String> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    /// Direct write of a blob, bypassing the mock behaviour
    pub fn insert_raw_blob(&self, key: &str, value: &str) {
        self.blobs.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_get_blob()?;
        Ok(self.blobs.lock().unwrap().get(key).cloned())
    }

    async fn set_blob(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_set_blob()?;
        self.blobs.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_blob(&self, key: &str) -> Result<(), Box<dyn Error>> {
        self.mock_behaviour.lock().unwrap().can_set_blob()?;
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }
}
