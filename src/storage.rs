//! Durable key-value storage backing the quote.
//!
//! Mirrors browser local storage: string keys, string values, one
//! namespace per origin. A [`StorageProvider`] hands out one such namespace
//! per shopper session.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> { (**self).get(key) }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> { (**self).set(key, value) }
    fn remove(&self, key: &str) -> Result<(), StorageError> { (**self).remove(key) }
}

/// In-memory storage. Clones share the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One file per key under `dir`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_token(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io { path: path.to_path_buf(), source }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;
        // Write-then-rename so a concurrent reader never sees a torn file.
        // The temp file is deleted on drop if any step fails.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err(&self.dir))?;
        tmp.write_all(value.as_bytes()).map_err(io_err(&path))?;
        tmp.as_file().sync_all().map_err(io_err(&path))?;
        tmp.persist(&path).map_err(|e| io_err(&path)(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= SessionId::MAX_LEN
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Opaque shopper session token, safe to use as a path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub const MAX_LEN: usize = 64;

    pub fn parse(value: impl Into<String>) -> Result<Self, StorageError> {
        let value = value.into();
        if !is_token(&value) {
            return Err(StorageError::InvalidKey(value));
        }
        Ok(Self(value))
    }

    pub fn generate() -> Self { Self(uuid::Uuid::now_v7().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for SessionId {
    type Error = StorageError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(value) }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self { id.0 }
}

/// Hands out the storage namespace of a session.
pub trait StorageProvider: Send + Sync {
    fn for_session(&self, session: &SessionId) -> Box<dyn Storage>;
}

#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    sessions: Mutex<HashMap<SessionId, MemoryStorage>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self { Self::default() }
}

impl StorageProvider for MemoryStorageProvider {
    fn for_session(&self, session: &SessionId) -> Box<dyn Storage> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Box::new(sessions.entry(session.clone()).or_default().clone())
    }
}

#[derive(Clone, Debug)]
pub struct FileStorageProvider {
    root: PathBuf,
}

impl FileStorageProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }
}

impl StorageProvider for FileStorageProvider {
    fn for_session(&self, session: &SessionId) -> Box<dyn Storage> {
        Box::new(FileStorage::new(self.root.join(session.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_shares_state_between_clones() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        b.remove("k").unwrap();
        assert_eq!(a.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("origin"));
        assert_eq!(storage.get("madeTimberQuote").unwrap(), None);
        storage.set("madeTimberQuote", "[]").unwrap();
        storage.set("madeTimberQuote", "[1]").unwrap();
        assert_eq!(storage.get("madeTimberQuote").unwrap().as_deref(), Some("[1]"));
        storage.remove("madeTimberQuote").unwrap();
        storage.remove("madeTimberQuote").unwrap();
        assert_eq!(storage.get("madeTimberQuote").unwrap(), None);
    }

    #[test]
    fn test_file_storage_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("madeTimberQuote", "[]").unwrap();
        // A directory squatting on the target path makes the final rename fail.
        fs::create_dir(dir.path().join("blocked.json")).unwrap();
        assert!(matches!(storage.set("blocked", "[]"), Err(StorageError::Io { .. })));

        let mut names: Vec<String> = fs::read_dir(dir.path()).unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, ["blocked.json", "madeTimberQuote.json"]);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(storage.set("../escape", "x"), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_session_id_validation() {
        assert!(SessionId::parse("abc-123_X").is_ok());
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse("a/b").is_err());
        assert!(SessionId::parse("x".repeat(65)).is_err());
        assert!(SessionId::parse(SessionId::generate().to_string()).is_ok());
    }

    #[test]
    fn test_providers_isolate_sessions() {
        let provider = MemoryStorageProvider::new();
        let s1 = SessionId::parse("one").unwrap();
        let s2 = SessionId::parse("two").unwrap();
        provider.for_session(&s1).set("k", "1").unwrap();
        assert_eq!(provider.for_session(&s1).get("k").unwrap().as_deref(), Some("1"));
        assert_eq!(provider.for_session(&s2).get("k").unwrap(), None);

        let dir = tempfile::tempdir().unwrap();
        let files = FileStorageProvider::new(dir.path());
        files.for_session(&s1).set("k", "1").unwrap();
        assert_eq!(files.for_session(&s2).get("k").unwrap(), None);
        assert!(dir.path().join("one").join("k.json").exists());
    }
}
