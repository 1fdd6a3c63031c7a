use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::core::chat::Chat;

/// Errors that can occur while reading persisted chat history.
#[derive(Debug)]
pub enum HistoryError {
    /// Failed to read the history file from disk.
    Read {
        /// Path to the history file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the history file as valid JSON.
    Parse {
        /// Path to the history file with invalid contents.
        path: PathBuf,
        /// The JSON deserialization error.
        source: serde_json::Error,
    },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::Read { path, source } => {
                write!(f, "Failed to read history at {}: {}", path.display(), source)
            }
            HistoryError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse history at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl StdError for HistoryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            HistoryError::Read { source, .. } => Some(source),
            HistoryError::Parse { source, .. } => Some(source),
        }
    }
}

/// Reads and writes the chat collection as one JSON file.
///
/// Every save serializes the entire collection and replaces the file through
/// a temp-file rename, so a failed write leaves the previous contents intact.
/// Neither operation propagates failures to callers: `save` logs and
/// discards them, `load` substitutes an empty collection. The stored schema
/// carries no version field.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            path: default_history_path(),
        }
    }

    /// Store rooted at an explicit file path instead of the platform data
    /// directory. Used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the full collection, swallowing any failure. Prior persisted
    /// state is untouched when the write fails.
    pub fn save(&self, chats: &[Chat]) {
        if let Err(err) = self.try_save(chats) {
            warn!(path = %self.path.display(), error = %err, "Failed to persist chat history");
        }
    }

    /// Loads the collection, substituting an empty one when the file is
    /// absent, unreadable, or malformed.
    pub fn load(&self) -> Vec<Chat> {
        match self.try_load() {
            Ok(chats) => chats,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Discarding unreadable chat history");
                Vec::new()
            }
        }
    }

    fn try_save(&self, chats: &[Chat]) -> Result<(), Box<dyn StdError>> {
        let parent = self.path.parent().filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = serde_json::to_string_pretty(chats)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file
            .persist(&self.path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    fn try_load(&self) -> Result<Vec<Chat>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| HistoryError::Read {
            path: self.path.clone(),
            source,
        })?;
        let chats: Vec<Chat> =
            serde_json::from_str(&contents).map_err(|source| HistoryError::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(chats)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn default_history_path() -> PathBuf {
    let proj_dirs =
        ProjectDirs::from("dev", "nlowe", "geminal").expect("Failed to determine data directory");
    proj_dirs.data_dir().join("history.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use tempfile::tempdir;

    fn sample_chats() -> Vec<Chat> {
        let mut first = Chat::new();
        first.title = "Quantum computing".to_string();
        first.messages.push(Message::user("Explain quantum computing"));
        first
            .messages
            .push(Message::assistant("It uses qubits instead of bits."));
        first.last_updated = Some(first.created_at + chrono::Duration::seconds(30));

        let second = Chat::new();
        vec![first, second]
    }

    #[test]
    fn save_then_load_round_trips_collection() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::with_path(dir.path().join("history.json"));
        let chats = sample_chats();

        store.save(&chats);
        let loaded = store.load();

        assert_eq!(loaded, chats);
    }

    #[test]
    fn load_of_absent_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::with_path(dir.path().join("history.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_of_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        let store = HistoryStore::with_path(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_of_wrong_shape_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{\"chats\": 3}").unwrap();

        let store = HistoryStore::with_path(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"not a directory").unwrap();

        // A file where a directory is needed makes every write fail.
        let store = HistoryStore::with_path(blocker.join("history.json"));
        store.save(&sample_chats());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("history.json");
        let store = HistoryStore::with_path(path);

        store.save(&sample_chats());
        assert_eq!(store.load().len(), 2);
    }
}
