use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::{env, fs};
use thiserror::Error;

/// Token + username pair a successful signup or login leaves behind.
///
/// The username is mirrored next to the token so identity is recoverable
/// without parsing the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable home for the current session's credentials.
///
/// Written on every successful signup or login, read back by
/// `User::restore_session`. No expiry or rotation: a stored token stays
/// around until the server stops accepting it or `clear` is called.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, SessionError>;
    fn save(&self, credentials: &Credentials) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Credentials kept as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location under the user's config directory,
    /// or `None` when neither `XDG_CONFIG_HOME` nor `HOME` is set.
    pub fn discover() -> Option<Self> {
        session_file_path().map(Self::new)
    }

    /// Location of the session document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Credentials>, SessionError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents = fs::read(&self.path)?;
        match serde_json::from_slice(&contents) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(err) => {
                // A record we cannot parse reads as signed-out.
                tracing::warn!("ignoring corrupt session file {}: {}", self.path.display(), err);
                Ok(None)
            }
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Credentials>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Credentials>, SessionError> {
        Ok(self.slot().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), SessionError> {
        *self.slot() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

fn session_file_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("snooze-client");
        p.push("session.json");
        return Some(p);
    }
    if let Ok(home) = env::var("HOME") {
        let mut p = PathBuf::from(home);
        p.push(".config");
        p.push("snooze-client");
        p.push("session.json");
        return Some(p);
    }
    None
}
