use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::Result, RecordId};

/// The signed-in user. Built from the login response; a password the server
/// echoes back is never deserialised.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Session {
    pub id: RecordId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "Utc::now")]
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("user {}", self.id))
    }
}

/// One stored value that can be read, replaced or removed
pub trait StorageSlot {
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, contents: &str) -> Result<()>;
    fn remove(&mut self) -> Result<()>;
}

/// Survives restarts; used when the user asked to be remembered
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrite the file from scratch
    fn write(&mut self, contents: &str) -> Result<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Removing a missing file is not an error
    fn remove(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Lives as long as the process
#[derive(Default)]
pub struct MemorySlot {
    value: Option<String>,
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.value = Some(contents.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        self.value = None;
        Ok(())
    }
}

/// The only place that reads or writes the session. The persistent slot wins
/// over the ephemeral one, and a session lives in at most one of them.
pub struct SessionStore<P: StorageSlot, E: StorageSlot> {
    persistent: P,
    ephemeral: E,
}

impl<P: StorageSlot, E: StorageSlot> SessionStore<P, E> {
    pub fn new(persistent: P, ephemeral: E) -> Self {
        Self {
            persistent,
            ephemeral,
        }
    }

    /// The current session, if any. Unreadable or corrupt data counts as signed out.
    pub fn current(&self) -> Option<Session> {
        [&self.persistent as &dyn StorageSlot, &self.ephemeral]
            .into_iter()
            .find_map(|slot| match slot.read() {
                Ok(Some(contents)) => match serde_json::from_str::<Session>(&contents) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        warn!("Error parsing session data: {e}");
                        None
                    }
                },
                Ok(None) => None,
                Err(e) => {
                    warn!("Error reading session data: {e}");
                    None
                }
            })
    }

    pub fn save(&mut self, session: &Session, remember: bool) -> Result<()> {
        let contents = serde_json::to_string(session)?;
        if remember {
            self.ephemeral.remove()?;
            self.persistent.write(&contents)?;
        } else {
            self.persistent.remove()?;
            self.ephemeral.write(&contents)?;
        }
        debug!(id = %session.id, remember, "session saved");
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.persistent.remove()?;
        self.ephemeral.remove()?;
        debug!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn session(id: i64) -> Session {
        Session {
            id: RecordId::Number(id),
            username: Some("asha".to_string()),
            email: Some("asha@example.com".to_string()),
            signed_in_at: Utc::now(),
        }
    }

    #[test]
    fn test_session_from_login_response() {
        let parsed: Session = serde_json::from_str(
            r#"{"id": 4, "username": "asha", "email": "asha@example.com", "password": "secret"}"#,
        )
        .unwrap();
        assert_eq!(parsed.id, RecordId::Number(4));
        assert_eq!(parsed.display_name(), "asha");

        let stored = serde_json::to_string(&parsed).unwrap();
        assert!(!stored.contains("secret"));
    }

    #[test]
    fn test_remember_me_uses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = SessionStore::new(FileSlot::new(&path), MemorySlot::default());

        assert_eq!(store.current(), None);
        store.save(&session(1), true).unwrap();
        assert!(path.exists());
        assert_eq!(store.current().unwrap().id, RecordId::Number(1));

        // a new store over the same file picks the session up again
        let reopened = SessionStore::new(FileSlot::new(&path), MemorySlot::default());
        assert_eq!(reopened.current().unwrap().id, RecordId::Number(1));
    }

    #[test]
    fn test_saving_moves_session_between_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut store = SessionStore::new(FileSlot::new(&path), MemorySlot::default());

        store.save(&session(1), true).unwrap();
        store.save(&session(2), false).unwrap();
        assert!(!path.exists());
        assert_eq!(store.current().unwrap().id, RecordId::Number(2));

        store.save(&session(3), true).unwrap();
        assert_eq!(store.ephemeral.read().unwrap(), None);
        assert_eq!(store.current().unwrap().id, RecordId::Number(3));
    }

    #[test]
    fn test_persistent_slot_wins() {
        let mut persistent = MemorySlot::default();
        let mut ephemeral = MemorySlot::default();
        persistent
            .write(&serde_json::to_string(&session(10)).unwrap())
            .unwrap();
        ephemeral
            .write(&serde_json::to_string(&session(20)).unwrap())
            .unwrap();

        let store = SessionStore::new(persistent, ephemeral);
        assert_eq!(store.current().unwrap().id, RecordId::Number(10));
    }

    #[test]
    fn test_corrupt_data_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = SessionStore::new(FileSlot::new(&path), MemorySlot::default());
        assert_eq!(store.current(), None);

        store.clear().unwrap();
        assert!(!path.exists());
        // clearing twice is fine
        store.clear().unwrap();
    }
}
