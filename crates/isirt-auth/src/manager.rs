use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::profile::{SessionFile, StoredSession};

const SESSION_STORE_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    store_path: PathBuf,
}

impl SessionStore {
    pub fn from_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            store_path: config_dir.join(SESSION_STORE_FILE),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn load(&self) -> Result<SessionFile> {
        if !self.store_path.exists() {
            return Ok(SessionFile::default());
        }

        let content = fs::read_to_string(&self.store_path)
            .with_context(|| format!("failed to read {}", self.store_path.display()))?;

        match serde_json::from_str::<SessionFile>(&content) {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::warn!("ignoring unreadable session store: {e}");
                Ok(SessionFile::default())
            }
        }
    }

    pub fn save(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let payload = serde_json::to_string_pretty(file).context("serialize session store")?;
        fs::write(&self.store_path, payload)
            .with_context(|| format!("failed to write {}", self.store_path.display()))?;

        Ok(())
    }

    pub fn session_for(&self, origin: &str) -> Result<Option<StoredSession>> {
        let file = self.load()?;
        Ok(file.sessions.get(origin).cloned())
    }

    pub fn save_session(&self, origin: impl Into<String>, session: StoredSession) -> Result<()> {
        let origin = origin.into();
        let mut file = self.load()?;
        file.sessions.insert(origin.clone(), session);
        file.active_origin = Some(origin);
        self.save(&file)
    }

    /// Drops the stored cookie for `origin`. Returns whether one existed.
    pub fn clear_session(&self, origin: &str) -> Result<bool> {
        let mut file = self.load()?;
        let removed = file.sessions.remove(origin).is_some();
        if file.active_origin.as_deref() == Some(origin) {
            file.active_origin = None;
        }
        if removed {
            self.save(&file)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::profile::StoredSession;

    use super::SessionStore;

    fn sample() -> StoredSession {
        StoredSession {
            cookie: "access_token=abc".to_string(),
            username: Some("a@b.com".to_string()),
            saved_at: 1,
        }
    }

    #[test]
    fn save_session_creates_directory_and_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = SessionStore::from_config_dir(temp.path().join("nested").join("config"));

        store
            .save_session("http://localhost:8000", sample())
            .expect("save session");

        assert!(store.store_path().exists());
        let loaded = store.session_for("http://localhost:8000").unwrap();
        assert_eq!(loaded, Some(sample()));
    }

    #[test]
    fn invalid_json_returns_default_store() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = SessionStore::from_config_dir(temp.path());

        std::fs::write(store.store_path(), "{ this is invalid json ").expect("write invalid json");

        let file = store.load().expect("load should not fail");
        assert!(file.active_origin.is_none());
        assert!(file.sessions.is_empty());
    }

    #[test]
    fn clear_session_only_touches_matching_origin() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let store = SessionStore::from_config_dir(temp.path());
        store.save_session("http://a", sample()).unwrap();
        store.save_session("http://b", sample()).unwrap();

        assert!(store.clear_session("http://b").unwrap());
        assert!(!store.clear_session("http://b").unwrap());

        let file = store.load().unwrap();
        assert!(file.sessions.contains_key("http://a"));
        assert!(file.active_origin.is_none());
    }
}
