//! Local persistent storage under `.cache/`
//!
//! Holds what the browser build kept in local storage: the signed-in user
//! with their session token, the playlists snapshot for offline startup,
//! and the theme.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::types::{Playlist, Theme, User};

const CACHE_DIR: &str = ".cache";
const SESSION_FILE: &str = "session.json";
const LIBRARY_FILE: &str = "library.json";
const THEME_FILE: &str = "theme.json";

/// Signed-in user plus the opaque session token issued at login
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: User,
    pub token: String,
}

/// Playlists snapshot persisted between runs
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoredLibrary {
    pub playlists: Vec<Playlist>,
    pub default_playlist_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new() -> Self {
        Self { dir: PathBuf::from(CACHE_DIR) }
    }

    /// Cache rooted somewhere other than the working directory (tests).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let content = serde_json::to_string(value)?;
        fs::write(self.path(file), content)?;
        Ok(())
    }

    fn read_json<T: for<'de> Deserialize<'de>>(&self, file: &str) -> Result<Option<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn load_session(&self) -> Result<Option<StoredSession>> {
        self.read_json(SESSION_FILE)
    }

    pub fn save_session(&self, session: &StoredSession) -> Result<()> {
        self.write_json(SESSION_FILE, session)
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.path(SESSION_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn load_library(&self) -> Result<Option<StoredLibrary>> {
        self.read_json(LIBRARY_FILE)
    }

    pub fn save_library(&self, library: &StoredLibrary) -> Result<()> {
        self.write_json(LIBRARY_FILE, library)
    }

    pub fn load_theme(&self) -> Result<Option<Theme>> {
        self.read_json(THEME_FILE)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        self.write_json(THEME_FILE, &theme)
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Track;

    fn cache() -> (tempfile::TempDir, LocalCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::with_dir(dir.path());
        (dir, cache)
    }

    #[test]
    fn missing_files_read_as_none() {
        let (_dir, cache) = cache();
        assert!(cache.load_session().unwrap().is_none());
        assert!(cache.load_library().unwrap().is_none());
        assert!(cache.load_theme().unwrap().is_none());
    }

    #[test]
    fn library_roundtrips() {
        let (_dir, cache) = cache();
        let stored = StoredLibrary {
            playlists: vec![Playlist {
                id: "p1".to_string(),
                name: "Mix".to_string(),
                tracks: vec![Track {
                    id: "t1".to_string(),
                    title: "Song".to_string(),
                    artist: "Artist".to_string(),
                    thumbnail: String::new(),
                    media_id: "m1".to_string(),
                }],
            }],
            default_playlist_id: Some("p1".to_string()),
        };
        cache.save_library(&stored).unwrap();
        let loaded = cache.load_library().unwrap().unwrap();
        assert_eq!(loaded.playlists.len(), 1);
        assert_eq!(loaded.default_playlist_id.as_deref(), Some("p1"));
    }

    #[test]
    fn clear_session_removes_file() {
        let (_dir, cache) = cache();
        let session = StoredSession {
            user: User::new("a@b.c"),
            token: "tok".to_string(),
        };
        cache.save_session(&session).unwrap();
        assert!(cache.load_session().unwrap().is_some());
        cache.clear_session().unwrap();
        assert!(cache.load_session().unwrap().is_none());
    }
}
