//! Playlist library and queue-position queries
//!
//! Playlists are kept in creation order. Next/prev adjacency is resolved
//! against the active queue (the playlist the current track was launched
//! from) when it still contains the track, falling back to the first
//! playlist in creation order containing the track's id.

use chrono::Utc;

use super::types::{Playlist, Track};

#[derive(Clone, Debug, Default)]
pub struct Library {
    playlists: Vec<Playlist>,
    default_playlist_id: Option<String>,
    active_queue_id: Option<String>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state (user record or local cache).
    pub fn from_parts(playlists: Vec<Playlist>, default_playlist_id: Option<String>) -> Self {
        // A dangling default id must not survive a reload
        let default_playlist_id = default_playlist_id
            .filter(|id| playlists.iter().any(|p| &p.id == id));
        Self {
            playlists,
            default_playlist_id,
            active_queue_id: None,
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn default_playlist_id(&self) -> Option<&str> {
        self.default_playlist_id.as_deref()
    }

    pub fn active_queue_id(&self) -> Option<&str> {
        self.active_queue_id.as_deref()
    }

    /// Record which playlist the current track was launched from.
    /// `None` for tracks launched from discover or search results.
    pub fn set_active_queue(&mut self, playlist_id: Option<String>) {
        self.active_queue_id = playlist_id;
    }

    /// Create a playlist with a timestamp-derived id and return the id.
    pub fn create_playlist(&mut self, name: impl Into<String>, tracks: Vec<Track>) -> String {
        let id = Utc::now().to_rfc3339();
        self.playlists.push(Playlist {
            id: id.clone(),
            name: name.into(),
            tracks,
        });
        id
    }

    /// Append a track, rejecting duplicates by application id.
    /// Returns false when the playlist does not exist or already holds the
    /// track.
    pub fn add_track(&mut self, playlist_id: &str, track: Track) -> bool {
        let Some(playlist) = self.playlists.iter_mut().find(|p| p.id == playlist_id) else {
            return false;
        };
        if playlist.tracks.iter().any(|t| t.id == track.id) {
            return false;
        }
        playlist.tracks.push(track);
        true
    }

    pub fn rename_playlist(&mut self, playlist_id: &str, new_name: impl Into<String>) -> bool {
        match self.playlists.iter_mut().find(|p| p.id == playlist_id) {
            Some(playlist) => {
                playlist.name = new_name.into();
                true
            }
            None => false,
        }
    }

    /// Delete a playlist. The default playlist id is unset when it pointed
    /// at the deleted playlist, and an active queue on it is cleared.
    pub fn delete_playlist(&mut self, playlist_id: &str) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.id != playlist_id);
        if self.playlists.len() == before {
            return false;
        }
        if self.default_playlist_id.as_deref() == Some(playlist_id) {
            self.default_playlist_id = None;
        }
        if self.active_queue_id.as_deref() == Some(playlist_id) {
            self.active_queue_id = None;
        }
        true
    }

    /// Set the quick-add target. Must reference an existing playlist.
    pub fn set_default_playlist(&mut self, playlist_id: &str) -> bool {
        if self.get(playlist_id).is_some() {
            self.default_playlist_id = Some(playlist_id.to_string());
            true
        } else {
            false
        }
    }

    /// The playlist that acts as the queue for the given track.
    fn queue_for(&self, track_id: &str) -> Option<&Playlist> {
        if let Some(active) = self
            .active_queue_id
            .as_deref()
            .and_then(|id| self.get(id))
        {
            if active.tracks.iter().any(|t| t.id == track_id) {
                return Some(active);
            }
        }
        self.playlists
            .iter()
            .find(|p| p.tracks.iter().any(|t| t.id == track_id))
    }

    fn adjacent(&self, track_id: &str, offset: isize) -> Option<&Track> {
        let queue = self.queue_for(track_id)?;
        let pos = queue.tracks.iter().position(|t| t.id == track_id)?;
        let target = pos.checked_add_signed(offset)?;
        queue.tracks.get(target)
    }

    pub fn next_after(&self, track_id: &str) -> Option<Track> {
        self.adjacent(track_id, 1).cloned()
    }

    pub fn prev_before(&self, track_id: &str) -> Option<Track> {
        self.adjacent(track_id, -1).cloned()
    }

    pub fn has_next(&self, track_id: &str) -> bool {
        self.adjacent(track_id, 1).is_some()
    }

    pub fn has_prev(&self, track_id: &str) -> bool {
        self.adjacent(track_id, -1).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: u32) -> Track {
        Track {
            id: format!("t{}", n),
            title: format!("Track {}", n),
            artist: "Artist".to_string(),
            thumbnail: String::new(),
            media_id: format!("m{}", n),
        }
    }

    #[test]
    fn create_assigns_timestamp_id() {
        let mut library = Library::new();
        let id = library.create_playlist("Mix", vec![]);
        assert!(library.get(&id).is_some());
        // RFC 3339 ids parse back as timestamps
        assert!(chrono::DateTime::parse_from_rfc3339(&id).is_ok());
    }

    #[test]
    fn duplicate_append_is_rejected() {
        let mut library = Library::new();
        let id = library.create_playlist("Mix", vec![track(1)]);
        assert!(library.add_track(&id, track(2)));
        assert!(!library.add_track(&id, track(1)));
        assert_eq!(library.get(&id).unwrap().tracks.len(), 2);
    }

    #[test]
    fn add_to_missing_playlist_fails() {
        let mut library = Library::new();
        assert!(!library.add_track("nope", track(1)));
    }

    #[test]
    fn delete_unsets_default() {
        let mut library = Library::new();
        let id = library.create_playlist("Mix", vec![]);
        assert!(library.set_default_playlist(&id));
        assert!(library.delete_playlist(&id));
        assert_eq!(library.default_playlist_id(), None);
    }

    #[test]
    fn default_must_reference_existing_playlist() {
        let mut library = Library::new();
        assert!(!library.set_default_playlist("nope"));
        let loaded = Library::from_parts(vec![], Some("dangling".to_string()));
        assert_eq!(loaded.default_playlist_id(), None);
    }

    #[test]
    fn adjacency_walks_playlist_order() {
        let mut library = Library::new();
        library.create_playlist("Mix", vec![track(1), track(2), track(3)]);

        assert_eq!(library.next_after("t1").unwrap().id, "t2");
        assert_eq!(library.prev_before("t3").unwrap().id, "t2");
        assert!(!library.has_prev("t1"));
        assert!(!library.has_next("t3"));
        assert!(library.next_after("t3").is_none());
        assert!(library.next_after("missing").is_none());
    }

    #[test]
    fn active_queue_wins_over_creation_order() {
        let mut library = Library::new();
        // t2 appears in both playlists with different neighbours
        library.create_playlist("First", vec![track(1), track(2)]);
        let second = library.create_playlist("Second", vec![track(2), track(3)]);

        // Without an active queue the first playlist in creation order wins
        assert!(library.next_after("t2").is_none());

        library.set_active_queue(Some(second.clone()));
        assert_eq!(library.next_after("t2").unwrap().id, "t3");

        // An active queue that no longer contains the track falls back
        library.set_active_queue(Some(second));
        assert_eq!(library.next_after("t1").unwrap().id, "t2");
    }

    #[test]
    fn deleting_active_queue_clears_it() {
        let mut library = Library::new();
        let id = library.create_playlist("Mix", vec![track(1)]);
        library.set_active_queue(Some(id.clone()));
        library.delete_playlist(&id);
        assert_eq!(library.active_queue_id(), None);
    }
}
