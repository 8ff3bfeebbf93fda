//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::cache::{LocalCache, StoredLibrary};
use super::content::ContentState;
use super::library::Library;
use super::media_api::MediaApi;
use super::playback::{NowPlaying, PlaybackState};
use super::recommender::Recommender;
use super::store::UserStore;
use super::types::{
    ActiveSection, Dialog, Notice, NoticeLevel, Playlist, Theme, Track, UiState, User, View,
};

const LISTENING_HISTORY_LIMIT: usize = 20;
const NOTICE_TTL_SECS: u64 = 5;

/// The external collaborators, cloneable handles
#[derive(Clone)]
pub struct Services {
    pub store: UserStore,
    pub media: MediaApi,
    pub recommender: Recommender,
}

/// Main application model containing all state
pub struct AppModel {
    pub services: Option<Services>,
    cache: LocalCache,
    user: Arc<Mutex<Option<User>>>,
    library: Arc<Mutex<Library>>,
    current_track: Arc<Mutex<Option<Track>>>,
    playback: Arc<Mutex<PlaybackState>>,
    theme: Arc<Mutex<Theme>>,
    listening_history: Arc<Mutex<Vec<String>>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(cache: LocalCache) -> Self {
        Self {
            services: None,
            cache,
            user: Arc::new(Mutex::new(None)),
            library: Arc::new(Mutex::new(Library::new())),
            current_track: Arc::new(Mutex::new(None)),
            playback: Arc::new(Mutex::new(PlaybackState::default())),
            theme: Arc::new(Mutex::new(Theme::default())),
            listening_history: Arc::new(Mutex::new(Vec::new())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_services(&mut self, services: Services) {
        self.services = Some(services);
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    // ========================================================================
    // User
    // ========================================================================

    pub async fn set_user(&self, user: Option<User>) {
        *self.user.lock().await = user;
    }

    pub async fn get_user(&self) -> Option<User> {
        self.user.lock().await.clone()
    }

    pub async fn update_user<F>(&self, mutate: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let mut guard = self.user.lock().await;
        if let Some(user) = guard.as_mut() {
            mutate(user);
            return Some(user.clone());
        }
        None
    }

    // ========================================================================
    // Library / playlists
    // ========================================================================

    pub async fn load_library(&self, playlists: Vec<Playlist>, default_playlist_id: Option<String>) {
        *self.library.lock().await = Library::from_parts(playlists, default_playlist_id);
    }

    pub async fn playlists(&self) -> Vec<Playlist> {
        self.library.lock().await.playlists().to_vec()
    }

    pub async fn get_playlist(&self, id: &str) -> Option<Playlist> {
        self.library.lock().await.get(id).cloned()
    }

    pub async fn create_playlist(&self, name: &str, tracks: Vec<Track>) -> String {
        let id = self.library.lock().await.create_playlist(name, tracks);
        tracing::info!(playlist_id = %id, name, "Playlist created");
        id
    }

    pub async fn add_track_to_playlist(&self, playlist_id: &str, track: Track) -> bool {
        self.library.lock().await.add_track(playlist_id, track)
    }

    pub async fn rename_playlist(&self, playlist_id: &str, new_name: &str) -> bool {
        self.library.lock().await.rename_playlist(playlist_id, new_name)
    }

    pub async fn delete_playlist(&self, playlist_id: &str) -> bool {
        self.library.lock().await.delete_playlist(playlist_id)
    }

    pub async fn set_default_playlist(&self, playlist_id: &str) -> bool {
        self.library.lock().await.set_default_playlist(playlist_id)
    }

    pub async fn default_playlist_id(&self) -> Option<String> {
        self.library.lock().await.default_playlist_id().map(str::to_string)
    }

    pub async fn set_active_queue(&self, playlist_id: Option<String>) {
        self.library.lock().await.set_active_queue(playlist_id);
    }

    /// Snapshot used for persistence (local cache and the user record).
    pub async fn library_snapshot(&self) -> StoredLibrary {
        let library = self.library.lock().await;
        StoredLibrary {
            playlists: library.playlists().to_vec(),
            default_playlist_id: library.default_playlist_id().map(str::to_string),
        }
    }

    // ========================================================================
    // Playback state
    // ========================================================================

    /// Swap the current track. Resets progress/duration and records the
    /// optimistic playing intent; the next widget event is authoritative.
    pub async fn set_current_track(&self, track: Option<Track>) {
        let playing = track.is_some();
        if let Some(track) = &track {
            let mut history = self.listening_history.lock().await;
            history.push(format!("{} - {}", track.artist, track.title));
            let len = history.len();
            if len > LISTENING_HISTORY_LIMIT {
                history.drain(..len - LISTENING_HISTORY_LIMIT);
            }
        }
        *self.current_track.lock().await = track;
        self.playback.lock().await.reset_for_track(playing);
    }

    pub async fn current_track(&self) -> Option<Track> {
        self.current_track.lock().await.clone()
    }

    pub async fn current_media_id(&self) -> Option<String> {
        self.current_track.lock().await.as_ref().map(|t| t.media_id.clone())
    }

    pub async fn set_playing(&self, is_playing: bool) {
        self.playback.lock().await.is_playing = is_playing;
    }

    pub async fn playback_state(&self) -> PlaybackState {
        *self.playback.lock().await
    }

    pub async fn apply_time_sample(&self, position: f64, duration: f64) {
        self.playback.lock().await.apply_sample(position, duration);
    }

    pub async fn set_progress_optimistic(&self, position: f64) {
        self.playback.lock().await.set_progress(position);
    }

    /// Snapshot for rendering the player bar and the full player view.
    pub async fn now_playing(&self, widget_available: bool) -> NowPlaying {
        let track = self.current_track.lock().await.clone();
        let state = *self.playback.lock().await;
        let library = self.library.lock().await;
        let (can_next, can_prev) = match &track {
            Some(t) => (
                library.has_next(&t.id),
                // Restart is always available past the threshold
                state.progress > 3.0 || library.has_prev(&t.id),
            ),
            None => (false, false),
        };
        NowPlaying {
            track,
            state,
            widget_available,
            can_next,
            can_prev,
        }
    }

    pub async fn next_track(&self) -> Option<Track> {
        let current = self.current_track.lock().await.clone()?;
        self.library.lock().await.next_after(&current.id)
    }

    pub async fn prev_track(&self) -> Option<Track> {
        let current = self.current_track.lock().await.clone()?;
        self.library.lock().await.prev_before(&current.id)
    }

    // ========================================================================
    // Listening history & theme
    // ========================================================================

    pub async fn listening_history_text(&self) -> String {
        self.listening_history.lock().await.join(", ")
    }

    pub async fn theme(&self) -> Theme {
        *self.theme.lock().await
    }

    pub async fn set_theme(&self, theme: Theme) {
        *self.theme.lock().await = theme;
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut guard = self.theme.lock().await;
        *guard = guard.toggled();
        *guard
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn current_view(&self) -> View {
        self.ui_state.lock().await.view.clone()
    }

    pub async fn set_view(&self, view: View) {
        let mut state = self.ui_state.lock().await;
        if state.view != view {
            state.content_selected = 0;
        }
        state.view = view;
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn cycle_section_forward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn cycle_section_backward(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.prev();
    }

    pub async fn set_notice(&self, message: String, level: NoticeLevel) {
        let mut state = self.ui_state.lock().await;
        state.notice = Some(Notice {
            message,
            level,
            timestamp: Instant::now(),
        });
    }

    pub async fn clear_notice(&self) {
        self.ui_state.lock().await.notice = None;
    }

    pub async fn has_notice(&self) -> bool {
        self.ui_state.lock().await.notice.is_some()
    }

    pub async fn auto_clear_old_notices(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(notice) = &state.notice {
            if notice.timestamp.elapsed().as_secs() > NOTICE_TTL_SECS {
                state.notice = None;
            }
        }
    }

    pub async fn open_dialog(&self, dialog: Dialog) {
        self.ui_state.lock().await.dialog = Some(dialog);
    }

    pub async fn close_dialog(&self) {
        self.ui_state.lock().await.dialog = None;
    }

    pub async fn current_dialog(&self) -> Option<Dialog> {
        self.ui_state.lock().await.dialog.clone()
    }

    pub async fn show_help(&self) {
        self.ui_state.lock().await.show_help = true;
    }

    pub async fn hide_help(&self) {
        self.ui_state.lock().await.show_help = false;
    }

    pub async fn is_help_open(&self) -> bool {
        self.ui_state.lock().await.show_help
    }

    // ========================================================================
    // Selection movement
    // ========================================================================

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Navigation => {
                if state.nav_selected > 0 {
                    state.nav_selected -= 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected > 0 {
                    state.playlist_selected -= 1;
                }
            }
            ActiveSection::MainContent => {
                if state.view == View::Settings {
                    if state.settings_selected > 0 {
                        state.settings_selected -= 1;
                    }
                } else if state.content_selected > 0 {
                    state.content_selected -= 1;
                }
            }
            ActiveSection::Search => {}
        }
    }

    pub async fn move_selection_down(&self) {
        let content_len = self.content_len().await;
        let playlist_count = self.library.lock().await.playlists().len();
        let mut state = self.ui_state.lock().await;
        match state.active_section {
            ActiveSection::Navigation => {
                if state.nav_selected < state.nav_items.len().saturating_sub(1) {
                    state.nav_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if state.playlist_selected < playlist_count.saturating_sub(1) {
                    state.playlist_selected += 1;
                }
            }
            ActiveSection::MainContent => {
                if state.view == View::Settings {
                    // Country, favorite artists, default playlist, theme,
                    // sign out
                    if state.settings_selected < 4 {
                        state.settings_selected += 1;
                    }
                } else if state.content_selected < content_len.saturating_sub(1) {
                    state.content_selected += 1;
                }
            }
            ActiveSection::Search => {}
        }
    }

    async fn content_len(&self) -> usize {
        let view = self.ui_state.lock().await.view.clone();
        let content = self.content_state.lock().await;
        match view {
            View::Discover => content.trending.len(),
            View::Search => content.search_results.len(),
            View::Recommendations => content.mood_playlist.len(),
            View::Admin => content.users.len(),
            View::Playlist { id } => {
                drop(content);
                self.library
                    .lock()
                    .await
                    .get(&id)
                    .map(|p| p.tracks.len())
                    .unwrap_or(0)
            }
            View::Settings | View::Player => 0,
        }
    }

    /// The track under the cursor in the current content view, plus the
    /// playlist it came from when the view is a playlist.
    pub async fn selected_track(&self) -> Option<(Track, Option<String>)> {
        let state = self.ui_state.lock().await;
        let index = state.content_selected;
        let view = state.view.clone();
        drop(state);

        let content = self.content_state.lock().await;
        match view {
            View::Discover => content.trending.get(index).cloned().map(|t| (t, None)),
            View::Search => content.search_results.get(index).cloned().map(|t| (t, None)),
            View::Playlist { id } => {
                drop(content);
                let library = self.library.lock().await;
                library
                    .get(&id)
                    .and_then(|p| p.tracks.get(index).cloned())
                    .map(|t| (t, Some(id)))
            }
            _ => None,
        }
    }

    pub async fn selected_playlist(&self) -> Option<Playlist> {
        let index = self.ui_state.lock().await.playlist_selected;
        self.library.lock().await.playlists().get(index).cloned()
    }

    // ========================================================================
    // Search query editing
    // ========================================================================

    pub async fn append_to_search(&self, c: char) {
        self.ui_state.lock().await.search_query.push(c);
    }

    pub async fn backspace_search(&self) {
        self.ui_state.lock().await.search_query.pop();
    }

    pub async fn clear_search(&self) {
        self.ui_state.lock().await.search_query.clear();
    }

    // ========================================================================
    // Content state
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn set_content_loading(&self, loading: bool) {
        self.content_state.lock().await.is_loading = loading;
    }

    pub async fn set_trending(&self, tracks: Vec<Track>) {
        let mut content = self.content_state.lock().await;
        content.trending = tracks;
        content.is_loading = false;
    }

    pub async fn set_search_results(&self, tracks: Vec<Track>) {
        {
            let mut content = self.content_state.lock().await;
            content.search_results = tracks;
            content.is_loading = false;
        }
        self.ui_state.lock().await.content_selected = 0;
    }

    pub async fn set_genre_recommendations(&self, text: String) {
        let mut content = self.content_state.lock().await;
        content.genre_recommendations = Some(text);
        content.is_loading = false;
    }

    pub async fn set_mood_playlist(&self, mood: String, songs: Vec<String>) {
        let mut content = self.content_state.lock().await;
        content.mood = Some(mood);
        content.mood_playlist = songs;
        content.is_loading = false;
    }

    pub async fn set_users(&self, users: Vec<User>) {
        let mut content = self.content_state.lock().await;
        content.users = users;
        content.is_loading = false;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}
