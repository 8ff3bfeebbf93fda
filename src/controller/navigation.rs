//! Navigation and data-fetching controller methods
//!
//! View transitions own the widget-surface relocation: the full player view
//! is a rendering target, not an owner of the player instance.

use crate::model::{region_code_for, Track, View, APOLOGY};
use crate::player::Mount;

use super::AppController;

impl AppController {
    /// Switch the main view. The widget surface follows: onto the stage for
    /// the full player, back to the hidden container for everything else.
    pub async fn switch_view(&self, view: View) {
        match view {
            View::Player => self.adapter.relocate(Mount::Stage).await,
            _ => self.adapter.relocate(Mount::Background).await,
        }

        {
            let model = self.model.lock().await;
            model.set_view(view.clone()).await;
        }

        // Lazily load what the view needs
        match view {
            View::Discover => {
                let empty = {
                    let model = self.model.lock().await;
                    model.get_content_state().await.trending.is_empty()
                };
                if empty {
                    self.refresh_discover().await;
                }
            }
            View::Recommendations => {
                let missing = {
                    let model = self.model.lock().await;
                    model.get_content_state().await.genre_recommendations.is_none()
                };
                if missing {
                    self.refresh_recommendations().await;
                }
            }
            View::Admin => self.load_all_users().await,
            _ => {}
        }
    }

    /// Start playback of a track chosen in a content view. The playlist it
    /// was launched from (if any) becomes the active queue.
    pub async fn play_selected(&self, track: Track, from_playlist: Option<String>) {
        {
            let model = self.model.lock().await;
            model.set_active_queue(from_playlist).await;
        }
        self.set_current_track(Some(track)).await;
    }

    // ========================================================================
    // External data
    // ========================================================================

    pub async fn refresh_discover(&self) {
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        let Some(country) = model.get_user().await.and_then(|u| u.country) else {
            model.set_trending(Vec::new()).await;
            drop(model);
            self.notify_info("Set your country in Settings to see trending tracks.".to_string())
                .await;
            return;
        };
        model.set_content_loading(true).await;
        drop(model);

        let region = region_code_for(&country);
        match services.media.trending_tracks(region).await {
            Ok(tracks) => {
                tracing::info!(region, count = tracks.len(), "Trending loaded");
                let model = self.model.lock().await;
                model.set_trending(tracks).await;
            }
            Err(e) => {
                tracing::error!(region, error = %e, "Trending lookup failed");
                {
                    let model = self.model.lock().await;
                    model.set_trending(Vec::new()).await;
                }
                self.notify_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn perform_search(&self, query: &str) {
        tracing::debug!(query, "Performing search");
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        model.set_content_loading(true).await;
        drop(model);

        match services.media.search_tracks(query).await {
            Ok(tracks) => {
                tracing::info!(query, count = tracks.len(), "Search completed");
                let model = self.model.lock().await;
                model.set_search_results(tracks).await;
                model.set_view(View::Search).await;
                model
                    .set_active_section(crate::model::ActiveSection::MainContent)
                    .await;
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Search failed");
                {
                    let model = self.model.lock().await;
                    model.set_search_results(Vec::new()).await;
                    model.set_view(View::Search).await;
                }
                self.notify_error(Self::format_error(&e)).await;
            }
        }
    }

    /// Genre recommendations from listening history and favorite artists.
    /// Failures degrade to an apology string in place of the text.
    pub async fn refresh_recommendations(&self) {
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        let favorites = model
            .get_user()
            .await
            .map(|u| u.favorite_artists)
            .unwrap_or_default();

        let mut history = model.listening_history_text().await;
        if history.is_empty() {
            // Before anything has played, seed the prompt from the library
            history = model
                .playlists()
                .await
                .iter()
                .flat_map(|p| p.tracks.iter())
                .map(|t| format!("{} - {}", t.artist, t.title))
                .collect::<Vec<_>>()
                .join(", ");
        }
        if history.is_empty() {
            model
                .set_genre_recommendations(
                    "Play some tracks or add favorites first, then ask again.".to_string(),
                )
                .await;
            return;
        }
        model.set_content_loading(true).await;
        drop(model);

        let text = match services
            .recommender
            .genre_recommendations(&history, &favorites)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Genre recommendations failed");
                APOLOGY.to_string()
            }
        };
        let model = self.model.lock().await;
        model.set_genre_recommendations(text).await;
    }

    pub async fn request_mood_playlist(&self, mood: &str) {
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        model.set_content_loading(true).await;
        drop(model);

        match services.recommender.mood_playlist(mood).await {
            Ok(songs) => {
                tracing::info!(mood, count = songs.len(), "Mood playlist generated");
                let model = self.model.lock().await;
                model.set_mood_playlist(mood.to_string(), songs).await;
            }
            Err(e) => {
                tracing::error!(mood, error = %e, "Mood playlist failed");
                {
                    let model = self.model.lock().await;
                    model.set_content_loading(false).await;
                }
                self.notify_error(APOLOGY.to_string()).await;
            }
        }
    }

    // ========================================================================
    // Playlist operations
    // ========================================================================

    pub async fn create_playlist(&self, name: &str, tracks: Vec<Track>) {
        {
            let model = self.model.lock().await;
            model.create_playlist(name, tracks).await;
        }
        self.persist_library().await;
        self.notify_info(format!("Playlist \"{}\" created.", name)).await;
    }

    pub async fn add_track_to_playlist(&self, playlist_id: &str, track: Track) {
        let (added, playlist_name) = {
            let model = self.model.lock().await;
            let added = model.add_track_to_playlist(playlist_id, track).await;
            let name = model
                .get_playlist(playlist_id)
                .await
                .map(|p| p.name)
                .unwrap_or_else(|| "playlist".to_string());
            (added, name)
        };
        if added {
            self.persist_library().await;
            self.notify_info(format!("Added to \"{}\".", playlist_name)).await;
        } else {
            self.notify_info(format!("Already in \"{}\".", playlist_name)).await;
        }
    }

    /// One-key add of a track to the user's default playlist.
    pub async fn quick_add(&self, track: Track) {
        let default_id = {
            let model = self.model.lock().await;
            model.default_playlist_id().await
        };
        match default_id {
            Some(id) => self.add_track_to_playlist(&id, track).await,
            None => {
                self.notify_info(
                    "No default playlist set. Pick one in Settings for quick add.".to_string(),
                )
                .await
            }
        }
    }

    pub async fn rename_playlist(&self, playlist_id: &str, new_name: &str) {
        let renamed = {
            let model = self.model.lock().await;
            model.rename_playlist(playlist_id, new_name).await
        };
        if renamed {
            self.persist_library().await;
        }
    }

    pub async fn delete_playlist(&self, playlist_id: &str) {
        let deleted = {
            let model = self.model.lock().await;
            let deleted = model.delete_playlist(playlist_id).await;
            // Leaving a deleted playlist's view open would render nothing
            if deleted && model.current_view().await == (View::Playlist { id: playlist_id.to_string() }) {
                model.set_view(View::Discover).await;
            }
            deleted
        };
        if deleted {
            self.persist_library().await;
            self.notify_info("Playlist deleted.".to_string()).await;
        }
    }

    pub async fn set_default_playlist(&self, playlist_id: &str) {
        let ok = {
            let model = self.model.lock().await;
            model.set_default_playlist(playlist_id).await
        };
        if ok {
            self.persist_library().await;
            self.notify_info("Default playlist set.".to_string()).await;
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub async fn set_country(&self, country: &str) {
        let country = country.trim();
        if country.is_empty() {
            return;
        }
        {
            let model = self.model.lock().await;
            model
                .update_user(|user| user.country = Some(country.to_string()))
                .await;
        }
        self.push_user_record().await;
        self.notify_info(format!("Country set to {}.", country)).await;
        self.refresh_discover().await;
    }

    pub async fn add_favorite_artist(&self, artist: &str) {
        let artist = artist.trim();
        if artist.is_empty() {
            return;
        }
        {
            let model = self.model.lock().await;
            model
                .update_user(|user| {
                    if !user.favorite_artists.iter().any(|a| a == artist) {
                        user.favorite_artists.push(artist.to_string());
                    }
                })
                .await;
        }
        self.push_user_record().await;
    }

    pub async fn remove_last_favorite_artist(&self) {
        {
            let model = self.model.lock().await;
            model
                .update_user(|user| {
                    user.favorite_artists.pop();
                })
                .await;
        }
        self.push_user_record().await;
    }

    pub async fn toggle_theme(&self) {
        let theme = {
            let model = self.model.lock().await;
            let theme = model.toggle_theme().await;
            if let Err(e) = model.cache().save_theme(theme) {
                tracing::warn!(error = %e, "Failed to persist theme");
            }
            model.update_user(|user| user.theme = theme).await;
            theme
        };
        self.push_user_record().await;
        tracing::info!(?theme, "Theme toggled");
    }

    /// Push the current user record through the user-store boundary and
    /// refresh the cached session copy.
    pub(crate) async fn push_user_record(&self) {
        let model = self.model.lock().await;
        let Some(user) = model.get_user().await else {
            return;
        };
        match model.cache().load_session() {
            Ok(Some(mut session)) => {
                session.user = user.clone();
                if let Err(e) = model.cache().save_session(&session) {
                    tracing::warn!(error = %e, "Failed to update cached session");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read cached session"),
        }
        let services = model.services.clone();
        drop(model);

        if let Some(services) = services {
            let controller = self.clone();
            tokio::spawn(async move {
                if let Err(e) = services.store.save_user(&user).await {
                    tracing::error!(error = %e, "Failed to push user record");
                    controller
                        .notify_error("Could not save your settings to the server.".to_string())
                        .await;
                }
            });
        }
    }

    // ========================================================================
    // Admin
    // ========================================================================

    pub async fn load_all_users(&self) {
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        let is_admin = model.get_user().await.map(|u| u.is_admin).unwrap_or(false);
        if !is_admin {
            return;
        }
        model.set_content_loading(true).await;
        drop(model);

        match services.store.get_all_users().await {
            Ok(users) => {
                let model = self.model.lock().await;
                model.set_users(users).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "User listing failed");
                {
                    let model = self.model.lock().await;
                    model.set_users(Vec::new()).await;
                }
                self.notify_error(Self::format_error(&e)).await;
            }
        }
    }

    pub async fn admin_delete_user(&self, email: &str) {
        let model = self.model.lock().await;
        let Some(services) = model.services.clone() else {
            return;
        };
        let me = model.get_user().await.map(|u| u.email);
        if me.as_deref() == Some(email) {
            drop(model);
            self.notify_error("You cannot delete your own account here.".to_string())
                .await;
            return;
        }
        drop(model);

        match services.store.delete_user(email).await {
            Ok(()) => {
                self.notify_info(format!("Deleted {}.", email)).await;
                self.load_all_users().await;
            }
            Err(e) => self.notify_error(Self::format_error(&e)).await,
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn sign_out(&self) {
        self.set_current_track(None).await;
        let model = self.model.lock().await;
        if let Err(e) = model.cache().clear_session() {
            tracing::warn!(error = %e, "Failed to clear cached session");
        }
        model.set_should_quit(true).await;
        tracing::info!("Signed out");
    }
}
