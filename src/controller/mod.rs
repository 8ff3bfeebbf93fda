//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and owns the player adapter.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: The playback session controller and progress polling
//! - `navigation`: View switching, data fetching, playlist and settings ops
//! - `player_events`: Widget event listener

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::model::{AppModel, NoticeLevel};
use crate::player::PlayerAdapter;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    /// The single live widget binding; only this controller issues commands
    pub(crate) adapter: Arc<PlayerAdapter>,
    poll_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, adapter: Arc<PlayerAdapter>) -> Self {
        Self {
            model,
            adapter,
            poll_task: Arc::new(Mutex::new(None)),
        }
    }

    /// Abort the progress poll task; called on quit.
    pub async fn shutdown(&self) {
        self.stop_progress_poll().await;
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        let error_str = error.to_string();

        if error_str.contains("401") || error_str.contains("403") {
            "The service rejected the request. Check your API keys in the config.".to_string()
        } else if error_str.contains("404") {
            "The service could not find what was asked for.".to_string()
        } else if error_str.contains("429") {
            "Rate limited. Please wait a moment.".to_string()
        } else if error_str.contains("not configured") {
            format!("{}. Edit the config file and restart.", error_str)
        } else {
            format!("Error: {}", error_str)
        }
    }

    pub(crate) async fn notify_error(&self, message: String) {
        let model = self.model.lock().await;
        model.set_notice(message, NoticeLevel::Error).await;
    }

    pub(crate) async fn notify_info(&self, message: String) {
        let model = self.model.lock().await;
        model.set_notice(message, NoticeLevel::Info).await;
    }

    /// Persist the library after a mutation: snapshot to the local cache,
    /// fold into the user record and push it through the user-store
    /// boundary in the background.
    pub(crate) async fn persist_library(&self) {
        let model = self.model.lock().await;
        let snapshot = model.library_snapshot().await;

        if let Err(e) = model.cache().save_library(&snapshot) {
            tracing::warn!(error = %e, "Failed to write library snapshot");
        }

        let user = model
            .update_user(|user| {
                user.playlists = snapshot.playlists.clone();
                user.default_playlist_id = snapshot.default_playlist_id.clone();
            })
            .await;

        // Keep the cached session in step with the user record
        if let Some(user) = &user {
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
        }

        let services = model.services.clone();
        drop(model);

        if let (Some(user), Some(services)) = (user, services) {
            let controller = self.clone();
            tokio::spawn(async move {
                if let Err(e) = services.store.save_user(&user).await {
                    tracing::error!(error = %e, "Failed to push user record");
                    controller
                        .notify_error("Could not save your playlists to the server.".to_string())
                        .await;
                }
            });
        }
    }
}
