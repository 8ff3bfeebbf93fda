//! Playback session controller
//!
//! Single source of truth for what is playing and how far along, and the
//! only place adapter operations are issued from. All operations are
//! infallible for callers; widget failures surface as disabled controls,
//! never as errors.

use std::time::Duration;

use crate::model::Track;

use super::AppController;

/// Pressing "previous" past this point restarts the track instead of
/// moving to the previous one.
pub const PREV_RESTART_THRESHOLD_SECS: f64 = 3.0;

const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

impl AppController {
    /// Swap the current track.
    ///
    /// Selecting the media the widget already has loaded resumes instead of
    /// reloading, which avoids an audible restart glitch. `None` stops the
    /// widget but never destroys it.
    pub async fn set_current_track(&self, track: Option<Track>) {
        match track {
            Some(track) => {
                let resume = self
                    .adapter
                    .loaded_media_id()
                    .await
                    .as_deref()
                    == Some(track.media_id.as_str());

                {
                    let model = self.model.lock().await;
                    model.set_current_track(Some(track.clone())).await;
                }

                if resume {
                    tracing::debug!(media_id = %track.media_id, "Same media loaded, resuming");
                    self.adapter.play();
                } else {
                    tracing::info!(media_id = %track.media_id, title = %track.title, "Loading track");
                    self.adapter.load_media(&track.media_id).await;
                }

                self.start_progress_poll().await;
            }
            None => {
                {
                    let model = self.model.lock().await;
                    model.set_current_track(None).await;
                }
                self.adapter.stop();
                self.stop_progress_poll().await;
            }
        }
    }

    /// Play/pause flip. No-op when nothing is loaded. The flip is
    /// optimistic; the next widget state change is authoritative.
    pub async fn toggle_play(&self) {
        let model = self.model.lock().await;
        if model.current_track().await.is_none() {
            return;
        }
        let was_playing = model.playback_state().await.is_playing;
        model.set_playing(!was_playing).await;
        drop(model);

        if was_playing {
            self.adapter.pause();
            self.stop_progress_poll().await;
        } else {
            self.adapter.play();
            self.start_progress_poll().await;
        }
    }

    /// Seek, clamped to the known duration. Disabled (no-op) while the
    /// duration is unknown, matching the disabled seek UI.
    pub async fn seek(&self, seconds: f64) {
        let model = self.model.lock().await;
        if model.current_track().await.is_none() {
            return;
        }
        let state = model.playback_state().await;
        if state.duration <= 0.0 {
            return;
        }
        let clamped = seconds.clamp(0.0, state.duration);
        // Optimistic: the widget does not confirm seeks synchronously
        model.set_progress_optimistic(clamped).await;
        drop(model);

        self.adapter.seek_to(clamped);
    }

    pub async fn play_next(&self) {
        let next = {
            let model = self.model.lock().await;
            model.next_track().await
        };
        match next {
            Some(next) => self.set_current_track(Some(next)).await,
            None => tracing::debug!("No next track in the queue"),
        }
    }

    /// Conventional back-button semantics: early in the track move to the
    /// previous one, otherwise restart the current track.
    pub async fn play_prev(&self) {
        let model = self.model.lock().await;
        let state = model.playback_state().await;

        if state.progress > PREV_RESTART_THRESHOLD_SECS {
            model.set_progress_optimistic(0.0).await;
            drop(model);
            self.adapter.seek_to(0.0);
            return;
        }

        let prev = model.prev_track().await;
        drop(model);
        match prev {
            Some(prev) => self.set_current_track(Some(prev)).await,
            None => tracing::debug!("No previous track in the queue"),
        }
    }

    pub async fn can_play_next(&self) -> bool {
        let model = self.model.lock().await;
        model.next_track().await.is_some()
    }

    /// Restart is always available past the threshold, even with no
    /// previous track.
    pub async fn can_play_prev(&self) -> bool {
        let model = self.model.lock().await;
        if model.playback_state().await.progress > PREV_RESTART_THRESHOLD_SECS {
            return true;
        }
        model.prev_track().await.is_some()
    }

    // ========================================================================
    // Progress polling
    // ========================================================================

    /// Start the periodic progress poll. The widget has no push-based time
    /// updates, so while playback runs we request a report every 500ms and
    /// mirror the adapter's cache into the model. The task ends whenever
    /// playback stops and is aborted on pause/stop/quit, so it can never
    /// outlive the thing it polls.
    pub(crate) async fn start_progress_poll(&self) {
        let mut guard = self.poll_task.lock().await;
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }

        let controller = self.clone();
        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_POLL_INTERVAL);
            loop {
                interval.tick().await;

                controller.adapter.poll();
                let sample_media_id = controller.adapter.loaded_media_id().await;
                let position = controller.adapter.current_time().await;
                let duration = controller.adapter.duration().await;

                let model = controller.model.lock().await;
                if model.should_quit().await {
                    break;
                }
                let Some(current_media_id) = model.current_media_id().await else {
                    break;
                };

                // A sample for a previously loaded media id must not leak
                // into the new track's progress
                if sample_media_id.as_deref() == Some(current_media_id.as_str()) {
                    model.apply_time_sample(position, duration).await;
                }

                if !model.playback_state().await.is_playing {
                    break;
                }
            }
            tracing::trace!("Progress poll task finished");
        }));
    }

    pub(crate) async fn stop_progress_poll(&self) {
        let mut guard = self.poll_task.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tokio::sync::{mpsc, Mutex};

    use super::*;
    use crate::model::{AppModel, LocalCache, WidgetState};
    use crate::player::testing::{test_adapter, RecordingLink};
    use crate::player::{AdapterEvent, WidgetCommand, WidgetEvent};

    struct Harness {
        controller: AppController,
        link: RecordingLink,
        /// Keeps the fake embed page's sender half alive
        _widget_tx: mpsc::UnboundedSender<WidgetEvent>,
        _dir: tempfile::TempDir,
    }

    async fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let model = AppModel::new(LocalCache::with_dir(dir.path()));
        let (adapter, link, widget_tx, _adapter_rx) = test_adapter();
        let controller = AppController::new(Arc::new(Mutex::new(model)), adapter);
        Harness {
            controller,
            link,
            _widget_tx: widget_tx,
            _dir: dir,
        }
    }

    fn track(n: u32) -> Track {
        Track {
            id: format!("t{}", n),
            title: format!("Track {}", n),
            artist: "Artist".to_string(),
            thumbnail: String::new(),
            media_id: format!("m{}", n),
        }
    }

    /// Three-track playlist, current track is the given position (1-based).
    async fn with_queue(harness: &Harness, position: u32) {
        {
            let model = harness.controller.model.lock().await;
            model
                .load_library(
                    vec![crate::model::Playlist {
                        id: "p1".to_string(),
                        name: "Queue".to_string(),
                        tracks: vec![track(1), track(2), track(3)],
                    }],
                    None,
                )
                .await;
            model.set_active_queue(Some("p1".to_string())).await;
        }
        harness
            .controller
            .set_current_track(Some(track(position)))
            .await;
    }

    async fn current_id(harness: &Harness) -> Option<String> {
        let model = harness.controller.model.lock().await;
        model.current_track().await.map(|t| t.id)
    }

    #[tokio::test]
    async fn ended_advances_to_the_next_track() {
        let h = harness().await;
        with_queue(&h, 1).await;

        h.controller
            .handle_adapter_event(AdapterEvent::StateChange {
                state: WidgetState::Ended,
                media_id: Some("m1".to_string()),
            })
            .await;

        assert_eq!(current_id(&h).await.as_deref(), Some("t2"));
        // The advance loaded the next media
        assert!(h
            .link
            .sent()
            .contains(&WidgetCommand::Load { media_id: "m2".to_string() }));
    }

    #[tokio::test]
    async fn end_of_queue_stops_cleanly() {
        let h = harness().await;
        with_queue(&h, 3).await;

        h.controller
            .handle_adapter_event(AdapterEvent::StateChange {
                state: WidgetState::Ended,
                media_id: Some("m3".to_string()),
            })
            .await;

        // Track unchanged, playback stopped, nothing panicked
        assert_eq!(current_id(&h).await.as_deref(), Some("t3"));
        let model = h.controller.model.lock().await;
        assert!(!model.playback_state().await.is_playing);
    }

    #[tokio::test]
    async fn selecting_the_loaded_track_resumes_instead_of_reloading() {
        let h = harness().await;
        with_queue(&h, 1).await;
        assert_eq!(h.link.count_loads(), 1);

        h.controller.set_current_track(Some(track(1))).await;
        h.controller.set_current_track(Some(track(1))).await;

        assert_eq!(h.link.count_loads(), 1);
        assert!(h.link.sent().contains(&WidgetCommand::Play));
    }

    #[tokio::test]
    async fn prev_restarts_past_the_threshold() {
        let h = harness().await;
        with_queue(&h, 2).await;

        {
            let model = h.controller.model.lock().await;
            model.apply_time_sample(5.0, 100.0).await;
        }
        h.controller.play_prev().await;

        // 5 seconds in: restart, do not switch
        assert_eq!(current_id(&h).await.as_deref(), Some("t2"));
        assert_eq!(h.link.last_seek(), Some(0.0));
        let model = h.controller.model.lock().await;
        assert_eq!(model.playback_state().await.progress, 0.0);
    }

    #[tokio::test]
    async fn prev_switches_early_in_the_track() {
        let h = harness().await;
        with_queue(&h, 2).await;

        {
            let model = h.controller.model.lock().await;
            model.apply_time_sample(1.0, 100.0).await;
        }
        h.controller.play_prev().await;

        assert_eq!(current_id(&h).await.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn restart_is_available_without_a_previous_track() {
        let h = harness().await;
        with_queue(&h, 1).await;

        {
            let model = h.controller.model.lock().await;
            model.apply_time_sample(10.0, 100.0).await;
        }
        assert!(h.controller.can_play_prev().await);

        {
            let model = h.controller.model.lock().await;
            model.apply_time_sample(1.0, 100.0).await;
        }
        assert!(!h.controller.can_play_prev().await);
    }

    #[tokio::test]
    async fn stale_events_for_a_previous_track_are_dropped() {
        let h = harness().await;
        with_queue(&h, 1).await;
        // User immediately switches to track 2 while track 1's load is in
        // flight
        h.controller.set_current_track(Some(track(2))).await;

        // Late events for track 1 arrive afterwards
        h.controller
            .handle_adapter_event(AdapterEvent::StateChange {
                state: WidgetState::Paused,
                media_id: Some("m1".to_string()),
            })
            .await;
        h.controller
            .handle_adapter_event(AdapterEvent::StateChange {
                state: WidgetState::Ended,
                media_id: Some("m1".to_string()),
            })
            .await;

        // Neither the pause nor the ended event may touch track 2's state
        assert_eq!(current_id(&h).await.as_deref(), Some("t2"));
        let model = h.controller.model.lock().await;
        assert!(model.playback_state().await.is_playing);
    }

    #[tokio::test]
    async fn toggle_without_a_track_is_a_no_op() {
        let h = harness().await;
        h.controller.toggle_play().await;
        assert!(h.link.sent().is_empty());
    }

    #[tokio::test]
    async fn seek_clamps_and_is_disabled_without_duration() {
        let h = harness().await;
        with_queue(&h, 1).await;

        // Duration unknown: seek is a disabled control
        h.controller.seek(30.0).await;
        assert_eq!(h.link.last_seek(), None);

        {
            let model = h.controller.model.lock().await;
            model.apply_time_sample(10.0, 100.0).await;
        }
        h.controller.seek(500.0).await;
        assert_eq!(h.link.last_seek(), Some(100.0));
        h.controller.seek(-5.0).await;
        assert_eq!(h.link.last_seek(), Some(0.0));
    }

    #[tokio::test]
    async fn clearing_the_track_stops_the_widget() {
        let h = harness().await;
        with_queue(&h, 1).await;

        h.controller.set_current_track(None).await;

        assert!(h.link.sent().contains(&WidgetCommand::Stop));
        assert_eq!(current_id(&h).await, None);
    }

    #[tokio::test]
    async fn ended_for_the_current_track_without_id_still_advances() {
        // Widgets that omit the media id on state events are taken at face
        // value; only a mismatching id is treated as stale
        let h = harness().await;
        with_queue(&h, 1).await;

        h.controller
            .handle_adapter_event(AdapterEvent::StateChange {
                state: WidgetState::Ended,
                media_id: None,
            })
            .await;

        assert_eq!(current_id(&h).await.as_deref(), Some("t2"));
    }
}
