//! Widget event listener
//!
//! Consumes the adapter's event channel and folds state changes into the
//! model. Events carrying a media id other than the current track's are
//! stale leftovers from an earlier load and are dropped before they can
//! overwrite state derived from the newer request.

use tokio::sync::mpsc;

use crate::model::WidgetState;
use crate::player::AdapterEvent;

use super::AppController;

impl AppController {
    pub fn start_widget_event_listener(&self, mut events: mpsc::UnboundedReceiver<AdapterEvent>) {
        let controller = self.clone();
        tracing::info!("Starting widget event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                {
                    let model = controller.model.lock().await;
                    if model.should_quit().await {
                        tracing::debug!("Widget event listener shutting down");
                        break;
                    }
                }
                controller.handle_adapter_event(event).await;
            }
        });
    }

    pub(crate) async fn handle_adapter_event(&self, event: AdapterEvent) {
        match event {
            AdapterEvent::Ready => {
                tracing::info!("Widget attached");
                // A track selected before the handshake finished is loaded
                // now that the widget can take it
                let pending = {
                    let model = self.model.lock().await;
                    model.current_track().await
                };
                if let Some(track) = pending {
                    self.adapter.load_media(&track.media_id).await;
                    self.start_progress_poll().await;
                }
            }
            AdapterEvent::StateChange { state, media_id } => {
                let current = {
                    let model = self.model.lock().await;
                    model.current_media_id().await
                };

                // Stale-event rejection: a state change for anything other
                // than the current media belongs to an abandoned load
                if let (Some(event_id), Some(current_id)) = (&media_id, &current) {
                    if event_id != current_id {
                        tracing::debug!(
                            event_media = %event_id,
                            current_media = %current_id,
                            "Discarding stale widget event"
                        );
                        return;
                    }
                }

                match state {
                    WidgetState::Playing => {
                        tracing::trace!("Widget state: playing");
                        {
                            let model = self.model.lock().await;
                            model.set_playing(true).await;
                        }
                        self.start_progress_poll().await;
                    }
                    WidgetState::Paused => {
                        tracing::debug!("Widget state: paused");
                        {
                            let model = self.model.lock().await;
                            model.set_playing(false).await;
                        }
                        self.stop_progress_poll().await;
                    }
                    WidgetState::Ended => {
                        tracing::debug!("Widget state: ended");
                        self.stop_progress_poll().await;
                        let next = {
                            let model = self.model.lock().await;
                            model.next_track().await
                        };
                        match next {
                            Some(next) => self.set_current_track(Some(next)).await,
                            None => {
                                // End of the queue: stop cleanly, keep the
                                // track loaded
                                let model = self.model.lock().await;
                                model.set_playing(false).await;
                            }
                        }
                    }
                }
            }
        }
    }
}
