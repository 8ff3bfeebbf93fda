//! External player adapter
//!
//! Wraps the third-party embeddable playback widget behind an imperative,
//! fire-and-forget method set plus an event subscription. The widget loads
//! asynchronously on the embed page and announces itself with a single
//! `ready` event; the adapter tolerates that event arriving before or after
//! the rest of startup and ignores duplicates, so a second widget binding
//! can never be created.
//!
//! The widget has no push-based progress reporting. `poll()` requests a
//! time report; the answer lands in the adapter's cache, which is what the
//! best-effort getters read. Immediately after a command the getters may
//! still reflect pre-call state.

mod bridge;

pub use bridge::{
    spawn_tcp_bridge, Mount, ReportedState, TcpLink, WidgetCommand, WidgetEvent, WidgetLink,
};

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::model::WidgetState;

/// Events the adapter surfaces to the session controller. Time reports are
/// absorbed into the cache and not forwarded.
#[derive(Clone, Debug, PartialEq)]
pub enum AdapterEvent {
    Ready,
    StateChange {
        state: WidgetState,
        media_id: Option<String>,
    },
}

#[derive(Debug)]
struct WidgetCache {
    ready: bool,
    loaded_media_id: Option<String>,
    position: f64,
    duration: f64,
    mount: Mount,
}

impl Default for WidgetCache {
    fn default() -> Self {
        Self {
            ready: false,
            loaded_media_id: None,
            position: 0.0,
            duration: 0.0,
            // The embed page starts with the surface in the hidden container
            mount: Mount::Background,
        }
    }
}

/// The single live binding to the widget. Constructed once at application
/// start, owned by the session controller, never recreated.
pub struct PlayerAdapter {
    link: Arc<dyn WidgetLink>,
    cache: Arc<Mutex<WidgetCache>>,
}

impl PlayerAdapter {
    /// Wire the adapter to a transport and start its event pump.
    /// Returns the adapter and the channel the controller listens on.
    pub fn start(
        link: Arc<dyn WidgetLink>,
        mut widget_events: mpsc::UnboundedReceiver<WidgetEvent>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<AdapterEvent>) {
        let adapter = Arc::new(Self {
            link,
            cache: Arc::new(Mutex::new(WidgetCache::default())),
        });

        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let pump = adapter.clone();
        tokio::spawn(async move {
            while let Some(event) = widget_events.recv().await {
                match event {
                    WidgetEvent::Ready => {
                        let mut cache = pump.cache.lock().await;
                        if cache.ready {
                            tracing::debug!("Duplicate ready event, widget already attached");
                            continue;
                        }
                        cache.ready = true;
                        drop(cache);

                        pump.link.send(WidgetCommand::Configure {
                            autoplay: true,
                            native_controls: false,
                            related_content: false,
                            branding_mark: false,
                        });
                        tracing::info!("Widget ready, configuration sent");

                        if event_tx.send(AdapterEvent::Ready).is_err() {
                            break;
                        }
                    }
                    WidgetEvent::State { state, media_id } => {
                        if let Some(id) = &media_id {
                            pump.cache.lock().await.loaded_media_id = Some(id.clone());
                        }
                        let state = match state {
                            ReportedState::Playing => WidgetState::Playing,
                            ReportedState::Paused => WidgetState::Paused,
                            ReportedState::Ended => WidgetState::Ended,
                            ReportedState::Other => continue,
                        };
                        if event_tx
                            .send(AdapterEvent::StateChange { state, media_id })
                            .is_err()
                        {
                            break;
                        }
                    }
                    WidgetEvent::Time {
                        position,
                        duration,
                        media_id,
                    } => {
                        let mut cache = pump.cache.lock().await;
                        cache.position = position;
                        cache.duration = duration;
                        if let Some(id) = media_id {
                            cache.loaded_media_id = Some(id);
                        }
                    }
                }
            }

            // Transport gone: the widget is unavailable from here on
            tracing::warn!("Widget event stream closed, marking adapter unavailable");
            pump.cache.lock().await.ready = false;
        });

        (adapter, event_rx)
    }

    /// False until the ready handshake completes, and again after the
    /// bridge drops. Duration-dependent controls disable on false.
    pub async fn is_available(&self) -> bool {
        self.cache.lock().await.ready
    }

    // ========================================================================
    // Imperative operations (fire-and-forget)
    // ========================================================================

    pub async fn load_media(&self, media_id: &str) {
        let mut cache = self.cache.lock().await;
        // Prime the cache so an immediate reselection of the same track
        // resumes instead of reloading
        cache.loaded_media_id = Some(media_id.to_string());
        cache.position = 0.0;
        cache.duration = 0.0;
        drop(cache);

        tracing::debug!(media_id, "load_media");
        self.link.send(WidgetCommand::Load {
            media_id: media_id.to_string(),
        });
    }

    pub fn play(&self) {
        self.link.send(WidgetCommand::Play);
    }

    pub fn pause(&self) {
        self.link.send(WidgetCommand::Pause);
    }

    pub fn stop(&self) {
        self.link.send(WidgetCommand::Stop);
    }

    pub fn seek_to(&self, seconds: f64) {
        self.link.send(WidgetCommand::Seek { seconds });
    }

    /// Request a fresh time report. The reply updates the cache.
    pub fn poll(&self) {
        self.link.send(WidgetCommand::Poll);
    }

    // ========================================================================
    // Best-effort getters (cached)
    // ========================================================================

    pub async fn loaded_media_id(&self) -> Option<String> {
        self.cache.lock().await.loaded_media_id.clone()
    }

    pub async fn current_time(&self) -> f64 {
        self.cache.lock().await.position
    }

    pub async fn duration(&self) -> f64 {
        self.cache.lock().await.duration
    }

    // ========================================================================
    // Surface relocation
    // ========================================================================

    /// Move the widget surface to the given container. Idempotent: nothing
    /// is sent when the surface is already there, and the surface is always
    /// mounted in exactly one container.
    pub async fn relocate(&self, target: Mount) {
        let mut cache = self.cache.lock().await;
        if cache.mount == target {
            return;
        }
        cache.mount = target;
        drop(cache);

        tracing::debug!(?target, "Relocating widget surface");
        self.link.send(WidgetCommand::Mount { target });
    }

    pub async fn current_mount(&self) -> Mount {
        self.cache.lock().await.mount
    }
}

#[cfg(test)]
pub mod testing {
    //! Channel-backed fake transport for exercising the adapter and the
    //! session controller without an embed page.

    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Records every command the adapter sends.
    #[derive(Clone, Default)]
    pub struct RecordingLink {
        sent: Arc<StdMutex<Vec<WidgetCommand>>>,
    }

    impl RecordingLink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<WidgetCommand> {
            self.sent.lock().unwrap().clone()
        }

        pub fn count_loads(&self) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, WidgetCommand::Load { .. }))
                .count()
        }

        pub fn count_mounts(&self) -> usize {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, WidgetCommand::Mount { .. }))
                .count()
        }

        pub fn last_seek(&self) -> Option<f64> {
            self.sent.lock().unwrap().iter().rev().find_map(|c| match c {
                WidgetCommand::Seek { seconds } => Some(*seconds),
                _ => None,
            })
        }
    }

    impl WidgetLink for RecordingLink {
        fn send(&self, command: WidgetCommand) {
            self.sent.lock().unwrap().push(command);
        }
    }

    /// Adapter wired to a recording link plus an injection channel that
    /// plays the role of the embed page.
    pub fn test_adapter() -> (
        Arc<PlayerAdapter>,
        RecordingLink,
        mpsc::UnboundedSender<WidgetEvent>,
        mpsc::UnboundedReceiver<AdapterEvent>,
    ) {
        let link = RecordingLink::new();
        let (widget_tx, widget_rx) = mpsc::unbounded_channel();
        let (adapter, adapter_rx) = PlayerAdapter::start(Arc::new(link.clone()), widget_rx);
        (adapter, link, widget_tx, adapter_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::test_adapter;
    use super::*;

    #[tokio::test]
    async fn duplicate_ready_does_not_rebind() {
        let (adapter, link, widget_tx, mut events) = test_adapter();

        widget_tx.send(WidgetEvent::Ready).unwrap();
        assert_eq!(events.recv().await, Some(AdapterEvent::Ready));
        assert!(adapter.is_available().await);

        // A second ready must be swallowed; the next forwarded event is the
        // state change, not another Ready
        widget_tx.send(WidgetEvent::Ready).unwrap();
        widget_tx
            .send(WidgetEvent::State {
                state: ReportedState::Playing,
                media_id: Some("m1".to_string()),
            })
            .unwrap();
        assert_eq!(
            events.recv().await,
            Some(AdapterEvent::StateChange {
                state: WidgetState::Playing,
                media_id: Some("m1".to_string()),
            })
        );

        // Exactly one configure despite two ready events
        let configures = link
            .sent()
            .iter()
            .filter(|c| matches!(c, WidgetCommand::Configure { .. }))
            .count();
        assert_eq!(configures, 1);
    }

    #[tokio::test]
    async fn relocation_is_idempotent() {
        let (adapter, link, _widget_tx, _events) = test_adapter();

        adapter.relocate(Mount::Stage).await;
        adapter.relocate(Mount::Stage).await;
        assert_eq!(link.count_mounts(), 1);
        assert_eq!(adapter.current_mount().await, Mount::Stage);

        adapter.relocate(Mount::Background).await;
        assert_eq!(link.count_mounts(), 2);
        assert_eq!(adapter.current_mount().await, Mount::Background);

        // Moving to the container it already sits in stays a no-op
        adapter.relocate(Mount::Background).await;
        assert_eq!(link.count_mounts(), 2);
    }

    #[tokio::test]
    async fn time_reports_feed_the_getters() {
        let (adapter, _link, widget_tx, mut events) = test_adapter();

        widget_tx.send(WidgetEvent::Ready).unwrap();
        assert_eq!(events.recv().await, Some(AdapterEvent::Ready));

        widget_tx
            .send(WidgetEvent::Time {
                position: 42.5,
                duration: 180.0,
                media_id: Some("m1".to_string()),
            })
            .unwrap();
        // Time reports are not forwarded; use a state event as a barrier
        widget_tx
            .send(WidgetEvent::State {
                state: ReportedState::Paused,
                media_id: None,
            })
            .unwrap();
        events.recv().await;

        assert_eq!(adapter.current_time().await, 42.5);
        assert_eq!(adapter.duration().await, 180.0);
        assert_eq!(adapter.loaded_media_id().await.as_deref(), Some("m1"));
    }

    #[tokio::test]
    async fn other_states_are_ignored() {
        let (_adapter, _link, widget_tx, mut events) = test_adapter();

        widget_tx.send(WidgetEvent::Ready).unwrap();
        assert_eq!(events.recv().await, Some(AdapterEvent::Ready));

        widget_tx
            .send(WidgetEvent::State {
                state: ReportedState::Other,
                media_id: None,
            })
            .unwrap();
        widget_tx
            .send(WidgetEvent::State {
                state: ReportedState::Ended,
                media_id: Some("m1".to_string()),
            })
            .unwrap();

        // The buffering-style state was dropped; ended comes through first
        assert_eq!(
            events.recv().await,
            Some(AdapterEvent::StateChange {
                state: WidgetState::Ended,
                media_id: Some("m1".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn load_primes_the_cache() {
        let (adapter, link, _widget_tx, _events) = test_adapter();

        adapter.load_media("m9").await;
        assert_eq!(adapter.loaded_media_id().await.as_deref(), Some("m9"));
        assert_eq!(adapter.duration().await, 0.0);
        assert_eq!(link.count_loads(), 1);
    }
}
