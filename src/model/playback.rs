//! Playback-related types and state management

use super::types::Track;

/// Coarse-grained state reported by the widget.
///
/// Anything the widget reports beyond these three is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetState {
    Playing,
    Paused,
    Ended,
}

/// Live playback state mirrored from the adapter.
///
/// `progress` and `duration` are in seconds. `duration` stays 0 until the
/// adapter reports it; once it is known, `0 <= progress <= duration` holds
/// within one polling interval (the setters clamp).
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub progress: f64,
    pub duration: f64,
}

impl PlaybackState {
    /// Apply a polled time sample. Negative values and overshoot past a
    /// known duration are clamped so transient seek glitches self-correct.
    pub fn apply_sample(&mut self, position: f64, duration: f64) {
        if duration > 0.0 {
            self.duration = duration;
        }
        let position = position.max(0.0);
        self.progress = if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        };
    }

    /// Optimistic progress update after a seek; clamped the same way.
    pub fn set_progress(&mut self, position: f64) {
        let position = position.max(0.0);
        self.progress = if self.duration > 0.0 {
            position.min(self.duration)
        } else {
            position
        };
    }

    /// Reset for a new track: progress back to 0, duration unknown.
    pub fn reset_for_track(&mut self, playing: bool) {
        self.progress = 0.0;
        self.duration = 0.0;
        self.is_playing = playing;
    }
}

/// Snapshot handed to the view layer each frame
#[derive(Clone, Debug, Default)]
pub struct NowPlaying {
    pub track: Option<Track>,
    pub state: PlaybackState,
    /// False until the widget's ready handshake completes; seek and
    /// skip-by-10s additionally require a known duration
    pub widget_available: bool,
    pub can_next: bool,
    pub can_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_clamps_to_duration() {
        let mut state = PlaybackState::default();
        state.apply_sample(42.0, 180.0);
        assert_eq!(state.progress, 42.0);
        assert_eq!(state.duration, 180.0);

        // Overshoot past the end clamps back inside the track
        state.apply_sample(200.0, 180.0);
        assert_eq!(state.progress, 180.0);

        state.apply_sample(-3.0, 180.0);
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn sample_before_duration_known_passes_through() {
        let mut state = PlaybackState::default();
        state.apply_sample(5.0, 0.0);
        assert_eq!(state.duration, 0.0);
        assert_eq!(state.progress, 5.0);
    }

    #[test]
    fn optimistic_seek_is_clamped() {
        let mut state = PlaybackState::default();
        state.apply_sample(10.0, 60.0);
        state.set_progress(600.0);
        assert_eq!(state.progress, 60.0);
        state.set_progress(-10.0);
        assert_eq!(state.progress, 0.0);
    }

    #[test]
    fn reset_clears_progress_and_duration() {
        let mut state = PlaybackState::default();
        state.apply_sample(10.0, 60.0);
        state.reset_for_track(true);
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.duration, 0.0);
        assert!(state.is_playing);
    }
}
