//! Content-area data fetched from the external collaborators

use super::types::{Track, User};

/// Data backing the main content views. Selection indices live in
/// `UiState`; this struct only holds what was fetched.
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    /// Trending tracks for the user's country (discover view)
    pub trending: Vec<Track>,
    /// Results of the last search
    pub search_results: Vec<Track>,
    /// Free-text genre recommendations, or the apology string
    pub genre_recommendations: Option<String>,
    /// Mood the last mood playlist was generated for
    pub mood: Option<String>,
    /// Song titles for that mood
    pub mood_playlist: Vec<String>,
    /// All users (admin view only)
    pub users: Vec<User>,
    pub is_loading: bool,
}
