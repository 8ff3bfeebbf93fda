//! Core type definitions for the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A single playable item from the video platform's catalog.
///
/// `media_id` identifies the item for player operations; `id` is the
/// application-level identity used for playlist dedup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    pub media_id: String,
}

/// A named, user-owned ordered collection of tracks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
}

/// UI color theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// A user record as stored in the document store
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    /// Plain comparison only; real credential handling is out of scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_expires: Option<DateTime<Utc>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub favorite_artists: Vec<String>,
    #[serde(default)]
    pub default_playlist_id: Option<String>,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: None,
            otp: None,
            otp_expires: None,
            country: None,
            favorite_artists: Vec::new(),
            default_playlist_id: None,
            playlists: Vec::new(),
            theme: Theme::default(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }
}

/// Which screen the main content area shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Discover,
    Search,
    Playlist { id: String },
    Recommendations,
    Settings,
    Admin,
    /// Full-screen player; replaces the whole frame and relocates the
    /// widget surface to the stage container
    Player,
}

/// Which section of the UI is currently focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Navigation,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Navigation,
            ActiveSection::Navigation => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Navigation => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Navigation,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// An entry in the sidebar navigation list
#[derive(Clone, Debug)]
pub struct NavItem {
    pub name: String,
    pub view: View,
}

/// Severity of a transient notice
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient notification shown as an overlay and auto-cleared
#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub timestamp: Instant,
}

/// What a text-input dialog is collecting
#[derive(Clone, Debug, PartialEq)]
pub enum InputPurpose {
    /// Name for a new playlist; optionally seeded with a track
    CreatePlaylist { track: Option<Track> },
    RenamePlaylist { id: String },
    Mood,
    FavoriteArtist,
    Country,
}

/// Modal dialog state
#[derive(Clone, Debug)]
pub enum Dialog {
    /// Pick a playlist for the given track, or create a new one
    AddToPlaylist { track: Track, selected: usize },
    /// Free-text input (playlist names, mood, country, ...)
    Input { purpose: InputPurpose, buffer: String },
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub view: View,
    pub active_section: ActiveSection,
    pub search_query: String,
    pub nav_items: Vec<NavItem>,
    pub nav_selected: usize,
    pub playlist_selected: usize,
    pub content_selected: usize,
    pub settings_selected: usize,
    pub notice: Option<Notice>,
    pub dialog: Option<Dialog>,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            view: View::Discover,
            active_section: ActiveSection::Navigation,
            search_query: String::new(),
            nav_items: vec![
                NavItem { name: "Discover".to_string(), view: View::Discover },
                NavItem { name: "Recommendations".to_string(), view: View::Recommendations },
                NavItem { name: "Settings".to_string(), view: View::Settings },
            ],
            nav_selected: 0,
            playlist_selected: 0,
            content_selected: 0,
            settings_selected: 0,
            notice: None,
            dialog: None,
            show_help: false,
        }
    }
}
