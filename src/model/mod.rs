//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the
//! application. It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (tracks, playlists, users, UI state)
//! - `playback`: Playback-related state (widget state, progress, snapshots)
//! - `library`: Playlist library and queue-position queries
//! - `content`: Content view data (trending, search results, recommendations)
//! - `cache`: Local persistent storage under `.cache/`
//! - `store`: User document-store client
//! - `media_api`: Track search/trending client
//! - `recommender`: Generative-text recommendation client
//! - `app_model`: Main application model with state management methods

mod types;
mod playback;
mod library;
mod content;
mod cache;
mod store;
mod media_api;
mod recommender;
mod app_model;

pub use types::{
    ActiveSection, Dialog, InputPurpose, NavItem, Notice, NoticeLevel,
    Playlist, Theme, Track, UiState, User, View,
};

pub use playback::{NowPlaying, PlaybackState, WidgetState};

pub use library::Library;

pub use content::ContentState;

pub use cache::{LocalCache, StoredLibrary, StoredSession};

pub use store::UserStore;

pub use media_api::{region_code_for, MediaApi};

pub use recommender::{Recommender, APOLOGY};

pub use app_model::{AppModel, Services};
