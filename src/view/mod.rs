//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (palette, formatting, lists)
//! - `layout`: Main layout structure (top bar, sidebar)
//! - `content`: Main content area rendering
//! - `player`: Full-screen player view
//! - `progress`: Mini player bar at the bottom
//! - `overlays`: Modal overlays (notice, dialogs, help)

mod utils;
mod layout;
mod content;
mod player;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, NowPlaying, Playlist, Theme, UiState, View};

/// Everything a frame needs, snapshotted once per draw
pub struct RenderContext {
    pub playback: NowPlaying,
    pub ui: UiState,
    pub content: ContentState,
    pub playlists: Vec<Playlist>,
    pub default_playlist_id: Option<String>,
    pub theme: Theme,
    pub user_email: Option<String>,
    pub user_country: Option<String>,
    pub favorite_artists: Vec<String>,
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, ctx: &RenderContext) {
        let colors = utils::palette(ctx.theme);

        // The full player replaces the whole frame; the widget surface is
        // relocated to the stage while this view is up
        if ctx.ui.view == View::Player {
            player::render_player_view(frame, ctx, &colors);
            overlays::render_overlays(frame, ctx, &colors);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + signed-in user
                Constraint::Min(0),    // Sidebar + main content
                Constraint::Length(3), // Mini player bar
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ctx, &colors);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(28), // Sidebar (navigation + playlists)
                Constraint::Percentage(72), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], ctx, &colors);
        content::render_main_content(frame, main_chunks[1], ctx, &colors);

        progress::render_player_bar(frame, chunks[2], &ctx.playback, &colors);

        overlays::render_overlays(frame, ctx, &colors);
    }
}
