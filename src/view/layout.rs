//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::ActiveSection;

use super::utils::Palette;
use super::RenderContext;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(30), // Signed-in user
        ])
        .split(area);

    let search_active = ctx.ui.active_section == ActiveSection::Search;
    let search_text = if ctx.ui.search_query.is_empty() {
        "Type to search..."
    } else {
        &ctx.ui.search_query
    };

    let search = Paragraph::new(search_text)
        .style(if search_active {
            Style::default().fg(colors.accent)
        } else {
            Style::default().fg(colors.text)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if search_active {
                    Style::default().fg(colors.accent)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let who = ctx.user_email.as_deref().unwrap_or("not signed in");
    let account = Paragraph::new(format!("♪ {}", who))
        .style(Style::default().fg(colors.dim))
        .block(Block::default().borders(Borders::ALL).title(" Account "));
    frame.render_widget(account, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    let nav_height = ctx.ui.nav_items.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(nav_height),
            Constraint::Min(0), // Playlists fill the remaining space
        ])
        .split(area);

    let nav_items: Vec<ListItem> = ctx
        .ui
        .nav_items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ctx.ui.nav_selected
                && ctx.ui.active_section == ActiveSection::Navigation
            {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else if i == ctx.ui.nav_selected {
                Style::default().fg(colors.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(item.name.clone()).style(style)
        })
        .collect();

    let nav = List::new(nav_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Browse ")
            .padding(Padding::horizontal(1))
            .border_style(if ctx.ui.active_section == ActiveSection::Navigation {
                Style::default().fg(colors.accent)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(nav, chunks[0]);

    let playlist_items: Vec<ListItem> = ctx
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let marker = if ctx.default_playlist_id.as_deref() == Some(playlist.id.as_str()) {
                "◆ " // quick-add target
            } else {
                "  "
            };
            let style = if i == ctx.ui.playlist_selected
                && ctx.ui.active_section == ActiveSection::Playlists
            {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else if i == ctx.ui.playlist_selected {
                Style::default().fg(colors.text).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(format!("{}{} ({})", marker, playlist.name, playlist.tracks.len()))
                .style(style)
        })
        .collect();

    let playlists = List::new(playlist_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Playlists (c:new r:rename d:delete s:default) ")
            .padding(Padding::horizontal(1))
            .border_style(if ctx.ui.active_section == ActiveSection::Playlists {
                Style::default().fg(colors.accent)
            } else {
                Style::default()
            }),
    );
    frame.render_widget(playlists, chunks[1]);
}
