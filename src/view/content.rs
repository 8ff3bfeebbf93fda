//! Main content area rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActiveSection, Theme, Track, View};

use super::utils::{render_scrollable_list, truncate_string, Palette};
use super::RenderContext;

pub fn render_main_content(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    if ctx.content.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(colors.dim))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(loading, area);
        return;
    }

    match &ctx.ui.view {
        View::Discover => render_track_list(
            frame,
            area,
            ctx,
            colors,
            &ctx.content.trending,
            " Trending ",
            "Nothing trending yet. Set your country in Settings.",
        ),
        View::Search => {
            let title = format!(" Results for \"{}\" ", ctx.ui.search_query);
            render_track_list(
                frame,
                area,
                ctx,
                colors,
                &ctx.content.search_results,
                &title,
                "No results. Type a query above and press Enter.",
            )
        }
        View::Playlist { id } => {
            let playlist = ctx.playlists.iter().find(|p| &p.id == id);
            match playlist {
                Some(playlist) => {
                    let title = format!(" {} ({} tracks) ", playlist.name, playlist.tracks.len());
                    render_track_list(
                        frame,
                        area,
                        ctx,
                        colors,
                        &playlist.tracks,
                        &title,
                        "This playlist is empty. Add tracks with 'a' or 'A'.",
                    )
                }
                None => {
                    let missing = Paragraph::new("Playlist no longer exists.")
                        .style(Style::default().fg(colors.dim))
                        .block(Block::default().borders(Borders::ALL));
                    frame.render_widget(missing, area);
                }
            }
        }
        View::Recommendations => render_recommendations(frame, area, ctx, colors),
        View::Settings => render_settings(frame, area, ctx, colors),
        View::Admin => render_admin(frame, area, ctx, colors),
        View::Player => {}
    }
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    ctx: &RenderContext,
    colors: &Palette,
    tracks: &[Track],
    title: &str,
    empty_hint: &str,
) {
    let active = ctx.ui.active_section == ActiveSection::MainContent;
    let border_style = if active {
        Style::default().fg(colors.accent)
    } else {
        Style::default()
    };

    if tracks.is_empty() {
        let hint = Paragraph::new(empty_hint)
            .style(Style::default().fg(colors.dim))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .border_style(border_style),
            );
        frame.render_widget(hint, area);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let playing_id = ctx.playback.track.as_ref().map(|t| t.id.as_str());

    let items: Vec<ListItem> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let now = if playing_id == Some(track.id.as_str()) { "▶ " } else { "  " };
            let text = truncate_string(
                &format!("{}{} | {}", now, track.title, track.artist),
                width,
            );
            let style = if i == ctx.ui.content_selected && active {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else if playing_id == Some(track.id.as_str()) {
                Style::default().fg(colors.accent)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_bottom(Line::from(" Enter: play  a: quick add  A: add to playlist ").right_aligned())
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, ctx.ui.content_selected, block);
}

fn render_recommendations(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let text = ctx
        .content
        .genre_recommendations
        .as_deref()
        .unwrap_or("Press 'g' to generate recommendations from your listening history.");
    let genre = Paragraph::new(text)
        .style(Style::default().fg(colors.text))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" For you (g: refresh) ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(genre, chunks[0]);

    let active = ctx.ui.active_section == ActiveSection::MainContent;
    let mood_title = match &ctx.content.mood {
        Some(mood) => format!(" Mood: {} (m: new mood, Enter: search) ", mood),
        None => " Mood playlist (m: pick a mood) ".to_string(),
    };

    if ctx.content.mood_playlist.is_empty() {
        let hint = Paragraph::new("Tell me how you feel and I'll line up some songs.")
            .style(Style::default().fg(colors.dim))
            .block(Block::default().borders(Borders::ALL).title(mood_title));
        frame.render_widget(hint, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = ctx
        .content
        .mood_playlist
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let style = if i == ctx.ui.content_selected && active {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(format!("{}. {}", i + 1, song)).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(mood_title)
        .padding(Padding::horizontal(1))
        .border_style(if active {
            Style::default().fg(colors.accent)
        } else {
            Style::default()
        });
    render_scrollable_list(frame, chunks[1], items, ctx.ui.content_selected, block);
}

fn render_settings(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    let active = ctx.ui.active_section == ActiveSection::MainContent;

    let country = ctx
        .user_country
        .clone()
        .unwrap_or_else(|| "not set".to_string());
    let favorites = if ctx.favorite_artists.is_empty() {
        "none".to_string()
    } else {
        ctx.favorite_artists.join(", ")
    };
    let default_name = ctx
        .default_playlist_id
        .as_deref()
        .and_then(|id| ctx.playlists.iter().find(|p| p.id == id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "not set".to_string());
    let theme_name = match ctx.theme {
        Theme::Dark => "Dark",
        Theme::Light => "Light",
    };

    let rows = [
        format!("Country: {}", country),
        format!("Favorite artists: {}  (x: remove last)", favorites),
        format!("Default playlist: {}  (Enter: cycle)", default_name),
        format!("Theme: {}  (Enter: toggle)", theme_name),
        "Sign out".to_string(),
    ];

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == ctx.ui.settings_selected && active {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(row.clone()).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Settings ")
        .padding(Padding::horizontal(1))
        .border_style(if active {
            Style::default().fg(colors.accent)
        } else {
            Style::default()
        });
    render_scrollable_list(frame, area, items, ctx.ui.settings_selected, block);
}

fn render_admin(frame: &mut Frame, area: Rect, ctx: &RenderContext, colors: &Palette) {
    let active = ctx.ui.active_section == ActiveSection::MainContent;

    let items: Vec<ListItem> = ctx
        .content
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let badge = if user.is_admin { " [admin]" } else { "" };
            let text = format!(
                "{}{}  since {}",
                user.email,
                badge,
                user.created_at.format("%Y-%m-%d")
            );
            let style = if i == ctx.ui.content_selected && active {
                Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Users: {} (d: delete) ", ctx.content.users.len()))
        .padding(Padding::horizontal(1))
        .border_style(if active {
            Style::default().fg(colors.accent)
        } else {
            Style::default()
        });
    render_scrollable_list(frame, area, items, ctx.ui.content_selected, block);
}
