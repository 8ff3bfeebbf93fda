//! Full-screen player view
//!
//! Replaces the whole frame. The widget surface itself renders on the embed
//! page's stage container while this view is up; the TUI shows the track,
//! the progress bar and the transport controls.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::utils::{format_time, Palette};
use super::RenderContext;

pub fn render_player_view(frame: &mut Frame, ctx: &RenderContext, colors: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(6),    // Stage
            Constraint::Length(4), // Track info
            Constraint::Length(3), // Progress
            Constraint::Length(3), // Transport
        ])
        .split(frame.area());

    let header = Paragraph::new("NOW PLAYING  (Esc: back)")
        .alignment(Alignment::Center)
        .style(Style::default().fg(colors.dim));
    frame.render_widget(header, chunks[0]);

    // Where the relocated widget surface appears on the embed page
    let stage = Paragraph::new("")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Stage ")
                .border_style(Style::default().fg(colors.accent)),
        );
    frame.render_widget(stage, chunks[1]);

    let (title, artist) = match &ctx.playback.track {
        Some(track) => (track.title.clone(), track.artist.clone()),
        None => ("No track playing".to_string(), String::new()),
    };
    let info = Paragraph::new(vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(artist, Style::default().fg(colors.dim))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(info, chunks[2]);

    let state = &ctx.playback.state;
    let ratio = if state.duration > 0.0 {
        (state.progress / state.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(colors.accent))
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_time(state.progress),
            format_time(state.duration)
        ));
    frame.render_widget(gauge, chunks[3]);

    // Transport hints dim out when the control is unavailable
    let seekable = ctx.playback.widget_available && state.duration > 0.0;
    let enabled = Style::default().fg(colors.text);
    let disabled = Style::default().fg(colors.dim);

    let transport = Line::from(vec![
        Span::styled(" ⏮ p ", if ctx.playback.can_prev { enabled } else { disabled }),
        Span::raw("  "),
        Span::styled("« 10s ← ", if seekable { enabled } else { disabled }),
        Span::raw("  "),
        Span::styled(
            if state.is_playing { " ⏸ space " } else { " ▶ space " },
            if ctx.playback.track.is_some() { enabled.add_modifier(Modifier::BOLD) } else { disabled },
        ),
        Span::raw("  "),
        Span::styled("→ 10s »", if seekable { enabled } else { disabled }),
        Span::raw("  "),
        Span::styled(" ⏭ n ", if ctx.playback.can_next { enabled } else { disabled }),
        Span::raw("      "),
        Span::styled("a: quick add  A: add to playlist", Style::default().fg(colors.dim)),
    ]);
    let controls = Paragraph::new(transport)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(controls, chunks[4]);
}
