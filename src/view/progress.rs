//! Mini player bar at the bottom of the main layout

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::NowPlaying;

use super::utils::{format_time, Palette};

pub fn render_player_bar(frame: &mut Frame, area: Rect, playback: &NowPlaying, colors: &Palette) {
    let status_text = match &playback.track {
        None => " No track playing".to_string(),
        Some(track) if playback.state.is_playing => {
            format!(" ▶ {} | {}", track.title, track.artist)
        }
        Some(track) => format!(" ⏸ {} | {}", track.title, track.artist),
    };

    let time_str = format!(
        "{} / {}",
        format_time(playback.state.progress),
        format_time(playback.state.duration)
    );

    let ratio = if playback.state.duration > 0.0 {
        (playback.state.progress / playback.state.duration).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let hints = if playback.track.is_some() {
        " space: play/pause | n/p: next/prev | f: full player "
    } else {
        " pick a track and press Enter "
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(hints).right_aligned()),
        )
        .gauge_style(Style::default().fg(colors.accent))
        .ratio(ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
