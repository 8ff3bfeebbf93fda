//! Overlay rendering (notices, dialogs, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{Dialog, InputPurpose, NoticeLevel};

use super::utils::Palette;
use super::RenderContext;

pub fn render_overlays(frame: &mut Frame, ctx: &RenderContext, colors: &Palette) {
    if let Some(dialog) = &ctx.ui.dialog {
        match dialog {
            Dialog::Input { purpose, buffer } => render_input_dialog(frame, purpose, buffer, colors),
            Dialog::AddToPlaylist { track, selected } => {
                render_add_to_playlist(frame, ctx, &track.title, *selected, colors)
            }
        }
    }

    if ctx.ui.notice.is_some() {
        render_notice(frame, ctx, colors);
    }

    if ctx.ui.show_help {
        render_help_popup(frame, colors);
    }
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn render_notice(frame: &mut Frame, ctx: &RenderContext, colors: &Palette) {
    let Some(notice) = &ctx.ui.notice else {
        return;
    };

    let area = frame.area();
    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4) as usize;
    let line_count = ((notice.message.chars().count() as f32) / (inner_width as f32)).ceil() as u16;
    let popup_area = centered_popup(area, popup_width, 2 + line_count.max(1));

    let (color, title) = match notice.level {
        NoticeLevel::Error => (Color::Red, " Error (Esc to dismiss) "),
        NoticeLevel::Info => (colors.accent, " Notice (Esc to dismiss) "),
    };

    frame.render_widget(Clear, popup_area);
    let widget = Paragraph::new(notice.message.clone())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(colors.bg)),
        );
    frame.render_widget(widget, popup_area);
}

fn render_input_dialog(frame: &mut Frame, purpose: &InputPurpose, buffer: &str, colors: &Palette) {
    let title = match purpose {
        InputPurpose::CreatePlaylist { .. } => " New playlist name ",
        InputPurpose::RenamePlaylist { .. } => " Rename playlist ",
        InputPurpose::Mood => " How are you feeling? ",
        InputPurpose::FavoriteArtist => " Add a favorite artist ",
        InputPurpose::Country => " Your country ",
    };

    let popup_area = centered_popup(frame.area(), 48, 3);
    frame.render_widget(Clear, popup_area);

    let text = format!("{}▏", buffer);
    let input = Paragraph::new(text)
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.accent))
                .title(title)
                .title_bottom(Line::from(" Enter: save  Esc: cancel ").right_aligned())
                .style(Style::default().bg(colors.bg)),
        );
    frame.render_widget(input, popup_area);
}

fn render_add_to_playlist(
    frame: &mut Frame,
    ctx: &RenderContext,
    track_title: &str,
    selected: usize,
    colors: &Palette,
) {
    let area = frame.area();
    let entry_count = ctx.playlists.len() + 1;
    let popup_area = centered_popup(area, 46, entry_count as u16 + 4);

    frame.render_widget(Clear, popup_area);

    let mut items: Vec<ListItem> = ctx
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let style = if i == selected {
                Style::default().fg(colors.bg).bg(colors.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(format!("{} ({})", playlist.name, playlist.tracks.len())).style(style)
        })
        .collect();

    let new_style = if selected == ctx.playlists.len() {
        Style::default().fg(colors.bg).bg(colors.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.accent)
    };
    items.push(ListItem::new("+ New playlist...").style(new_style));

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent))
            .title(format!(" Add \"{}\" to... ", track_title))
            .title_bottom(Line::from(" ↑↓ Enter Esc ").right_aligned())
            .style(Style::default().bg(colors.bg)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(selected));
    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

fn render_help_popup(frame: &mut Frame, colors: &Palette) {
    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("Enter", "Select / Play"),
        ("F", "Full-screen player"),
        ("Esc", "Back / dismiss"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous / restart"),
        ("← / →", "Seek 10s (full player)"),
        ("", ""),
        ("", "── Library ──"),
        ("A", "Quick add to default playlist"),
        ("Shift+A", "Add to a playlist..."),
        ("C", "Create playlist"),
        ("R / D / S", "Rename / delete / set default"),
        ("", ""),
        ("", "── General ──"),
        ("M", "Mood playlist (recommendations)"),
        ("G", "Refresh recommendations"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered_popup(frame.area(), 58, keybindings.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>16}", key),
                        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(colors.text)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(colors.bg)),
        )
        .style(Style::default().bg(colors.bg));

    frame.render_widget(help_text, popup_area);
}
