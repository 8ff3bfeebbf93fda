//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, Dialog, InputPurpose, View};

use super::AppController;

const SEEK_STEP_SECS: f64 = 10.0;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // A visible notice blocks everything else until dismissed
        if model.has_notice().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_notice().await;
            }
            return Ok(());
        }

        if model.is_help_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help().await;
            }
            return Ok(());
        }

        if let Some(dialog) = model.current_dialog().await {
            drop(model);
            return self.handle_dialog_key(dialog, key).await;
        }

        let ui_state = model.get_ui_state().await;

        if ui_state.view == View::Player {
            drop(model);
            return self.handle_player_key(key).await;
        }

        // Typing into the search bar
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    model.cycle_section_forward().await;
                    return Ok(());
                }
                KeyCode::BackTab => {
                    model.cycle_section_backward().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.clone();
                    drop(model);
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.clear_search().await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }

        // Global keys outside text entry
        match key.code {
            KeyCode::Tab => {
                model.cycle_section_forward().await;
                return Ok(());
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
                return Ok(());
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
                return Ok(());
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help().await;
                return Ok(());
            }
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_play().await;
                return Ok(());
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.play_next().await;
                return Ok(());
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.play_prev().await;
                return Ok(());
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                let has_track = model.current_track().await.is_some();
                drop(model);
                if has_track {
                    self.switch_view(View::Player).await;
                }
                return Ok(());
            }
            KeyCode::Up => {
                model.move_selection_up().await;
                return Ok(());
            }
            KeyCode::Down => {
                model.move_selection_down().await;
                return Ok(());
            }
            _ => {}
        }

        match ui_state.active_section {
            ActiveSection::Navigation => {
                if key.code == KeyCode::Enter {
                    let target = ui_state
                        .nav_items
                        .get(ui_state.nav_selected)
                        .map(|item| item.view.clone());
                    drop(model);
                    if let Some(view) = target {
                        self.switch_view(view).await;
                    }
                }
            }
            ActiveSection::Playlists => match key.code {
                KeyCode::Enter => {
                    let selected = model.selected_playlist().await;
                    drop(model);
                    if let Some(playlist) = selected {
                        self.switch_view(View::Playlist { id: playlist.id }).await;
                        let model = self.model.lock().await;
                        model.set_active_section(ActiveSection::MainContent).await;
                    }
                }
                KeyCode::Char('c') | KeyCode::Char('C') => {
                    model
                        .open_dialog(Dialog::Input {
                            purpose: InputPurpose::CreatePlaylist { track: None },
                            buffer: String::new(),
                        })
                        .await;
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    if let Some(playlist) = model.selected_playlist().await {
                        model
                            .open_dialog(Dialog::Input {
                                purpose: InputPurpose::RenamePlaylist { id: playlist.id },
                                buffer: playlist.name,
                            })
                            .await;
                    }
                }
                KeyCode::Char('d') | KeyCode::Char('D') => {
                    let selected = model.selected_playlist().await;
                    drop(model);
                    if let Some(playlist) = selected {
                        self.delete_playlist(&playlist.id).await;
                    }
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    let selected = model.selected_playlist().await;
                    drop(model);
                    if let Some(playlist) = selected {
                        self.set_default_playlist(&playlist.id).await;
                    }
                }
                _ => {}
            },
            ActiveSection::MainContent => {
                drop(model);
                self.handle_content_key(ui_state.view, key).await;
            }
            ActiveSection::Search => {}
        }

        Ok(())
    }

    async fn handle_content_key(&self, view: View, key: KeyEvent) {
        match view {
            View::Discover | View::Search | View::Playlist { .. } => match key.code {
                KeyCode::Enter => {
                    let selected = {
                        let model = self.model.lock().await;
                        model.selected_track().await
                    };
                    if let Some((track, from_playlist)) = selected {
                        self.play_selected(track, from_playlist).await;
                    }
                }
                KeyCode::Char('a') => {
                    let selected = {
                        let model = self.model.lock().await;
                        model.selected_track().await
                    };
                    if let Some((track, _)) = selected {
                        self.quick_add(track).await;
                    }
                }
                KeyCode::Char('A') => {
                    let model = self.model.lock().await;
                    if let Some((track, _)) = model.selected_track().await {
                        model
                            .open_dialog(Dialog::AddToPlaylist { track, selected: 0 })
                            .await;
                    }
                }
                _ => {}
            },
            View::Recommendations => match key.code {
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    let model = self.model.lock().await;
                    model
                        .open_dialog(Dialog::Input {
                            purpose: InputPurpose::Mood,
                            buffer: String::new(),
                        })
                        .await;
                }
                KeyCode::Char('g') | KeyCode::Char('G') => {
                    self.refresh_recommendations().await;
                }
                KeyCode::Enter => {
                    // Turn a suggested title into a real search
                    let song = {
                        let model = self.model.lock().await;
                        let state = model.get_ui_state().await;
                        model
                            .get_content_state()
                            .await
                            .mood_playlist
                            .get(state.content_selected)
                            .cloned()
                    };
                    if let Some(song) = song {
                        self.perform_search(&song).await;
                    }
                }
                _ => {}
            },
            View::Admin => {
                if matches!(key.code, KeyCode::Char('d') | KeyCode::Char('D')) {
                    let email = {
                        let model = self.model.lock().await;
                        let state = model.get_ui_state().await;
                        model
                            .get_content_state()
                            .await
                            .users
                            .get(state.content_selected)
                            .map(|u| u.email.clone())
                    };
                    if let Some(email) = email {
                        self.admin_delete_user(&email).await;
                    }
                }
            }
            View::Settings => {
                if key.code == KeyCode::Enter {
                    self.activate_settings_row().await;
                } else if key.code == KeyCode::Char('x') {
                    let on_favorites = {
                        let model = self.model.lock().await;
                        model.get_ui_state().await.settings_selected == 1
                    };
                    if on_favorites {
                        self.remove_last_favorite_artist().await;
                    }
                }
            }
            View::Player => {}
        }
    }

    async fn activate_settings_row(&self) {
        let row = {
            let model = self.model.lock().await;
            model.get_ui_state().await.settings_selected
        };
        match row {
            0 => {
                let model = self.model.lock().await;
                model
                    .open_dialog(Dialog::Input {
                        purpose: InputPurpose::Country,
                        buffer: String::new(),
                    })
                    .await;
            }
            1 => {
                let model = self.model.lock().await;
                model
                    .open_dialog(Dialog::Input {
                        purpose: InputPurpose::FavoriteArtist,
                        buffer: String::new(),
                    })
                    .await;
            }
            2 => self.cycle_default_playlist().await,
            3 => self.toggle_theme().await,
            4 => self.sign_out().await,
            _ => {}
        }
    }

    /// Step the default playlist through the library in creation order.
    async fn cycle_default_playlist(&self) {
        let next_id = {
            let model = self.model.lock().await;
            let playlists = model.playlists().await;
            if playlists.is_empty() {
                drop(model);
                self.notify_info("Create a playlist first.".to_string()).await;
                return;
            }
            let current = model.default_playlist_id().await;
            let index = current
                .and_then(|id| playlists.iter().position(|p| p.id == id))
                .map(|i| (i + 1) % playlists.len())
                .unwrap_or(0);
            playlists[index].id.clone()
        };
        self.set_default_playlist(&next_id).await;
    }

    async fn handle_player_key(&self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('F') => {
                self.switch_view(View::Discover).await;
            }
            KeyCode::Char(' ') => self.toggle_play().await,
            KeyCode::Char('n') | KeyCode::Char('N') => self.play_next().await,
            KeyCode::Char('p') | KeyCode::Char('P') => self.play_prev().await,
            KeyCode::Left => {
                let progress = {
                    let model = self.model.lock().await;
                    model.playback_state().await.progress
                };
                self.seek(progress - SEEK_STEP_SECS).await;
            }
            KeyCode::Right => {
                let progress = {
                    let model = self.model.lock().await;
                    model.playback_state().await.progress
                };
                self.seek(progress + SEEK_STEP_SECS).await;
            }
            KeyCode::Char('a') => {
                let track = {
                    let model = self.model.lock().await;
                    model.current_track().await
                };
                if let Some(track) = track {
                    self.quick_add(track).await;
                }
            }
            KeyCode::Char('A') => {
                let model = self.model.lock().await;
                if let Some(track) = model.current_track().await {
                    model
                        .open_dialog(Dialog::AddToPlaylist { track, selected: 0 })
                        .await;
                }
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                let model = self.model.lock().await;
                model.set_should_quit(true).await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_dialog_key(&self, dialog: Dialog, key: KeyEvent) -> Result<()> {
        match dialog {
            Dialog::Input { purpose, mut buffer } => match key.code {
                KeyCode::Esc => {
                    let model = self.model.lock().await;
                    model.close_dialog().await;
                }
                KeyCode::Enter => {
                    {
                        let model = self.model.lock().await;
                        model.close_dialog().await;
                    }
                    self.commit_input(purpose, buffer.trim()).await;
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    let model = self.model.lock().await;
                    model.open_dialog(Dialog::Input { purpose, buffer }).await;
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    let model = self.model.lock().await;
                    model.open_dialog(Dialog::Input { purpose, buffer }).await;
                }
                _ => {}
            },
            Dialog::AddToPlaylist { track, selected } => {
                let playlist_count = {
                    let model = self.model.lock().await;
                    model.playlists().await.len()
                };
                match key.code {
                    KeyCode::Esc => {
                        let model = self.model.lock().await;
                        model.close_dialog().await;
                    }
                    KeyCode::Up => {
                        let model = self.model.lock().await;
                        model
                            .open_dialog(Dialog::AddToPlaylist {
                                track,
                                selected: selected.saturating_sub(1),
                            })
                            .await;
                    }
                    KeyCode::Down => {
                        // The entry one past the playlists is "new playlist"
                        let model = self.model.lock().await;
                        model
                            .open_dialog(Dialog::AddToPlaylist {
                                track,
                                selected: (selected + 1).min(playlist_count),
                            })
                            .await;
                    }
                    KeyCode::Enter => {
                        {
                            let model = self.model.lock().await;
                            model.close_dialog().await;
                        }
                        if selected < playlist_count {
                            let playlist_id = {
                                let model = self.model.lock().await;
                                model.playlists().await.get(selected).map(|p| p.id.clone())
                            };
                            if let Some(id) = playlist_id {
                                self.add_track_to_playlist(&id, track).await;
                            }
                        } else {
                            let model = self.model.lock().await;
                            model
                                .open_dialog(Dialog::Input {
                                    purpose: InputPurpose::CreatePlaylist { track: Some(track) },
                                    buffer: String::new(),
                                })
                                .await;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    async fn commit_input(&self, purpose: InputPurpose, value: &str) {
        if value.is_empty() {
            return;
        }
        match purpose {
            InputPurpose::CreatePlaylist { track } => {
                let tracks = track.map(|t| vec![t]).unwrap_or_default();
                self.create_playlist(value, tracks).await;
            }
            InputPurpose::RenamePlaylist { id } => {
                self.rename_playlist(&id, value).await;
            }
            InputPurpose::Mood => {
                self.request_mood_playlist(value).await;
            }
            InputPurpose::FavoriteArtist => {
                self.add_favorite_artist(value).await;
            }
            InputPurpose::Country => {
                self.set_country(value).await;
            }
        }
    }
}
