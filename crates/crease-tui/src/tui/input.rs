// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState changes (tab switching, row selection,
// search, form editing). Focus is resolved in order: quit confirmation,
// sign-in screen, overlay, search box, then the active tab.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crease_app::protocol::{Mode, Notice, TabId, UserCommand};
use crease_cricket::filter::{total_pages, LEADERBOARD_PAGE_SIZE};
use crease_cricket::forms::{validate_sign_in, validate_sign_up, PlayerField};

use super::{AuthField, Overlay, PlayerFormState, Screen, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop, `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release for each keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of focus.
    if is_ctrl(&key_event, 'c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.screen == Screen::SignIn {
        return handle_sign_in(key_event, view_state);
    }

    if view_state.overlay.is_some() {
        return handle_overlay(key_event, view_state);
    }

    if view_state.filter_mode {
        return handle_filter_mode(key_event, view_state);
    }

    handle_main(key_event, view_state)
}

fn is_ctrl(key_event: &KeyEvent, c: char) -> bool {
    key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char(c)
}

/// Only y/q confirm and n/Esc cancel; everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Sign-in screen
// ---------------------------------------------------------------------------

fn handle_sign_in(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let form = &mut view_state.auth;

    if is_ctrl(&key_event, 'r') {
        form.sign_up = !form.sign_up;
        form.errors = Default::default();
        return None;
    }

    match key_event.code {
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = match form.focus {
                AuthField::Username => AuthField::Password,
                AuthField::Password => AuthField::Username,
            };
            None
        }
        KeyCode::Enter => {
            if form.submitting {
                return None;
            }
            let username = form.username.trim().to_string();
            let checked = if form.sign_up {
                validate_sign_up(&username, &form.password)
            } else {
                validate_sign_in(&username, &form.password)
            };
            if let Err(errors) = checked {
                form.errors = errors;
                return None;
            }
            form.errors = Default::default();
            form.submitting = true;
            let password = form.password.clone();
            Some(if form.sign_up {
                UserCommand::SignUp { username, password }
            } else {
                UserCommand::SignIn { username, password }
            })
        }
        KeyCode::Backspace => {
            match form.focus {
                AuthField::Username => form.username.pop(),
                AuthField::Password => form.password.pop(),
            };
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            match form.focus {
                AuthField::Username => {
                    form.username.push(c);
                    form.errors.username = None;
                }
                AuthField::Password => {
                    form.password.push(c);
                    form.errors.password = None;
                }
            }
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_overlay(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match view_state.overlay.as_mut()? {
        Overlay::PlayerDetail(_) => {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('v')
            ) {
                view_state.overlay = None;
            }
            None
        }
        Overlay::ConfirmDelete { id, .. } => match key_event.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let id = id.clone();
                view_state.overlay = None;
                Some(UserCommand::DeletePlayer(id))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                view_state.overlay = None;
                None
            }
            _ => None,
        },
        Overlay::PlayerForm(form) => {
            if key_event.code == KeyCode::Esc {
                view_state.overlay = None;
                return None;
            }
            handle_player_form(key_event, form)
        }
    }
}

fn handle_player_form(key_event: KeyEvent, form: &mut PlayerFormState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            form.focus = form.focus.next();
            None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.focus = form.focus.prev();
            None
        }
        KeyCode::Enter => {
            if form.saving {
                return None;
            }
            match form.form.validate() {
                Ok(draft) => {
                    form.errors.clear();
                    form.saving = true;
                    Some(match &form.editing {
                        Some(id) => UserCommand::UpdatePlayer {
                            id: id.clone(),
                            draft,
                        },
                        None => UserCommand::CreatePlayer(draft),
                    })
                }
                Err(errors) => {
                    form.errors = errors;
                    None
                }
            }
        }
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
            if form.focus == PlayerField::Category =>
        {
            form.form.cycle_category();
            clear_field_error(form);
            None
        }
        KeyCode::Backspace if form.focus != PlayerField::Category => {
            form.form.pop_char(form.focus);
            clear_field_error(form);
            None
        }
        KeyCode::Char(c) if form.focus != PlayerField::Category => {
            form.form.push_char(form.focus, c);
            clear_field_error(form);
            None
        }
        _ => None,
    }
}

fn clear_field_error(form: &mut PlayerFormState) {
    let focus = form.focus;
    form.errors.retain(|(field, _)| *field != focus);
}

// ---------------------------------------------------------------------------
// Search box
// ---------------------------------------------------------------------------

/// Esc clears and leaves, Enter keeps the text and leaves.
fn handle_filter_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let tab = view_state.active_tab;
    match key_event.code {
        KeyCode::Esc => {
            view_state.filter_mode = false;
            view_state.search.remove(&tab);
        }
        KeyCode::Enter => {
            view_state.filter_mode = false;
        }
        KeyCode::Backspace => {
            if let Some(text) = view_state.search.get_mut(&tab) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            view_state.search.entry(tab).or_default().push(c);
        }
        _ => return None,
    }
    reset_position(view_state, tab);
    None
}

/// Back to the first row and page after the rows change.
fn reset_position(view_state: &mut ViewState, tab: TabId) {
    view_state.selected.insert(tab, 0);
    if tab == TabId::Leaderboard {
        view_state.leaderboard_page = 0;
    }
}

fn is_searchable(tab: TabId) -> bool {
    tab != TabId::Summary
}

// ---------------------------------------------------------------------------
// Main screen
// ---------------------------------------------------------------------------

fn handle_main(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let tab = view_state.active_tab;
    match key_event.code {
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            let target = *view_state.mode.tabs().get(index)?;
            view_state.active_tab = target;
            view_state.filter_mode = false;
            Some(UserCommand::SwitchTab(target))
        }

        KeyCode::Up | KeyCode::Char('k') => {
            move_selection(view_state, -1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_selection(view_state, 1);
            None
        }

        KeyCode::Char('[') if tab == TabId::Leaderboard => {
            view_state.leaderboard_page = view_state.leaderboard_page.saturating_sub(1);
            None
        }
        KeyCode::Char(']') if tab == TabId::Leaderboard => {
            let last = total_pages(view_state.visible_leaderboard().len(), LEADERBOARD_PAGE_SIZE) - 1;
            view_state.leaderboard_page = (view_state.leaderboard_page + 1).min(last);
            None
        }

        KeyCode::Char('/') => {
            if is_searchable(tab) {
                view_state.filter_mode = true;
            }
            None
        }
        KeyCode::Esc => {
            view_state.search.remove(&tab);
            if matches!(tab, TabId::Players | TabId::Roster) {
                view_state.category_filter = Default::default();
            }
            reset_position(view_state, tab);
            None
        }
        KeyCode::Char('c') if matches!(tab, TabId::Players | TabId::Roster) => {
            view_state.category_filter = view_state.category_filter.next();
            reset_position(view_state, tab);
            None
        }

        KeyCode::Char('r') => Some(UserCommand::Refresh(tab)),
        KeyCode::Char('L') => Some(UserCommand::SignOut),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Char('v') => view_selected(view_state),

        _ => match view_state.mode {
            Mode::Portal => handle_portal_key(key_event, view_state),
            Mode::Admin => handle_admin_key(key_event, view_state),
        },
    }
}

fn move_selection(view_state: &mut ViewState, delta: isize) {
    let tab = view_state.active_tab;
    let count = view_state.row_count(tab);
    if count == 0 {
        return;
    }
    let current = view_state.selected_index(tab);
    let next = current.saturating_add_signed(delta).min(count - 1);
    view_state.selected.insert(tab, next);
}

/// Open the detail overlay at once and ask the app for a fresh copy.
fn view_selected(view_state: &mut ViewState) -> Option<UserCommand> {
    let player = match view_state.active_tab {
        TabId::MyTeam => view_state.selected_member().map(|m| m.player.clone()),
        TabId::Players | TabId::Roster => view_state.selected_player().cloned(),
        TabId::Leaderboard | TabId::Summary => None,
    }?;
    let id = player.id.clone();
    view_state.overlay = Some(Overlay::PlayerDetail(Box::new(player)));
    Some(UserCommand::ViewPlayer(id))
}

fn handle_portal_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let target = match (key_event.code, view_state.active_tab) {
        (KeyCode::Char('a'), TabId::Players) => {
            view_state.selected_player().map(|p| (p.id.clone(), true))
        }
        (KeyCode::Char('d'), TabId::Players) => view_state
            .selected_player()
            .filter(|p| view_state.in_team(&p.id))
            .map(|p| (p.id.clone(), false)),
        (KeyCode::Char('d'), TabId::MyTeam) => {
            view_state.selected_member().map(|m| (m.id().clone(), false))
        }
        _ => None,
    };
    let (id, add) = target?;

    // One request per player at a time.
    if !view_state.pending.insert(id.clone()) {
        return None;
    }
    Some(if add {
        UserCommand::AddToTeam(id)
    } else {
        UserCommand::RemoveFromTeam(id)
    })
}

fn handle_admin_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.active_tab != TabId::Roster {
        return None;
    }
    match key_event.code {
        KeyCode::Char('n') => {
            view_state.overlay = Some(Overlay::PlayerForm(Box::new(PlayerFormState::create())));
        }
        KeyCode::Char('e') => {
            let player = view_state.selected_player()?;
            if player.is_editable() {
                let form = PlayerFormState::edit(player);
                view_state.overlay = Some(Overlay::PlayerForm(Box::new(form)));
            } else {
                let msg = format!("{} is not a new player and cannot be edited", player.name);
                view_state.notice = Some(Notice::error(msg));
            }
        }
        KeyCode::Char('x') => {
            let player = view_state.selected_player()?;
            if player.is_editable() {
                let (id, name) = (player.id.clone(), player.name.clone());
                view_state.overlay = Some(Overlay::ConfirmDelete { id, name });
            } else {
                let msg = format!("{} is not a new player and cannot be deleted", player.name);
                view_state.notice = Some(Notice::error(msg));
            }
        }
        _ => {}
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
