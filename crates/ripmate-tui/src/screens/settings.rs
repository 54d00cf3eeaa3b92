//! Settings screen — edit the server-persisted settings record.
//!
//! The screen is a thin shell around [`SettingsForm`] from `ripmate-core`:
//! it owns the focus bookkeeping and key handling, while the form owns the
//! edit buffers and talks to the collaborators. Load and submit run as
//! spawned tasks; the render loop picks up buffer changes on the next frame.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use ripmate_core::{FormState, SettingsForm};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

// ── Fields ───────────────────────────────────────────────────────────

/// Which form field has focus. The first seven belong to the general
/// group, the last one to the desktop group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    DownloadPath,
    MaxThreads,
    AutoStart,
    VLogin,
    VUsername,
    VPassword,
    VThanks,
    DesktopClipboard,
}

impl Field {
    /// All fields in tab order. Credential fields are skipped dynamically
    /// when site login is disabled.
    const ALL: [Field; 8] = [
        Self::DownloadPath,
        Self::MaxThreads,
        Self::AutoStart,
        Self::VLogin,
        Self::VUsername,
        Self::VPassword,
        Self::VThanks,
        Self::DesktopClipboard,
    ];

    fn visible_for(self, v_login: bool) -> bool {
        match self {
            Self::VUsername | Self::VPassword => v_login,
            _ => true,
        }
    }

    fn is_text(self) -> bool {
        matches!(
            self,
            Self::DownloadPath | Self::MaxThreads | Self::VUsername | Self::VPassword
        )
    }
}

// ── Component ────────────────────────────────────────────────────────

pub struct SettingsScreen {
    form: Arc<SettingsForm>,
    active_field: Field,
    show_password: bool,
}

impl SettingsScreen {
    pub fn new(form: Arc<SettingsForm>) -> Self {
        Self {
            form,
            active_field: Field::DownloadPath,
            show_password: false,
        }
    }

    // ── Field navigation ─────────────────────────────────────────────

    fn visible_fields(&self) -> Vec<Field> {
        let v_login = self.form.state().general.v_login;
        Field::ALL
            .iter()
            .copied()
            .filter(|f| f.visible_for(v_login))
            .collect()
    }

    fn focus_next(&mut self) {
        let fields = self.visible_fields();
        let pos = fields
            .iter()
            .position(|&f| f == self.active_field)
            .unwrap_or(0);
        self.active_field = fields[(pos + 1) % fields.len()];
    }

    fn focus_prev(&mut self) {
        let fields = self.visible_fields();
        let pos = fields
            .iter()
            .position(|&f| f == self.active_field)
            .unwrap_or(0);
        self.active_field = fields[(pos + fields.len() - 1) % fields.len()];
    }

    /// Ensure the active field is still visible after a login toggle.
    fn clamp_focus(&mut self) {
        let v_login = self.form.state().general.v_login;
        if !self.active_field.visible_for(v_login) {
            self.active_field = Field::VLogin;
        }
    }

    // ── Edits ────────────────────────────────────────────────────────

    fn edit_text(&self, f: impl FnOnce(&mut String)) {
        let field = self.active_field;
        self.form.edit(|state| {
            let buf = match field {
                Field::DownloadPath => &mut state.general.download_path,
                Field::MaxThreads => &mut state.general.max_threads,
                Field::VUsername => &mut state.general.v_username,
                Field::VPassword => &mut state.general.v_password,
                _ => return,
            };
            f(buf);
            state.general.dirty = true;
            state.general.touched = true;
        });
    }

    fn toggle_active(&mut self) {
        let field = self.active_field;
        self.form.edit(|state| {
            let general = &mut state.general;
            match field {
                Field::AutoStart => general.auto_start = !general.auto_start,
                Field::VLogin => general.v_login = !general.v_login,
                Field::VThanks => general.v_thanks = !general.v_thanks,
                Field::DesktopClipboard => {
                    state.desktop.desktop_clipboard = !state.desktop.desktop_clipboard;
                    state.desktop.dirty = true;
                    state.desktop.touched = true;
                    return;
                }
                _ => return,
            }
            general.dirty = true;
            general.touched = true;
        });
        self.clamp_focus();
    }

    // ── Async operations ─────────────────────────────────────────────

    fn spawn_load(&self) {
        let form = Arc::clone(&self.form);
        tokio::spawn(async move { form.load().await });
    }

    fn spawn_submit(&self) {
        let form = Arc::clone(&self.form);
        tokio::spawn(async move { form.submit().await });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_header(&self, frame: &mut Frame, area: Rect, state: &FormState) {
        let mut spans = vec![Span::styled(
            " Settings",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )];
        if state.is_dirty() {
            spans.push(Span::styled(
                "  \u{25CF} unsaved changes",
                Style::default().fg(theme::TEXT_DIM),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_input_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        label: &str,
        value: &str,
        active: bool,
        masked: bool,
    ) {
        if area.height < 3 {
            return;
        }

        let border_color = if active { theme::ACCENT } else { theme::BORDER };
        let block = Block::default()
            .title(Span::styled(
                format!(" {label} "),
                Style::default().fg(if active { theme::ACCENT } else { theme::TEXT_DIM }),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let display = if masked && !value.is_empty() {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        let text = if active {
            format!("{display}\u{2588}")
        } else {
            display
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::TEXT))),
            inner,
        );
    }

    #[allow(clippy::unused_self)]
    fn render_toggle(&self, frame: &mut Frame, area: Rect, label: &str, value: bool, active: bool) {
        if area.height < 1 {
            return;
        }
        let marker = if value { "[\u{2713}]" } else { "[ ]" };
        let marker_style = if active {
            Style::default().fg(theme::ACCENT)
        } else if value {
            Style::default().fg(theme::SUCCESS)
        } else {
            Style::default().fg(theme::BORDER)
        };
        let label_style = if active {
            Style::default().fg(theme::ACCENT)
        } else {
            Style::default().fg(theme::TEXT)
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("  {marker} "), marker_style),
                Span::styled(label, label_style),
            ])),
            area,
        );
    }

    #[allow(clippy::unused_self)]
    fn render_group_heading(&self, frame: &mut Frame, area: Rect, label: &str) {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {label}"),
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
            area,
        );
    }

    fn render_body(&self, frame: &mut Frame, area: Rect, state: &FormState) {
        let has_credentials = state.general.v_login;

        let mut constraints = vec![
            Constraint::Length(1), // "General" heading
            Constraint::Length(3), // download path
            Constraint::Length(3), // max threads
            Constraint::Length(1), // auto-start
            Constraint::Length(1), // site login
        ];
        if has_credentials {
            constraints.push(Constraint::Length(3)); // username
            constraints.push(Constraint::Length(3)); // password
        }
        constraints.push(Constraint::Length(1)); // send thanks
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // "Desktop" heading
        constraints.push(Constraint::Length(1)); // clipboard toggle
        constraints.push(Constraint::Min(0)); // spacer

        let fields_area = Rect::new(
            area.x + 1,
            area.y,
            area.width.saturating_sub(2),
            area.height,
        );
        let chunks = Layout::vertical(constraints).split(fields_area);

        let mut i = 0;
        self.render_group_heading(frame, chunks[i], "General");
        i += 1;

        self.render_input_field(
            frame,
            chunks[i],
            "Download folder",
            &state.general.download_path,
            self.active_field == Field::DownloadPath,
            false,
        );
        i += 1;

        self.render_input_field(
            frame,
            chunks[i],
            "Max download threads",
            &state.general.max_threads,
            self.active_field == Field::MaxThreads,
            false,
        );
        i += 1;

        self.render_toggle(
            frame,
            chunks[i],
            "Auto-start downloads",
            state.general.auto_start,
            self.active_field == Field::AutoStart,
        );
        i += 1;

        self.render_toggle(
            frame,
            chunks[i],
            "Log into forum site",
            state.general.v_login,
            self.active_field == Field::VLogin,
        );
        i += 1;

        if has_credentials {
            self.render_input_field(
                frame,
                chunks[i],
                "Username",
                &state.general.v_username,
                self.active_field == Field::VUsername,
                false,
            );
            i += 1;

            self.render_input_field(
                frame,
                chunks[i],
                "Password",
                &state.general.v_password,
                self.active_field == Field::VPassword,
                !self.show_password,
            );
            i += 1;
        }

        self.render_toggle(
            frame,
            chunks[i],
            "Send thanks on completion",
            state.general.v_thanks,
            self.active_field == Field::VThanks,
        );
        i += 2; // skip spacer

        self.render_group_heading(frame, chunks[i], "Desktop");
        i += 1;

        self.render_toggle(
            frame,
            chunks[i],
            "Watch clipboard for links",
            state.desktop.desktop_clipboard,
            self.active_field == Field::DesktopClipboard,
        );
    }

    fn render_key_hints(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.active_field == Field::VPassword {
            "Ctrl+U reveal  Tab next  Enter save  Ctrl+R reload  Esc quit"
        } else if self.active_field.is_text() {
            "Tab next  Shift+Tab prev  Enter save  Ctrl+O browse  Ctrl+R reload  Esc quit"
        } else {
            "Space toggle  Tab next  Enter save  Ctrl+R reload  Esc quit"
        };
        frame.render_widget(Paragraph::new(Span::styled(hints, theme::key_hint())), area);
    }
}

// ── Component impl ───────────────────────────────────────────────────

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('o') => self.form.browse(),
                KeyCode::Char('r') => self.spawn_load(),
                KeyCode::Char('u') => self.show_password = !self.show_password,
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Esc => return Ok(Some(Action::Quit)),
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_prev(),
            KeyCode::Enter => self.spawn_submit(),
            KeyCode::Char(' ') if !self.active_field.is_text() => self.toggle_active(),
            KeyCode::Backspace if self.active_field.is_text() => {
                self.edit_text(|buf| {
                    buf.pop();
                });
            }
            KeyCode::Char(c) if self.active_field.is_text() => {
                self.edit_text(move |buf| buf.push(c));
            }
            _ => {}
        }

        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        // A background reload can flip v_login off while a credential
        // field has focus.
        if matches!(action, Action::Tick) {
            self.clamp_focus();
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let state = self.form.state();

        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let layout = Layout::vertical([
            Constraint::Length(1), // header
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // body
            Constraint::Length(1), // hints
        ])
        .split(area);

        self.render_header(frame, layout[0], &state);
        self.render_body(frame, layout[2], &state);
        self.render_key_hints(frame, layout[3]);
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use ripmate_core::{
        ClipboardWatcher, DirectoryPicker, Error, Notifier, Settings, SettingsStore,
    };

    struct StubStore;

    #[async_trait]
    impl SettingsStore for StubStore {
        async fn load(&self) -> Result<Settings, Error> {
            Ok(Settings::default())
        }

        async fn save(&self, settings: &Settings) -> Result<Settings, Error> {
            Ok(settings.clone())
        }
    }

    struct StubPicker;

    impl DirectoryPicker for StubPicker {
        fn pick_folder(&self) -> Option<std::path::PathBuf> {
            None
        }
    }

    struct StubNotifier;

    impl Notifier for StubNotifier {
        fn show(&self, _message: &str, _duration: std::time::Duration) {}
    }

    struct StubClipboard;

    impl ClipboardWatcher for StubClipboard {
        fn reinitialize(&self, _settings: &Settings) {}
    }

    fn screen() -> SettingsScreen {
        let form = Arc::new(SettingsForm::new(
            Arc::new(StubStore),
            Arc::new(StubPicker),
            Arc::new(StubNotifier),
            Arc::new(StubClipboard),
        ));
        SettingsScreen::new(form)
    }

    fn press(screen: &mut SettingsScreen, code: KeyCode) {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    #[test]
    fn tab_skips_credential_fields_when_login_disabled() {
        let s = screen();
        assert_eq!(
            s.visible_fields(),
            vec![
                Field::DownloadPath,
                Field::MaxThreads,
                Field::AutoStart,
                Field::VLogin,
                Field::VThanks,
                Field::DesktopClipboard,
            ]
        );
    }

    #[test]
    fn toggling_login_reveals_credential_fields() {
        let mut s = screen();
        s.active_field = Field::VLogin;
        press(&mut s, KeyCode::Char(' '));

        assert!(s.visible_fields().contains(&Field::VUsername));
        assert!(s.visible_fields().contains(&Field::VPassword));
        assert!(s.form.state().general.v_login);
    }

    #[test]
    fn typing_marks_the_general_buffer_dirty() {
        let mut s = screen();
        s.active_field = Field::MaxThreads;
        press(&mut s, KeyCode::Char('8'));

        let state = s.form.state();
        assert_eq!(state.general.max_threads, "8");
        assert!(state.general.dirty);
        assert!(state.general.touched);
        assert!(!state.desktop.dirty);
    }

    #[test]
    fn toggling_clipboard_marks_the_desktop_buffer_dirty() {
        let mut s = screen();
        s.active_field = Field::DesktopClipboard;
        press(&mut s, KeyCode::Char(' '));

        let state = s.form.state();
        assert!(state.desktop.desktop_clipboard);
        assert!(state.desktop.dirty);
        assert!(!state.general.dirty);
    }

    #[test]
    fn focus_wraps_around_visible_fields() {
        let mut s = screen();
        s.active_field = Field::DesktopClipboard;
        press(&mut s, KeyCode::Tab);
        assert_eq!(s.active_field, Field::DownloadPath);

        press(&mut s, KeyCode::BackTab);
        assert_eq!(s.active_field, Field::DesktopClipboard);
    }

    #[test]
    fn reload_that_hides_credentials_clamps_focus_on_tick() {
        let mut s = screen();
        s.active_field = Field::VLogin;
        press(&mut s, KeyCode::Char(' ')); // enable login
        s.active_field = Field::VPassword;

        // A background reload resets the buffers with login disabled.
        s.form.edit(|state| state.general.v_login = false);
        s.update(&Action::Tick).unwrap();

        assert_eq!(s.active_field, Field::VLogin);
    }

    #[test]
    fn hiding_login_clamps_focus_off_credential_fields() {
        let mut s = screen();
        s.active_field = Field::VLogin;
        press(&mut s, KeyCode::Char(' ')); // enable login
        s.active_field = Field::VPassword;

        s.active_field = Field::VLogin;
        press(&mut s, KeyCode::Char(' ')); // disable again
        assert_eq!(s.active_field, Field::VLogin);
    }
}
