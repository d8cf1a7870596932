//! Account secret entry screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use zeroize::Zeroizing;

use crate::presentation::widgets::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretState {
    Input,
    Validating,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretAction {
    None,
    Submit,
    ForgetStored,
    Quit,
}

/// Prompts for the account secret when none was configured.
pub struct SecretScreen {
    secret_input: TextInput,
    state: SecretState,
    error_message: Option<String>,
    notice: Option<String>,
    persist_secret: bool,
}

impl SecretScreen {
    /// Creates new secret screen.
    #[must_use]
    pub fn new() -> Self {
        let mut secret_input = TextInput::new(" Account Secret ")
            .password()
            .placeholder("s... family seed");
        secret_input.set_focused(true);

        Self {
            secret_input,
            state: SecretState::Input,
            error_message: None,
            notice: None,
            persist_secret: true,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SecretState {
        self.state
    }

    /// Moves the entered secret out of the input.
    pub fn take_secret(&mut self) -> Option<Zeroizing<String>> {
        if self.secret_input.is_empty() {
            None
        } else {
            Some(self.secret_input.take_value())
        }
    }

    #[must_use]
    pub const fn should_persist(&self) -> bool {
        self.persist_secret
    }

    pub fn set_validating(&mut self) {
        self.state = SecretState::Validating;
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state = SecretState::Error;
        self.error_message = Some(message.into());
    }

    /// Shows an informational line under the input.
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn reset(&mut self) {
        self.state = SecretState::Input;
        self.error_message = None;
    }

    /// Inserts pasted text.
    pub fn paste(&mut self, text: &str) {
        if self.state == SecretState::Input {
            self.secret_input.input_str(text.trim());
        }
    }

    /// Handles key event, returns action.
    pub fn handle_key(&mut self, key: KeyEvent) -> SecretAction {
        if self.state == SecretState::Validating {
            return SecretAction::None;
        }

        if key.code == KeyCode::Esc {
            return SecretAction::Quit;
        }

        if self.state == SecretState::Error {
            self.reset();
            return SecretAction::None;
        }

        match key.code {
            KeyCode::Enter => {
                if !self.secret_input.is_empty() {
                    return SecretAction::Submit;
                }
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::ALT) => {
                return SecretAction::ForgetStored;
            }
            KeyCode::Char(c) => self.secret_input.input_char(c),
            KeyCode::Backspace => self.secret_input.backspace(),
            KeyCode::Delete => self.secret_input.delete(),
            KeyCode::Left => self.secret_input.move_left(),
            KeyCode::Right => self.secret_input.move_right(),
            KeyCode::Home => self.secret_input.move_start(),
            KeyCode::End => self.secret_input.move_end(),
            KeyCode::Tab => self.persist_secret = !self.persist_secret,
            _ => {}
        }

        SecretAction::None
    }

    fn render_inner(&self, area: Rect, buf: &mut Buffer) {
        let vertical = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ]);
        let [_, center, _] = vertical.areas(area);

        let horizontal = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Min(56),
            Constraint::Fill(1),
        ]);
        let [_, content_area, _] = horizontal.areas(center);

        Clear.render(content_area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" XRPL IoT Remote ");

        let inner = block.inner(content_area);
        block.render(content_area, buf);

        let areas = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas::<7>(inner);

        Paragraph::new("Enter the secret of the sending account")
            .style(Style::default().fg(Color::White))
            .render(areas[0], buf);

        (&self.secret_input).render(areas[2], buf);

        let checkbox = if self.persist_secret { "[x]" } else { "[ ]" };
        Paragraph::new(Line::from(vec![
            Span::styled(checkbox, Style::default().fg(Color::Yellow)),
            Span::raw(" Remember in keyring (Tab to toggle)"),
        ]))
        .render(areas[4], buf);

        let status = match self.state {
            SecretState::Input => self.notice.as_deref().map_or_else(
                || {
                    Line::from(vec![
                        Span::styled("Enter: Continue", Style::default().fg(Color::DarkGray)),
                        Span::raw(" | "),
                        Span::styled("Esc: Quit", Style::default().fg(Color::DarkGray)),
                        Span::raw(" | "),
                        Span::styled("Alt+D: Forget Saved", Style::default().fg(Color::DarkGray)),
                    ])
                },
                |notice| Line::from(Span::styled(notice, Style::default().fg(Color::Green))),
            ),
            SecretState::Validating => Line::from(Span::styled(
                "Deriving keys...",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )),
            SecretState::Error => {
                let msg = self.error_message.as_deref().unwrap_or("Unknown error");
                Line::from(Span::styled(
                    format!("Error: {msg}"),
                    Style::default().fg(Color::Red),
                ))
            }
        };
        Paragraph::new(status).render(areas[6], buf);
    }
}

impl Default for SecretScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &SecretScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_inner(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_state() {
        let mut screen = SecretScreen::new();
        assert_eq!(screen.state(), SecretState::Input);
        assert!(screen.take_secret().is_none());
        assert!(screen.should_persist());
    }

    #[test]
    fn test_typing_and_take() {
        let mut screen = SecretScreen::new();
        for c in "snoP".chars() {
            screen.handle_key(key(KeyCode::Char(c)));
        }

        assert_eq!(screen.take_secret().as_deref().map(String::as_str), Some("snoP"));
        assert!(screen.take_secret().is_none());
    }

    #[test]
    fn test_toggle_persist() {
        let mut screen = SecretScreen::new();
        screen.handle_key(key(KeyCode::Tab));
        assert!(!screen.should_persist());
    }

    #[test]
    fn test_submit_requires_input() {
        let mut screen = SecretScreen::new();
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), SecretAction::None);

        screen.paste(" snoPBrXtMeMyMHUVTgbuqAfg1SUTb\n");
        assert_eq!(screen.handle_key(key(KeyCode::Enter)), SecretAction::Submit);
    }

    #[test]
    fn test_error_is_cleared_by_next_key() {
        let mut screen = SecretScreen::new();
        screen.set_error("invalid account secret");

        assert_eq!(screen.handle_key(key(KeyCode::Char('x'))), SecretAction::None);
        assert_eq!(screen.state(), SecretState::Input);
    }

    #[test]
    fn test_forget_and_quit_actions() {
        let mut screen = SecretScreen::new();
        let forget = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::ALT);

        assert_eq!(screen.handle_key(forget), SecretAction::ForgetStored);
        assert_eq!(screen.handle_key(key(KeyCode::Esc)), SecretAction::Quit);
    }
}
