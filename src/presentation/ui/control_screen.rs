//! Main screen with the command buttons.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::domain::{Command, ConnectionStatus, DispatchReceipt};
use crate::infrastructure::config::UiConfig;
use crate::presentation::ui::utils::short_address;
use crate::presentation::widgets::{Button, Spinner, StatusBar, StatusLevel};

const BUTTON_WIDTH: u16 = 20;
const BUTTON_HEIGHT: u16 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    None,
    Send(String),
    Quit,
}

struct ControlButton {
    label: String,
    command: String,
}

/// Two buttons, each sending one command.
pub struct ControlScreen {
    buttons: [ControlButton; 2],
    selected: usize,
    loading: bool,
    status: ConnectionStatus,
    last_hash: Option<String>,
    account: String,
    endpoint: String,
    spinner: Spinner,
    button_areas: [Rect; 2],
}

impl ControlScreen {
    #[must_use]
    pub fn new(ui: &UiConfig, account: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            buttons: [
                ControlButton {
                    label: ui.on_label.clone(),
                    command: Command::TURN_ON.to_string(),
                },
                ControlButton {
                    label: ui.off_label.clone(),
                    command: Command::TURN_OFF.to_string(),
                },
            ],
            selected: 0,
            loading: false,
            status: ConnectionStatus::Disconnected,
            last_hash: None,
            account: account.into(),
            endpoint: endpoint.into(),
            spinner: Spinner::new(),
            button_areas: [Rect::default(); 2],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub const fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Marks a dispatch as started; buttons stay disabled until it finishes.
    pub fn start_loading(&mut self) {
        self.loading = true;
        self.status = ConnectionStatus::Connecting;
    }

    pub fn finish_success(&mut self, receipt: &DispatchReceipt) {
        self.loading = false;
        self.status = ConnectionStatus::Disconnected;
        self.last_hash = Some(receipt.hash.short());
    }

    pub fn finish_error(&mut self) {
        self.loading = false;
        self.status = ConnectionStatus::Error;
    }

    /// Advances the spinner while a dispatch runs.
    pub fn tick(&mut self) {
        if self.loading {
            self.spinner.tick();
        }
    }

    fn press(&self, index: usize) -> ControlAction {
        if self.loading {
            return ControlAction::None;
        }
        self.buttons
            .get(index)
            .map_or(ControlAction::None, |b| ControlAction::Send(b.command.clone()))
    }

    /// Handles key event, returns action.
    pub fn handle_key(&mut self, key: KeyEvent) -> ControlAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => ControlAction::Quit,
            KeyCode::Left | KeyCode::Char('h') => {
                self.selected = 0;
                ControlAction::None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.selected = 1;
                ControlAction::None
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.selected = (self.selected + 1) % self.buttons.len();
                ControlAction::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.press(self.selected),
            KeyCode::Char('1') => {
                self.selected = 0;
                self.press(0)
            }
            KeyCode::Char('2') => {
                self.selected = 1;
                self.press(1)
            }
            _ => ControlAction::None,
        }
    }

    /// Handles a click on one of the buttons drawn last frame.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> ControlAction {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return ControlAction::None;
        }

        let position = Position::new(mouse.column, mouse.row);
        let Some(index) = self
            .button_areas
            .iter()
            .position(|area| area.contains(position))
        else {
            return ControlAction::None;
        };

        self.selected = index;
        self.press(index)
    }

    /// Draws the screen and remembers where the buttons landed.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let [main_area, status_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(
                " XRPL IoT Remote ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(main_area);
        block.render(main_area, buf);

        let [_, buttons_row, _, activity_row, hint_row, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(inner);

        let [on_area, off_area] = Layout::horizontal([
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Length(BUTTON_WIDTH),
        ])
        .flex(Flex::Center)
        .spacing(4)
        .areas(buttons_row);
        self.button_areas = [on_area, off_area];

        for (index, button) in self.buttons.iter().enumerate() {
            Button::new(&button.label)
                .selected(index == self.selected)
                .enabled(!self.loading)
                .render(self.button_areas[index], buf);
        }

        if self.loading {
            let [spinner_area] = Layout::horizontal([Constraint::Length(28)])
                .flex(Flex::Center)
                .areas(activity_row);
            self.spinner
                .with_label("Sending command...")
                .render(spinner_area, buf);
        } else if let Some(hash) = &self.last_hash {
            Paragraph::new(Line::from(vec![
                Span::styled("Last TX ", Style::default().fg(Color::DarkGray)),
                Span::styled(hash.as_str(), Style::default().fg(Color::Green)),
            ]))
            .centered()
            .render(activity_row, buf);
        }

        Paragraph::new(Span::styled(
            "←/→ select · Enter send · 1/2 shortcut · q quit",
            Style::default().fg(Color::DarkGray),
        ))
        .centered()
        .render(hint_row, buf);

        let level = match self.status {
            _ if self.loading => StatusLevel::Busy,
            ConnectionStatus::Error => StatusLevel::Error,
            _ if self.last_hash.is_some() => StatusLevel::Success,
            _ => StatusLevel::Info,
        };
        (&StatusBar::new()
            .left(format!(" {}", short_address(&self.account)))
            .center(self.status.label())
            .right(format!("{} ", self.endpoint))
            .level(level))
            .render(status_area, buf);
    }
}
