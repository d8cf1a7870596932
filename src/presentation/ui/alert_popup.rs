use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{Alert, AlertLevel};
use crate::presentation::ui::utils::centered_fixed;

const MAX_WIDTH: u16 = 64;
const MAX_HEIGHT: u16 = 12;

/// Modal alert drawn over the control screen.
pub struct AlertPopup<'a> {
    alert: &'a Alert,
}

impl<'a> AlertPopup<'a> {
    #[must_use]
    pub const fn new(alert: &'a Alert) -> Self {
        Self { alert }
    }

    const fn color(&self) -> Color {
        match self.alert.level {
            AlertLevel::Info => Color::Cyan,
            AlertLevel::Success => Color::Green,
            AlertLevel::Error => Color::Red,
        }
    }
}

impl Widget for AlertPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" {} ", self.alert.title);
        let message = &self.alert.message;

        let width = u16::try_from(message.width())
            .unwrap_or(u16::MAX)
            .max(u16::try_from(title.width()).unwrap_or(0))
            .saturating_add(4)
            .clamp(24, MAX_WIDTH)
            .min(area.width);

        let inner_width = width.saturating_sub(4).max(1);
        let content_width = u16::try_from(message.width()).unwrap_or(0);
        let lines = content_width.div_ceil(inner_width).max(1);
        let height = lines.saturating_add(4).min(MAX_HEIGHT);

        let popup_area = centered_fixed(width, height, area);
        if popup_area.area() == 0 {
            return;
        }

        let color = self.color();
        Clear.render(popup_area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(" Enter to dismiss ").alignment(Alignment::Right));

        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        Paragraph::new(message.as_str())
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .render(
                Rect {
                    x: inner.x + 1,
                    y: inner.y + 1,
                    width: inner.width.saturating_sub(2),
                    height: inner.height.saturating_sub(1),
                },
                buf,
            );
    }
}
