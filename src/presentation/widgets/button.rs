//! Push button widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Bordered button with a centered label.
#[derive(Debug, Clone)]
pub struct Button<'a> {
    label: &'a str,
    selected: bool,
    enabled: bool,
}

impl<'a> Button<'a> {
    #[must_use]
    pub const fn new(label: &'a str) -> Self {
        Self {
            label,
            selected: false,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn style(&self) -> Style {
        match (self.enabled, self.selected) {
            (false, _) => Style::default().fg(Color::DarkGray),
            (true, true) => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            (true, false) => Style::default().fg(Color::White),
        }
    }
}

impl Widget for Button<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_type = if self.selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(self.style());

        let inner = block.inner(area);
        block.render(area, buf);

        // Center the label vertically inside the border.
        let label_area = Rect {
            y: inner.y + inner.height.saturating_sub(1) / 2,
            height: inner.height.min(1),
            ..inner
        };

        Paragraph::new(self.label)
            .alignment(Alignment::Center)
            .style(self.style())
            .render(label_area, buf);
    }
}
