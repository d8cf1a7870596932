//! Activity spinner widget.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Braille spinner advanced once per animation tick.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    #[must_use]
    pub const fn new() -> Self {
        Self { frame: 0 }
    }

    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        FRAMES[self.frame]
    }

    /// Returns a widget drawing the spinner followed by `label`.
    #[must_use]
    pub fn with_label<'a>(&'a self, label: &'a str) -> SpinnerLine<'a> {
        SpinnerLine {
            spinner: self,
            label,
        }
    }
}

pub struct SpinnerLine<'a> {
    spinner: &'a Spinner,
    label: &'a str,
}

impl Widget for SpinnerLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(
                self.spinner.symbol(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(self.label, Style::default().fg(Color::Yellow)),
        ]);

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_cycles() {
        let mut spinner = Spinner::new();
        let first = spinner.symbol();

        for _ in 0..FRAMES.len() {
            spinner.tick();
        }
        assert_eq!(spinner.symbol(), first);

        spinner.tick();
        assert_ne!(spinner.symbol(), first);
    }
}
