use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const DOTS: [&str; 4] = [".", "..", "...", "   "];

/// Transient "waiting for a reply" line shown while a request is outstanding
#[derive(Debug, Clone, Default)]
pub struct WaitingIndicator {
    frame: usize,
}

impl WaitingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the dot animation by one step
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % DOTS.len();
    }

    pub fn dots(&self) -> &'static str {
        DOTS[self.frame]
    }
}

impl Widget for &WaitingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let indicator = Line::from(vec![
            Span::styled("🤖 ", Style::default().fg(Color::Green)),
            Span::styled("Waiting for a reply", Style::default().fg(Color::Green)),
            Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &indicator, area.width);
    }
}
