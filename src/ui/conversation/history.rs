//! Conversation history display component

use crate::session::{Sender, Turn};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Scrollable, bottom-anchored view of the conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    /// Lines scrolled up from the bottom
    scroll: usize,
    /// Turn count at the last render, used to snap back on new turns
    seen_turns: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Render the turns into `area`
    pub fn render(&mut self, turns: &[Turn], area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 ChatGPT-3.5 Chatbot");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if turns.len() != self.seen_turns {
            self.seen_turns = turns.len();
            self.scroll_to_bottom();
        }

        if turns.is_empty() {
            let welcome_lines = [
                Line::from(vec![Span::styled("Ask me anything.", Style::default().fg(Color::Green))]),
                Line::from(vec![Span::raw("")]),
                Line::from(vec![Span::styled(
                    "Enter or click Send to submit. Esc quits.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for turn in turns {
            all_lines.extend(render_turn(turn, inner_area.width));
            all_lines.push(Line::from(vec![Span::raw("")]));
        }
        // No spacer after the last turn
        all_lines.pop();

        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_scroll = total.saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);

        let start = max_scroll - self.scroll;
        for (i, line) in all_lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if max_scroll > 0 {
            let mut state = ScrollbarState::new(max_scroll).position(start);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut state);
        }
    }
}

/// Render a single turn into lines
fn render_turn(turn: &Turn, width: u16) -> Vec<Line<'static>> {
    let style = content_style(turn.sender);
    let header = format!(
        "{} {} {}",
        turn.sender.display_name(),
        turn.timestamp.format("%H:%M:%S"),
        "─".repeat(20)
    );

    let mut lines = vec![Line::from(vec![Span::styled(
        header,
        style.add_modifier(Modifier::BOLD),
    )])];

    for content_line in wrap_text(&turn.text, width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, style),
        ]));
    }

    lines
}

fn content_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Bot => Style::default().fg(Color::Green),
        Sender::SystemError => Style::default().fg(Color::Red),
    }
}

/// Wrap text to fit within the given number of terminal columns, keeping the
/// text's own line breaks. Wide characters such as Hangul count as two columns.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let needed = if current_width == 0 { word_width } else { current_width + 1 + word_width };

            if needed <= width {
                if current_width > 0 {
                    current_line.push(' ');
                }
                current_line.push_str(word);
                current_width = needed;
                continue;
            }

            if current_width > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }

            // Hard-split words longer than a whole line
            for c in word.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width > 0 && current_width + char_width > width {
                    lines.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
                current_line.push(c);
                current_width += char_width;
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
