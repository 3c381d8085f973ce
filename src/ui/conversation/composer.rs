use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Result returned when the user interacts with the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerResult {
    Submitted,
    None,
}

/// Single-line input editing the session draft.
///
/// The draft itself lives in the session; the composer only tracks the cursor,
/// counted in characters rather than bytes.
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    cursor: usize,
    placeholder: String,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            placeholder: placeholder.into(),
        }
    }

    /// Handle key input against the draft
    pub fn handle_key(&mut self, key: KeyEvent, draft: &mut String) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        self.clamp_cursor(draft);
        let len = draft.chars().count();

        match key.code {
            KeyCode::Enter => return ComposerResult::Submitted,
            KeyCode::Char(c) => {
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    return ComposerResult::None;
                }
                let at = byte_index(draft, self.cursor);
                draft.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = byte_index(draft, self.cursor);
                    draft.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = byte_index(draft, self.cursor);
                    draft.remove(at);
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = len;
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Keep the cursor inside the draft after it changed elsewhere
    fn clamp_cursor(&mut self, draft: &str) {
        self.cursor = self.cursor.min(draft.chars().count());
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn widget<'a>(&'a self, draft: &'a str) -> ComposerWidget<'a> {
        ComposerWidget {
            composer: self,
            draft,
        }
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Render view of the composer for one frame
pub struct ComposerWidget<'a> {
    composer: &'a ConversationComposer,
    draft: &'a str,
}

impl Widget for ComposerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        if self.draft.is_empty() {
            let placeholder = Line::from(vec![
                Span::styled("▌", Style::default().fg(Color::White)),
                Span::styled(
                    self.composer.placeholder.as_str(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder, inner_area.width);
            return;
        }

        let mut chars: Vec<char> = self.draft.chars().collect();
        let cursor = self.composer.cursor.min(chars.len());
        chars.insert(cursor, '▌');

        // Scroll horizontally so the cursor stays visible, measured in columns
        let width = inner_area.width as usize;
        let widths: Vec<usize> = chars.iter().map(|c| c.width().unwrap_or(0)).collect();
        let mut start = cursor + 1;
        let mut used = 0;
        while start > 0 && used + widths[start - 1] <= width {
            start -= 1;
            used += widths[start];
        }

        let mut visible = String::new();
        let mut used = 0;
        for (c, w) in chars.iter().zip(&widths).skip(start) {
            if used + w > width {
                break;
            }
            visible.push(*c);
            used += w;
        }

        let line = Line::from(vec![Span::styled(visible, Style::default().fg(Color::White))]);
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}
