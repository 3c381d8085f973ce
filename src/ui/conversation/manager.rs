use crate::session::ChatSession;
use crate::ui::conversation::{ComposerResult, ConversationComposer, ConversationHistory, WaitingIndicator};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

const PAGE_LINES: usize = 5;
const WHEEL_LINES: usize = 3;
const SEND_BUTTON_WIDTH: u16 = 10;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Submit,
    Exit,
}

/// Screen regions of the conversation UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationLayout {
    pub history: Rect,
    pub indicator: Rect,
    pub composer: Rect,
    pub send_button: Rect,
}

impl ConversationLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // History
                Constraint::Length(1), // Waiting indicator
                Constraint::Length(3), // Composer + send button
            ])
            .split(area);

        let input_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(SEND_BUTTON_WIDTH)])
            .split(rows[2]);

        Self {
            history: rows[0],
            indicator: rows[1],
            composer: input_row[0],
            send_button: input_row[1],
        }
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// Lays out and routes input for the conversation UI components
pub struct ConversationManager {
    history: ConversationHistory,
    composer: ConversationComposer,
    indicator: WaitingIndicator,
    last_layout: Option<ConversationLayout>,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self {
            history: ConversationHistory::new(),
            composer: ConversationComposer::new("Type a message"),
            indicator: WaitingIndicator::new(),
            last_layout: None,
        }
    }

    /// Handle key input. Editing keys go to the composer and the session draft.
    pub fn handle_key(&mut self, key: KeyEvent, session: &mut ChatSession) -> ConversationAction {
        match key.code {
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ConversationAction::Exit;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(PAGE_LINES);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(PAGE_LINES);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key, session.draft_mut()) {
            ComposerResult::Submitted => ConversationAction::Submit,
            ComposerResult::None => ConversationAction::None,
        }
    }

    /// Handle mouse input: the send button and wheel scrolling
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> ConversationAction {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let on_send = self
                    .last_layout
                    .is_some_and(|layout| contains(layout.send_button, mouse.column, mouse.row));
                if on_send {
                    return ConversationAction::Submit;
                }
            }
            MouseEventKind::ScrollUp => self.history.scroll_up(WHEEL_LINES),
            MouseEventKind::ScrollDown => self.history.scroll_down(WHEEL_LINES),
            _ => {}
        }
        ConversationAction::None
    }

    pub fn tick(&mut self) {
        self.indicator.tick();
    }

    pub fn layout(&self) -> Option<ConversationLayout> {
        self.last_layout
    }

    /// Render the conversation UI components
    pub fn render(&mut self, session: &ChatSession, area: Rect, buf: &mut Buffer) {
        let layout = ConversationLayout::new(area);
        self.last_layout = Some(layout);

        self.history.render(session.conversation(), layout.history, buf);

        if session.is_waiting() {
            (&self.indicator).render(layout.indicator, buf);
        }

        self.composer.widget(session.draft()).render(layout.composer, buf);

        let button_style = if session.is_waiting() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        Paragraph::new("Send")
            .alignment(Alignment::Center)
            .style(button_style)
            .block(Block::default().borders(Borders::ALL))
            .render(layout.send_button, buf);
    }
}

impl Default for ConversationManager {
    fn default() -> Self {
        Self::new()
    }
}
