use crate::error::CompletionError;
use crate::session::RequestId;

/// Everything the UI loop reacts to, merged into one channel
#[derive(Debug)]
pub enum AppEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Mouse event
    Mouse(crossterm::event::MouseEvent),

    /// Terminal resize
    Resize(u16, u16),

    /// Animation tick
    Tick,

    /// A completion request finished
    Completion {
        id: RequestId,
        result: Result<Option<String>, CompletionError>,
    },
}
