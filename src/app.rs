use crate::events::AppEvent;
use crate::llm::CompletionClient;
use crate::session::{ChatSession, SubmitOutcome};
use crate::tui::{self, EventHandler, Tui};
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use ratatui::Frame;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Owns the session and drives it from UI events
pub struct App {
    session: ChatSession,
    manager: ConversationManager,
    client: Arc<dyn CompletionClient>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(client: Arc<dyn CompletionClient>, events_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            session: ChatSession::new(),
            manager: ConversationManager::new(),
            client,
            events_tx,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        self.manager.render(&self.session, area, frame.buffer_mut());
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => {
                let action = self.manager.handle_key(key, &mut self.session);
                self.apply(action);
            }
            AppEvent::Mouse(mouse) => {
                let action = self.manager.handle_mouse(mouse);
                self.apply(action);
            }
            AppEvent::Resize(..) => {}
            AppEvent::Tick => self.manager.tick(),
            AppEvent::Completion { id, result } => {
                self.session.resolve(id, result);
            }
        }
    }

    fn apply(&mut self, action: ConversationAction) {
        match action {
            ConversationAction::None => {}
            ConversationAction::Submit => self.submit(),
            ConversationAction::Exit => self.should_quit = true,
        }
    }

    /// Start a submission and run its request on a background task
    fn submit(&mut self) {
        let SubmitOutcome::Started(pending) = self.session.begin_submit() else {
            return;
        };

        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.complete(&pending.prompt).await;
            if tx.send(AppEvent::Completion { id: pending.id, result }).is_err() {
                debug!(request = %pending.id, "event loop closed before the reply arrived");
            }
        });
    }

    async fn run_loop(&mut self, terminal: &mut Tui, events: &mut EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .context("Failed to draw frame")?;

            match events.next().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        Ok(())
    }
}

/// Run the chat UI until the user quits
pub async fn run(client: Arc<dyn CompletionClient>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client, events.sender());
    info!("chat session started");

    let result = app.run_loop(&mut terminal, &mut events).await;

    tui::restore()?;
    info!(turns = app.session().conversation().len(), "chat session ended");
    result
}
