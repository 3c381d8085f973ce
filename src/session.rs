//! Conversation state and the submit/resolve exchange.
//!
//! [`ChatSession`] owns the conversation log, the input draft and the request
//! state. The UI only reads it through projections; the log and the request
//! state change only through [`ChatSession::begin_submit`] and
//! [`ChatSession::resolve`].

use crate::error::CompletionError;
use crate::llm::CompletionClient;
use chrono::{DateTime, Local};
use strum::{AsRefStr, Display};
use tracing::{debug, error, warn};

/// Shown when the backend answers without any content
pub const NO_RESPONSE: &str = "No response";

/// Who a turn came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Sender {
    User,
    Bot,
    SystemError,
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
            Sender::SystemError => "Error",
        }
    }
}

/// One exchanged message
#[derive(Debug, Clone)]
pub struct Turn {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl Turn {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An accepted submission whose completion is still outstanding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Draft was empty after trimming
    Ignored,
    /// A request is already outstanding; the draft is kept
    Busy,
    /// User turn appended and a request should be issued
    Started(PendingRequest),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Vec<Turn>,
    draft: String,
    request_state: RequestState,
    outstanding: Option<RequestId>,
    next_id: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &[Turn] {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn is_waiting(&self) -> bool {
        self.request_state == RequestState::AwaitingResponse
    }

    /// Accept the current draft as a user turn.
    ///
    /// On [`SubmitOutcome::Started`] the caller must issue the request and
    /// hand the result back through [`ChatSession::resolve`].
    pub fn begin_submit(&mut self) -> SubmitOutcome {
        let prompt = self.draft.trim();
        if prompt.is_empty() {
            return SubmitOutcome::Ignored;
        }

        if let Some(id) = self.outstanding {
            warn!(outstanding = %id, "submission rejected while awaiting a response");
            return SubmitOutcome::Busy;
        }

        let prompt = prompt.to_string();
        let id = RequestId(self.next_id);
        self.next_id += 1;

        self.conversation.push(Turn::new(Sender::User, prompt.clone()));
        self.draft.clear();
        self.request_state = RequestState::AwaitingResponse;
        self.outstanding = Some(id);
        debug!(request = %id, "submission accepted");

        SubmitOutcome::Started(PendingRequest { id, prompt })
    }

    /// Apply the result of an outstanding request.
    ///
    /// Returns `false` and changes nothing when `id` is not the outstanding
    /// request.
    pub fn resolve(
        &mut self,
        id: RequestId,
        result: Result<Option<String>, CompletionError>,
    ) -> bool {
        if self.outstanding != Some(id) {
            debug!(request = %id, "ignoring result for a request that is not outstanding");
            return false;
        }

        let turn = match result {
            Ok(Some(content)) if !content.is_empty() => Turn::new(Sender::Bot, content),
            Ok(_) => Turn::new(Sender::Bot, NO_RESPONSE),
            Err(err) => {
                error!(request = %id, error = ?err, "completion request failed");
                Turn::new(Sender::SystemError, err.to_string())
            }
        };
        debug!(request = %id, sender = %turn.sender, "request resolved");

        self.conversation.push(turn);
        self.outstanding = None;
        self.request_state = RequestState::Idle;
        true
    }

    /// Submit the draft and wait for the reply in place.
    pub async fn submit<C>(&mut self, client: &C) -> SubmitOutcome
    where
        C: CompletionClient + ?Sized,
    {
        let outcome = self.begin_submit();
        if let SubmitOutcome::Started(pending) = &outcome {
            let result = client.complete(&pending.prompt).await;
            self.resolve(pending.id, result);
        }
        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    /// Replays canned results and records every prompt it receives
    pub(crate) struct MockClient {
        replies: Mutex<Vec<Result<Option<String>, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockClient {
        pub(crate) fn new(replies: Vec<Result<Option<String>, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn replying(content: &str) -> Self {
            Self::new(vec![Ok(Some(content.to_string()))])
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for MockClient {
        async fn complete(&self, prompt: &str) -> Result<Option<String>, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Ok(None))
        }
    }

    pub(crate) fn transport_error() -> CompletionError {
        // An unparsable URL fails in the builder, no network involved.
        let err = reqwest::Client::new()
            .get("http://")
            .build()
            .unwrap_err();
        CompletionError::Transport(err)
    }

    fn turns(session: &ChatSession) -> Vec<(Sender, String)> {
        session
            .conversation()
            .iter()
            .map(|turn| (turn.sender, turn.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn reply_is_appended_after_user_turn() {
        let client = MockClient::replying("Hi there");
        let mut session = ChatSession::new();
        session.set_draft("Hello");

        let outcome = session.submit(&client).await;

        assert!(matches!(outcome, SubmitOutcome::Started(ref pending) if pending.prompt == "Hello"));
        assert_eq!(
            turns(&session),
            vec![
                (Sender::User, "Hello".to_string()),
                (Sender::Bot, "Hi there".to_string()),
            ]
        );
        assert_eq!(client.prompts(), vec!["Hello".to_string()]);
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn empty_choices_fall_back_to_no_response() {
        let client = MockClient::new(vec![Ok(None)]);
        let mut session = ChatSession::new();
        session.set_draft("Hello");

        session.submit(&client).await;

        assert_eq!(
            turns(&session),
            vec![
                (Sender::User, "Hello".to_string()),
                (Sender::Bot, NO_RESPONSE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_content_falls_back_to_no_response() {
        let client = MockClient::new(vec![Ok(Some(String::new()))]);
        let mut session = ChatSession::new();
        session.set_draft("Hello");

        session.submit(&client).await;

        assert_eq!(session.conversation()[1].text, NO_RESPONSE);
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_turn() {
        let client = MockClient::new(vec![Err(transport_error())]);
        let mut session = ChatSession::new();
        session.set_draft("Hello");

        session.submit(&client).await;

        let conversation = session.conversation();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].sender, Sender::User);
        assert_eq!(conversation[1].sender, Sender::SystemError);
        assert!(conversation[1].text.starts_with("Request failed"));
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn status_failure_text_is_shown() {
        let client = MockClient::new(vec![Err(CompletionError::status(429, "Rate limit reached"))]);
        let mut session = ChatSession::new();
        session.set_draft("Hello");

        session.submit(&client).await;

        assert_eq!(
            session.conversation()[1].text,
            "API returned 429: Rate limit reached"
        );
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let client = MockClient::replying("unused");
        for draft in ["", "   ", "\t\n "] {
            let mut session = ChatSession::new();
            session.set_draft(draft);

            let outcome = session.submit(&client).await;

            assert_eq!(outcome, SubmitOutcome::Ignored);
            assert!(session.conversation().is_empty());
            assert_eq!(session.draft(), draft);
            assert_eq!(session.request_state(), RequestState::Idle);
        }
        assert!(client.prompts().is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_sending() {
        let client = MockClient::new(vec![Ok(Some("a".into())), Ok(Some("b".into()))]);
        let mut session = ChatSession::new();

        session.set_draft(" hello ");
        session.submit(&client).await;
        session.set_draft("hello");
        session.submit(&client).await;

        assert_eq!(session.conversation()[0].text, "hello");
        assert_eq!(session.conversation()[2].text, "hello");
        assert_eq!(client.prompts(), vec!["hello".to_string(), "hello".to_string()]);
    }

    #[test]
    fn request_state_spans_begin_to_resolve() {
        let mut session = ChatSession::new();
        assert_eq!(session.request_state(), RequestState::Idle);

        session.set_draft("Hello");
        let SubmitOutcome::Started(pending) = session.begin_submit() else {
            panic!("submission should start");
        };

        assert!(session.is_waiting());
        assert_eq!(session.draft(), "");
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(pending.prompt, "Hello");

        assert!(session.resolve(pending.id, Ok(Some("Hi".into()))));
        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn draft_is_cleared_even_when_request_fails() {
        let mut session = ChatSession::new();
        session.set_draft("Hello");
        let SubmitOutcome::Started(pending) = session.begin_submit() else {
            panic!("submission should start");
        };
        assert_eq!(session.draft(), "");

        session.set_draft("typed while waiting");
        session.resolve(pending.id, Err(transport_error()));
        assert_eq!(session.draft(), "typed while waiting");
    }

    #[test]
    fn second_submission_is_rejected_while_waiting() {
        let mut session = ChatSession::new();
        session.set_draft("first");
        let SubmitOutcome::Started(first) = session.begin_submit() else {
            panic!("submission should start");
        };

        session.set_draft("second");
        assert_eq!(session.begin_submit(), SubmitOutcome::Busy);
        assert_eq!(session.draft(), "second");
        assert_eq!(session.conversation().len(), 1);

        session.resolve(first.id, Ok(Some("reply".into())));
        let SubmitOutcome::Started(second) = session.begin_submit() else {
            panic!("submission should start once idle");
        };
        assert_ne!(first.id, second.id);
        assert_eq!(session.conversation().len(), 3);
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut session = ChatSession::new();
        session.set_draft("Hello");
        let SubmitOutcome::Started(pending) = session.begin_submit() else {
            panic!("submission should start");
        };
        assert!(session.resolve(pending.id, Ok(Some("Hi".into()))));

        assert!(!session.resolve(pending.id, Ok(Some("late duplicate".into()))));
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn sender_names() {
        assert_eq!(Sender::User.as_ref(), "user");
        assert_eq!(Sender::Bot.to_string(), "bot");
        assert_eq!(Sender::SystemError.as_ref(), "system-error");
        assert_eq!(Sender::SystemError.display_name(), "Error");
    }
}
