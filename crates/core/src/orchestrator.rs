//! The conversational turn-taking protocol for one simulated call.
//!
//! One orchestrator exists per client connection and owns that connection's
//! session history. A call-start signal produces the opening line; each user
//! utterance then either matches an end-of-call phrase (fixed closing line,
//! no completion request) or is answered by the completion service, and an
//! answer containing the farewell marker ends the call.

use crate::completion::CompletionService;
use crate::conversation::{CallSession, Turn};
use std::sync::Arc;
use tracing::warn;

/// Utterance substrings that end the call from the caller's side.
/// Matching is case-insensitive substring containment against the fixed,
/// process-local set.
pub const END_PHRASES: [&str; 5] = ["bye", "ok thank you", "theek hai", "okay", "thanks"];

/// Fixed line emitted when the caller ends the call with an end phrase.
pub const CLOSING_LINE: &str = "Thank you for informing me. Take care, goodbye!";

/// Substituted for the assistant reply when the completion service fails.
pub const FALLBACK_REPLY: &str = "I am sorry, I have a connection issue at the moment.";

/// Substring of an assistant reply (case-insensitive) that marks the call
/// as finished from the assistant's side.
pub const FAREWELL_MARKER: &str = "goodbye";

/// Whether a case-folded utterance contains any end-of-call phrase.
pub fn contains_end_phrase(folded_utterance: &str) -> bool {
    END_PHRASES
        .iter()
        .any(|phrase| folded_utterance.contains(phrase))
}

/// Whether an assistant reply signals the end of the call.
pub fn is_farewell(reply: &str) -> bool {
    reply.to_lowercase().contains(FAREWELL_MARKER)
}

/// Lifecycle of one call session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// No call has started on this connection yet.
    Idle,
    /// A call-start signal arrived and the opening line is being produced.
    Greeting,
    /// The call is active; utterances are being exchanged.
    InProgress,
    /// The call finished. The session is inert until the next call start.
    Ended,
}

/// A scripted reply to emit to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Tells the client to stop listening and close its call UI.
    pub end_call: bool,
}

/// Drives the turn-taking protocol for a single connection.
///
/// The orchestrator is intentionally single-owner: each WebSocket connection
/// constructs its own, so histories are isolated per caller and nothing is
/// shared process-wide.
pub struct CallOrchestrator {
    completion: Arc<dyn CompletionService>,
    system_instruction: String,
    session: Option<CallSession>,
    state: CallState,
}

impl CallOrchestrator {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            system_instruction: system_instruction.into(),
            session: None,
            state: CallState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CallState {
        self.state
    }

    /// The active session's history, if a call has ever started.
    pub fn history(&self) -> Option<&[Turn]> {
        self.session.as_ref().map(|s| s.turns())
    }

    /// Starts a call, discarding any prior session.
    ///
    /// The fresh session holds only the system instruction; the opening
    /// line is requested from the completion service and appended as the
    /// first assistant turn. The greeting never carries the end flag.
    pub async fn start_call(&mut self) -> Reply {
        self.state = CallState::Greeting;
        let mut session = CallSession::new(&self.system_instruction);
        let text = fetch_or_fallback(&*self.completion, session.turns()).await;
        session.push_assistant(&text);
        self.session = Some(session);
        self.state = CallState::InProgress;
        Reply {
            text,
            end_call: false,
        }
    }

    /// Processes one transcribed user utterance.
    ///
    /// Returns `None` when no call is in progress: an ended or not-yet
    /// started session is inert, and the utterance is dropped without
    /// touching the history.
    pub async fn handle_utterance(&mut self, utterance: &str) -> Option<Reply> {
        if self.state != CallState::InProgress {
            return None;
        }
        let session = self.session.as_mut()?;

        let folded = utterance.to_lowercase();
        session.push_user(&folded);

        if contains_end_phrase(&folded) {
            // The fixed closing line is emitted as-is: never appended to the
            // history, and the completion service is not consulted.
            self.state = CallState::Ended;
            return Some(Reply {
                text: CLOSING_LINE.to_string(),
                end_call: true,
            });
        }

        let text = fetch_or_fallback(&*self.completion, session.turns()).await;
        session.push_assistant(&text);

        let end_call = is_farewell(&text);
        if end_call {
            self.state = CallState::Ended;
        }
        Some(Reply { text, end_call })
    }
}

/// Requests a completion, substituting the fixed fallback line on failure.
///
/// The substitution is deliberate control flow, not error recovery: a single
/// failed request degrades to an apology and the call continues. No retry.
async fn fetch_or_fallback(completion: &dyn CompletionService, history: &[Turn]) -> String {
    match completion.complete(history).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "completion request failed; substituting the fallback line");
            FALLBACK_REPLY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, MockCompletionService};
    use std::time::Duration;

    const INSTRUCTION: &str = "You are a professor calling a parent about an absence.";

    fn orchestrator_with_mock() -> (CallOrchestrator, Arc<MockCompletionService>) {
        let mock = Arc::new(MockCompletionService::new());
        let orchestrator = CallOrchestrator::new(mock.clone(), INSTRUCTION);
        (orchestrator, mock)
    }

    #[test]
    fn end_phrases_match_by_substring_containment() {
        assert!(contains_end_phrase("okay, i understand"));
        assert!(contains_end_phrase("theek hai, main dekh lunga"));
        assert!(contains_end_phrase("thanks a lot"));
        assert!(contains_end_phrase("goodbye")); // contains "bye"
        assert!(!contains_end_phrase("he had a fever"));
    }

    #[test]
    fn farewell_marker_is_case_insensitive() {
        assert!(is_farewell("Take care, Goodbye!"));
        assert!(is_farewell("goodbye"));
        assert!(!is_farewell("see you tomorrow"));
        assert!(!is_farewell(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn starting_a_call_greets_and_enters_in_progress() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        assert_eq!(orchestrator.state(), CallState::Idle);

        mock.push_reply("Hello");
        let reply = orchestrator.start_call().await;

        assert_eq!(reply, Reply { text: "Hello".into(), end_call: false });
        assert_eq!(orchestrator.state(), CallState::InProgress);

        let history = orchestrator.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::system(INSTRUCTION));
        assert_eq!(history[1], Turn::assistant("Hello"));
    }

    #[tokio::test]
    async fn starting_a_new_call_discards_the_prior_session() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;
        mock.push_reply("This is the school calling.");
        orchestrator.handle_utterance("hello, who is this?").await;
        assert_eq!(orchestrator.history().unwrap().len(), 4);

        mock.push_reply("Hello again");
        orchestrator.start_call().await;

        let history = orchestrator.history().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::system(INSTRUCTION));
        assert_eq!(history[1], Turn::assistant("Hello again"));
    }

    #[tokio::test]
    async fn end_phrase_emits_the_closing_line_without_a_completion_request() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;

        let reply = orchestrator.handle_utterance("okay, I understand").await;

        assert_eq!(
            reply,
            Some(Reply {
                text: "Thank you for informing me. Take care, goodbye!".into(),
                end_call: true,
            })
        );
        assert_eq!(orchestrator.state(), CallState::Ended);
        // Only the greeting hit the completion service.
        assert_eq!(mock.call_count(), 1);

        // The closing line is not part of the history; the utterance is.
        let history = orchestrator.history().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[2], Turn::user("okay, i understand"));
    }

    #[tokio::test]
    async fn ordinary_utterances_reach_the_completion_service_with_full_history() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;

        mock.push_reply("May I know the reason for the absence?");
        let reply = orchestrator
            .handle_utterance("yes, this is his father speaking")
            .await
            .unwrap();

        assert_eq!(reply.text, "May I know the reason for the absence?");
        assert!(!reply.end_call);
        assert_eq!(orchestrator.state(), CallState::InProgress);

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        let sent = &calls[1];
        assert_eq!(sent[0], Turn::system(INSTRUCTION));
        assert_eq!(
            sent.last().unwrap(),
            &Turn::user("yes, this is his father speaking")
        );
    }

    #[tokio::test]
    async fn a_farewell_reply_ends_the_call() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;

        mock.push_reply("I hope he feels better soon, goodbye!");
        let reply = orchestrator.handle_utterance("he had a fever").await.unwrap();

        assert_eq!(reply.text, "I hope he feels better soon, goodbye!");
        assert!(reply.end_call);
        assert_eq!(orchestrator.state(), CallState::Ended);
    }

    #[tokio::test]
    async fn completion_failure_substitutes_the_fallback_line() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;

        mock.push_error(CompletionError::Timeout(Duration::from_secs(30)));
        let reply = orchestrator.handle_utterance("he had a fever").await.unwrap();

        assert_eq!(reply.text, FALLBACK_REPLY);
        // The fallback contains no farewell, so the call stays open.
        assert!(!reply.end_call);
        assert_eq!(orchestrator.state(), CallState::InProgress);

        // The substituted line is still recorded as an assistant turn.
        let history = orchestrator.history().unwrap();
        assert_eq!(history.last().unwrap(), &Turn::assistant(FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn a_failed_greeting_still_opens_the_call() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_error(CompletionError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ));

        let reply = orchestrator.start_call().await;

        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(!reply.end_call);
        assert_eq!(orchestrator.state(), CallState::InProgress);
        assert_eq!(
            orchestrator.history().unwrap().last().unwrap(),
            &Turn::assistant(FALLBACK_REPLY)
        );
    }

    #[tokio::test]
    async fn utterances_are_ignored_before_any_call() {
        let (mut orchestrator, mock) = orchestrator_with_mock();

        assert_eq!(orchestrator.handle_utterance("hello?").await, None);
        assert_eq!(mock.call_count(), 0);
        assert!(orchestrator.history().is_none());
    }

    #[tokio::test]
    async fn utterances_are_ignored_after_the_call_ends() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;
        orchestrator.handle_utterance("ok thank you").await;
        assert_eq!(orchestrator.state(), CallState::Ended);
        let len_at_end = orchestrator.history().unwrap().len();

        assert_eq!(orchestrator.handle_utterance("are you there?").await, None);
        assert_eq!(orchestrator.history().unwrap().len(), len_at_end);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn utterances_are_case_folded_before_matching_and_storage() {
        let (mut orchestrator, mock) = orchestrator_with_mock();
        mock.push_reply("Hello");
        orchestrator.start_call().await;

        let reply = orchestrator.handle_utterance("OKAY THANK YOU").await.unwrap();

        assert!(reply.end_call);
        assert_eq!(
            orchestrator.history().unwrap().last().unwrap(),
            &Turn::user("okay thank you")
        );
    }
}
