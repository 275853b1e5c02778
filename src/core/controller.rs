//! Turn orchestration for the single conversation.
//!
//! A turn moves `Idle → AwaitingInput → Sending → {Resolved, Failed} → Idle`.
//! Only an accepted [`ChatController::submit`] produces a [`PendingTurn`], and
//! only the matching turn id is accepted by [`ChatController::settle`], so at
//! most one request can ever be outstanding.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{HistoryTurn, QueryRequest};
use crate::core::config::{Config, ContextMode};
use crate::core::error::{ChatError, InvalidStateError, TransportError, ValidationError};
use crate::core::message::EntryId;
use crate::core::transcript::ChatTranscript;
use crate::core::transport::{dispatch, ChatTransport, TurnReply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingInput,
    Sending,
    Resolved,
    Failed,
}

impl TurnState {
    fn accepts_submit(self) -> bool {
        !matches!(self, TurnState::Sending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitInput {
    /// Free text from the input box.
    Typed(String),
    /// One of the configured suggested questions, by position.
    Suggested(usize),
}

/// How a settled turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Resolved,
    Failed(TransportError),
    /// The view went away before the answer arrived.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub context_mode: ContextMode,
    pub max_history_turns: usize,
    pub suggested_questions: Vec<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            context_mode: config.context_mode,
            max_history_turns: config.max_history_turns(),
            suggested_questions: config.suggested_questions.clone(),
            request_timeout: Some(config.request_timeout()),
        }
    }
}

/// Everything needed to carry out an accepted submission.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub turn_id: u64,
    pub entry_id: EntryId,
    pub request: QueryRequest,
    /// Abort handle; cancelled when the view is torn down.
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    turn_id: u64,
    entry_id: EntryId,
    cancel: CancellationToken,
}

pub struct ChatController {
    transcript: ChatTranscript,
    state: TurnState,
    settings: ControllerSettings,
    in_flight: Option<InFlight>,
    next_turn_id: u64,
    session_id: Option<String>,
    last_outcome: Option<TurnOutcome>,
    torn_down: bool,
}

impl ChatController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            transcript: ChatTranscript::new(),
            state: TurnState::Idle,
            settings,
            in_flight: None,
            next_turn_id: 1,
            session_id: None,
            last_outcome: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn suggested_questions(&self) -> &[String] {
        &self.settings.suggested_questions
    }

    pub fn last_outcome(&self) -> Option<&TurnOutcome> {
        self.last_outcome.as_ref()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.torn_down && self.state.accepts_submit()
    }

    pub fn is_sending(&self) -> bool {
        self.state == TurnState::Sending
    }

    /// The user started composing a message.
    pub fn begin_input(&mut self) {
        if matches!(
            self.state,
            TurnState::Idle | TurnState::Resolved | TurnState::Failed
        ) {
            self.transition(TurnState::AwaitingInput);
        }
    }

    /// The input box was emptied without submitting.
    pub fn clear_input(&mut self) {
        if self.state == TurnState::AwaitingInput {
            self.transition(TurnState::Idle);
        }
    }

    /// Accept a question and start a turn.
    ///
    /// On success the user entry and a pending assistant placeholder have been
    /// appended, in that order, and the returned [`PendingTurn`] must be
    /// carried out by the caller and reported back through [`Self::settle`].
    pub fn submit(&mut self, input: SubmitInput) -> Result<PendingTurn, ChatError> {
        if self.torn_down {
            return Err(InvalidStateError::TornDown.into());
        }
        if !self.state.accepts_submit() {
            debug!("submit rejected while a turn is in flight");
            return Err(InvalidStateError::AlreadySending.into());
        }
        if let Some(id) = self.transcript.pending() {
            return Err(InvalidStateError::PendingOutstanding { id }.into());
        }

        let text = match input {
            SubmitInput::Typed(text) => text,
            SubmitInput::Suggested(index) => self
                .settings
                .suggested_questions
                .get(index)
                .cloned()
                .ok_or(ValidationError::UnknownSuggestion {
                    index,
                    available: self.settings.suggested_questions.len(),
                })?,
        };

        // Prior turns are gathered before this question joins the transcript.
        let history = self.history_for_request();

        let user_id = self.transcript.append_user(&text)?;
        self.transition(TurnState::Sending);
        let entry_id = self.transcript.append_pending_assistant()?;

        let query = self
            .transcript
            .get(user_id)
            .map(|entry| entry.content.clone())
            .unwrap_or_else(|| text.trim().to_string());

        let turn_id = self.next_turn_id;
        self.next_turn_id += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            turn_id,
            entry_id,
            cancel: cancel.clone(),
        });

        info!(turn = turn_id, entry = %entry_id, "question submitted");

        Ok(PendingTurn {
            turn_id,
            entry_id,
            request: QueryRequest {
                query,
                session_id: self.session_id.clone(),
                history,
            },
            cancel,
        })
    }

    /// Apply the result of a turn.
    ///
    /// Results for a turn that is not the one in flight (already settled, or
    /// cancelled by teardown) are dropped and `None` is returned.
    pub fn settle(
        &mut self,
        turn_id: u64,
        result: Result<TurnReply, TransportError>,
    ) -> Option<TurnOutcome> {
        let in_flight = match self.in_flight.take() {
            Some(current) if current.turn_id == turn_id && !current.cancel.is_cancelled() => {
                current
            }
            other => {
                self.in_flight = other;
                debug!(turn = turn_id, "ignoring result for a stale turn");
                return None;
            }
        };

        let outcome = match result {
            Ok(reply) => {
                let resolved = self.transcript.resolve_with_sources(
                    in_flight.entry_id,
                    reply.answer,
                    reply.sources,
                );
                if let Err(err) = resolved {
                    warn!(error = %err, "could not resolve assistant entry");
                }
                if let Some(session_id) = reply.session_id {
                    self.session_id = Some(session_id);
                }
                self.transition(TurnState::Resolved);
                TurnOutcome::Resolved
            }
            Err(err) => {
                warn!(turn = turn_id, error = %err, "turn failed");
                let failed = self.transcript.fail(in_flight.entry_id, err.user_message());
                if let Err(state_err) = failed {
                    warn!(error = %state_err, "could not fail assistant entry");
                }
                self.transition(TurnState::Failed);
                TurnOutcome::Failed(err)
            }
        };

        self.transition(TurnState::Idle);
        self.last_outcome = Some(outcome.clone());
        Some(outcome)
    }

    /// Submit, wait for the transport, and settle in one call.
    pub async fn run_turn<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        input: SubmitInput,
    ) -> Result<TurnOutcome, ChatError> {
        self.run_turn_until(transport, input, &CancellationToken::new())
            .await
    }

    /// Like [`ChatController::run_turn`], but `abort` tears the controller
    /// down if it fires before the transport answers.
    pub async fn run_turn_until<T: ChatTransport + ?Sized>(
        &mut self,
        transport: &T,
        input: SubmitInput,
        abort: &CancellationToken,
    ) -> Result<TurnOutcome, ChatError> {
        let turn = self.submit(input)?;
        let timeout = self.settings.request_timeout;
        let result = tokio::select! {
            biased;
            _ = abort.cancelled() => None,
            result = dispatch(transport, &turn.request, timeout, &turn.cancel) => result,
        };
        match result {
            Some(result) => Ok(self
                .settle(turn.turn_id, result)
                .unwrap_or(TurnOutcome::Cancelled)),
            None => {
                self.teardown();
                Ok(TurnOutcome::Cancelled)
            }
        }
    }

    /// Abort any outstanding request and stop accepting turns.
    pub fn teardown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            info!(turn = in_flight.turn_id, "cancelled outstanding turn");
            self.last_outcome = Some(TurnOutcome::Cancelled);
        }
        self.torn_down = true;
        self.transition(TurnState::Idle);
    }

    fn history_for_request(&self) -> Vec<HistoryTurn> {
        match self.settings.context_mode {
            ContextMode::Latest => Vec::new(),
            ContextMode::Full => self
                .transcript
                .completed_turns(self.settings.max_history_turns)
                .into_iter()
                .map(|turn| HistoryTurn {
                    question: turn.question,
                    answer: turn.answer,
                })
                .collect(),
        }
    }

    fn transition(&mut self, next: TurnState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "turn state");
            self.state = next;
        }
    }
}
