//! Generation lifecycle: one request at a time, results pushed into history.
//!
//! ```text
//! Idle ──submit──▶ Generating ──ok──▶ Success ──submit──▶ Generating
//!                      │
//!                      └──err──▶ Error ──submit──▶ Generating
//! ```
//!
//! Selecting a history entry or clearing history never changes the state.

use crate::catalog::StyleDescriptor;
use crate::error::{FailureKind, Result, StudioError};
use crate::history::{GeneratedImageRecord, History, HistoryPersistence};
use crate::image::{AspectRatio, GenerationRequest, ImageProvider, ImageResource};
use serde::Serialize;
use std::path::Path;

/// Where the session is in the generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is in flight.
    Generating,
    /// The last request produced an image.
    Success,
    /// The last request failed.
    Error,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Permission to run one generation, handed out by [`Session::begin_generation`].
#[derive(Debug)]
#[must_use = "a ticket must be passed to complete_generation"]
pub struct GenerationTicket {
    request: GenerationRequest,
    style_name: String,
}

impl GenerationTicket {
    /// The request to send to the provider.
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }
}

/// Result of a submit.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Empty prompt, or a request was already in flight. Nothing changed.
    Ignored,
    /// A new image was generated and added to history.
    Generated(GeneratedImageRecord),
    /// The provider failed; the session is in [`SessionState::Error`].
    Failed(StudioError),
}

#[derive(Debug, Clone)]
struct Submission {
    prompt: String,
    style: StyleDescriptor,
    aspect_ratio: AspectRatio,
}

/// Current image, history and generation state for one user.
pub struct Session<P, S> {
    provider: P,
    persistence: S,
    http: reqwest::Client,
    history: History,
    state: SessionState,
    current: Option<GeneratedImageRecord>,
    error_message: String,
    last_submission: Option<Submission>,
}

impl<P: ImageProvider, S: HistoryPersistence> Session<P, S> {
    /// Creates a session, loading any stored history.
    ///
    /// Stored history that cannot be read is discarded.
    pub fn new(provider: P, persistence: S) -> Self {
        let history = match persistence.load() {
            Ok(records) => History::from_records(records),
            Err(e) => {
                tracing::warn!(error = %e, "stored history unreadable, starting empty");
                History::new()
            }
        };
        tracing::debug!(entries = history.len(), "history loaded");

        Self {
            provider,
            persistence,
            http: reqwest::Client::new(),
            history,
            state: SessionState::Idle,
            current: None,
            error_message: String::new(),
            last_submission: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a request is in flight.
    pub fn is_generating(&self) -> bool {
        self.state == SessionState::Generating
    }

    /// The image being displayed, if any.
    pub fn current(&self) -> Option<&GeneratedImageRecord> {
        self.current.as_ref()
    }

    /// Message of the last failure. Empty unless the last request failed.
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// History, newest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The provider used for generation.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Finds a history record by id.
    pub fn find(&self, id: &str) -> Option<&GeneratedImageRecord> {
        self.history.get(id)
    }

    /// Aspect ratio of the most recent submission, the one `regenerate` reuses.
    pub fn last_aspect_ratio(&self) -> Option<AspectRatio> {
        self.last_submission.as_ref().map(|s| s.aspect_ratio)
    }

    /// Moves to `Generating` and returns a ticket for the request.
    ///
    /// Returns `None` without touching any state if the prompt is blank or a
    /// request is already in flight. The session stays in `Generating` until
    /// the ticket is handed to [`Session::complete_generation`]; a ticket that
    /// is dropped instead leaves every later submit ignored.
    pub fn begin_generation(
        &mut self,
        prompt: &str,
        style: &StyleDescriptor,
        aspect_ratio: AspectRatio,
    ) -> Option<GenerationTicket> {
        if prompt.trim().is_empty() || self.is_generating() {
            return None;
        }

        self.state = SessionState::Generating;
        self.error_message.clear();
        self.last_submission = Some(Submission {
            prompt: prompt.to_string(),
            style: *style,
            aspect_ratio,
        });

        Some(GenerationTicket {
            request: GenerationRequest::new(prompt)
                .with_style_suffix(style.prompt_suffix)
                .with_aspect_ratio(aspect_ratio),
            style_name: style.display_name.to_string(),
        })
    }

    /// Applies the provider's answer for `ticket`.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<ImageResource>,
    ) -> SubmitOutcome {
        match result {
            Ok(url) => {
                let record = GeneratedImageRecord::new(url, ticket.request.prompt, ticket.style_name);
                let evicted = self.history.push(record.clone());
                self.persist();

                tracing::info!(
                    id = %record.id,
                    style = %record.style_name,
                    history_len = self.history.len(),
                    evicted = evicted.len(),
                    "image generated"
                );

                self.current = Some(record.clone());
                self.state = SessionState::Success;
                SubmitOutcome::Generated(record)
            }
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), "image generation failed: {e}");
                self.error_message = e.to_string();
                self.state = SessionState::Error;
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Submits a prompt and waits for the result.
    ///
    /// Dropping the returned future before it resolves (a timeout, Ctrl-C)
    /// puts the session back in the state it had before the call.
    pub async fn submit(
        &mut self,
        prompt: &str,
        style: &StyleDescriptor,
        aspect_ratio: AspectRatio,
    ) -> SubmitOutcome {
        let previous = (self.state, self.error_message.clone());
        let Some(ticket) = self.begin_generation(prompt, style, aspect_ratio) else {
            return SubmitOutcome::Ignored;
        };

        let guard = InFlight {
            state: &mut self.state,
            error_message: &mut self.error_message,
            previous: Some(previous),
        };
        let result = self.provider.generate(ticket.request()).await;
        guard.finish();

        self.complete_generation(ticket, result)
    }

    /// Re-submits the last prompt, style and aspect ratio.
    pub async fn regenerate(&mut self) -> SubmitOutcome {
        let Some(last) = self.last_submission.clone() else {
            return SubmitOutcome::Ignored;
        };
        self.submit(&last.prompt, &last.style, last.aspect_ratio).await
    }

    /// Displays a history entry. Returns false if `id` is not in history.
    pub fn select_history_item(&mut self, id: &str) -> bool {
        match self.history.get(id) {
            Some(record) => {
                self.current = Some(record.clone());
                true
            }
            None => false,
        }
    }

    /// Empties history and deletes the stored copy.
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = self.persistence.clear() {
            tracing::warn!(error = %e, "failed to delete stored history");
        }
        tracing::info!("history cleared");
    }

    /// Saves `record`'s image to `path`. Returns the number of bytes written.
    pub async fn download(&self, record: &GeneratedImageRecord, path: impl AsRef<Path>) -> Result<usize> {
        record.url.save_to(&self.http, path).await
    }

    fn persist(&self) {
        if let Err(e) = self.persistence.save(self.history.records()) {
            tracing::warn!(error = %e, "failed to persist history");
        }
    }
}

/// Restores the pre-submit state unless the request ran to completion.
struct InFlight<'a> {
    state: &'a mut SessionState,
    error_message: &'a mut String,
    previous: Option<(SessionState, String)>,
}

impl InFlight<'_> {
    fn finish(mut self) {
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some((state, message)) = self.previous.take() {
            tracing::warn!(restored = %state, "generation cancelled before completion");
            *self.state = state;
            *self.error_message = message;
        }
    }
}

impl SubmitOutcome {
    /// The generated record, if any.
    pub fn record(&self) -> Option<&GeneratedImageRecord> {
        match self {
            Self::Generated(record) => Some(record),
            _ => None,
        }
    }

    /// Failure classification, if the submit failed.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failed(e) => Some(e.kind()),
            _ => None,
        }
    }
}
