//! Polling a long-running process resource until it leaves `"processing"`.
//!
//! The loop itself lives on [`AffinitySession`](crate::AffinitySession); this
//! module holds the pieces it is built from so each can be tested alone:
//! the delay schedule ([`Backoff`]), the state machine ([`ProcessPoller`]) and
//! the validation of each status response ([`ProcessStatus`]).

use std::time::Duration;

use serde_json::Value;

use crate::error::{Error, ErrorKind, Result};
use crate::response::Response;

/// The only non-terminal process state.
pub const PROCESSING_STATE: &str = "processing";

/// Default delay before the second poll.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Default ceiling for the delay between polls.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(8000);

/// Delay schedule for process polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Delay before the second request. The first request is sent immediately.
    pub initial_delay: Duration,
    /// The delay doubles after every poll until it reaches this value.
    pub max_delay: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl PollingConfig {
    /// Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

/// Doubling delay, capped at a maximum.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            next: config.initial_delay.min(config.max_delay),
            max: config.max_delay,
        }
    }

    /// The delay to wait now; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = delay.saturating_mul(2).min(self.max);
        delay
    }
}

/// Where a polling run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Nothing has been requested yet.
    AwaitingFirstResponse,
    /// The last response said `"processing"`.
    Processing { polls: u32 },
    /// A terminal state was seen. The response that carried it is the result.
    Done,
    /// A status response failed validation. Never retried.
    Failed,
}

impl PollState {
    /// Returns true once no further requests will be made.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Done | PollState::Failed)
    }
}

/// State machine driving one polling run.
#[derive(Debug, Clone)]
pub struct ProcessPoller {
    state: PollState,
    backoff: Backoff,
}

impl ProcessPoller {
    pub fn new(config: &PollingConfig) -> Self {
        Self {
            state: PollState::AwaitingFirstResponse,
            backoff: Backoff::new(config),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// How long to wait before the next request. `None` for the first
    /// request, which goes out immediately, and once terminal.
    pub fn wait_before_next_poll(&mut self) -> Option<Duration> {
        match self.state {
            PollState::Processing { .. } => Some(self.backoff.next_delay()),
            _ => None,
        }
    }

    /// Record a validated status and return the new state.
    pub fn observe(&mut self, status: &ProcessStatus) -> PollState {
        self.state = match (self.state, status.is_processing()) {
            (PollState::Processing { polls }, true) => PollState::Processing { polls: polls + 1 },
            (_, true) => PollState::Processing { polls: 1 },
            (_, false) => PollState::Done,
        };
        self.state
    }

    /// Record a validation failure.
    pub fn fail(&mut self) -> PollState {
        self.state = PollState::Failed;
        self.state
    }
}

/// The consulted part of a process status document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessStatus {
    state: String,
}

impl ProcessStatus {
    /// Parse a status document. The body must be a JSON object with a string
    /// `state` property.
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::with_source(ErrorKind::InvalidProcessStatusJson, e))?;
        let object = value
            .as_object()
            .ok_or_else(|| Error::new(ErrorKind::InvalidProcessStatusJson))?;
        let state = object
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::new(ErrorKind::MissingProcessState))?;
        Ok(Self {
            state: state.to_string(),
        })
    }

    /// Validate a status response and buffer its body.
    ///
    /// The returned response still yields the full body to the caller.
    pub async fn from_response(response: Response) -> Result<(Self, Response)> {
        let response = response.error_for_status()?;
        if !response.is_json() {
            return Err(Error::new(ErrorKind::UnexpectedContentType {
                content_type: response.content_type().unwrap_or("(none)").to_string(),
            }));
        }
        let response = response.buffer().await?;
        let body = response.buffered_body().map(|b| b.as_ref()).unwrap_or_default();
        let status = Self::from_json_slice(body)?;
        Ok((status, response))
    }

    /// The raw `state` value.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns true while the process is still running. Every other value,
    /// recognized or not, is terminal.
    pub fn is_processing(&self) -> bool {
        self.state == PROCESSING_STATE
    }
}
