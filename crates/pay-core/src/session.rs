//! # Polling Sessions
//!
//! State of one confirmation attempt.

use crate::intent::PaymentIntent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Identifies one confirmation session. Tokens are never reused within
/// a process, so a late callback can be matched against the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, loop not started
    Idle,
    /// Loop running
    Polling,
    /// Gateway reported success
    Confirmed,
    /// Budget exhausted
    TimedOut,
    /// Stopped by the user or by a newer session
    Cancelled,
    /// Could not start (bad intent id); no request was made
    Errored,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Idle | SessionStatus::Polling)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Polling => "polling",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::TimedOut => "timed_out",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// One confirmation attempt for one payment intent
#[derive(Debug, Clone)]
pub struct PollingSession {
    token: SessionToken,
    intent: PaymentIntent,
    status: SessionStatus,
    started_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    deadline: Option<Instant>,
    requests_issued: u32,
}

impl PollingSession {
    pub fn new(token: SessionToken, intent: PaymentIntent) -> Self {
        Self {
            token,
            intent,
            status: SessionStatus::Idle,
            started_at: None,
            started: None,
            deadline: None,
            requests_issued: 0,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn requests_issued(&self) -> u32 {
        self.requests_issued
    }

    /// Time since `start`, zero if never started
    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    /// Idle -> Polling, capturing the absolute deadline.
    /// Returns false if the session was not idle.
    pub(crate) fn start(&mut self, budget: Duration) -> bool {
        if self.status != SessionStatus::Idle {
            return false;
        }
        let now = Instant::now();
        self.status = SessionStatus::Polling;
        self.started_at = Some(Utc::now());
        self.started = Some(now);
        self.deadline = Some(now + budget);
        true
    }

    /// True once the deadline has passed (never for an unstarted session)
    pub fn deadline_reached(&self) -> bool {
        self.deadline.map(|d| Instant::now() >= d).unwrap_or(false)
    }

    pub(crate) fn record_request(&mut self) {
        self.requests_issued += 1;
    }

    /// Move to a terminal state. Once terminal, later calls are ignored.
    pub(crate) fn finish(&mut self, status: SessionStatus) -> bool {
        if self.status.is_terminal() || !status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}
