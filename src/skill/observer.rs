//! Observability hooks for skill invocations
//!
//! The router reports every lifecycle notification and the final outcome
//! through an injected [`SkillObserver`] instead of logging directly, so
//! hosts and tests decide what gets recorded.

use crate::observability::metrics::{metrics, MetricsCollector};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identifiers of the event being handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillEvent<'a> {
    pub request_id: Option<&'a str>,
    pub session_id: &'a str,
    pub application_id: &'a str,
}

/// How an invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Welcome,
    Help,
    Macros,
    MacroFallback,
    Halt,
    SessionEnded,
    Unsupported,
    InvalidIntent,
    Rejected,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationOutcome::Welcome => "welcome",
            InvocationOutcome::Help => "help",
            InvocationOutcome::Macros => "macros",
            InvocationOutcome::MacroFallback => "macro_fallback",
            InvocationOutcome::Halt => "halt",
            InvocationOutcome::SessionEnded => "session_ended",
            InvocationOutcome::Unsupported => "unsupported",
            InvocationOutcome::InvalidIntent => "invalid_intent",
            InvocationOutcome::Rejected => "rejected",
        }
    }

    /// True when the host receives an error instead of a response
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            InvocationOutcome::InvalidIntent | InvocationOutcome::Rejected
        )
    }
}

/// Receives lifecycle notifications from the request router
///
/// Every method defaults to a no-op. Notifications never influence routing.
pub trait SkillObserver: Send + Sync {
    /// First event of a new session; delivered before the request is dispatched
    fn on_session_started(&self, _event: &SkillEvent<'_>) {}

    fn on_launch(&self, _event: &SkillEvent<'_>) {}

    fn on_intent(&self, _event: &SkillEvent<'_>, _intent_name: &str) {}

    fn on_session_ended(&self, _event: &SkillEvent<'_>, _reason: Option<&str>) {}

    /// Final notification for every invocation, including failures
    fn on_outcome(&self, _event: &SkillEvent<'_>, _outcome: InvocationOutcome, _elapsed: Duration) {}
}

/// Observer that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SkillObserver for NoopObserver {}

/// Default observer: structured `tracing` events plus metrics counters
pub struct TracingObserver {
    collector: &'static MetricsCollector,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            collector: metrics(),
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillObserver for TracingObserver {
    fn on_session_started(&self, event: &SkillEvent<'_>) {
        self.collector.session_started();
        info!(
            request_id = event.request_id.unwrap_or_default(),
            session_id = event.session_id,
            "Session started"
        );
    }

    fn on_launch(&self, event: &SkillEvent<'_>) {
        info!(
            request_id = event.request_id.unwrap_or_default(),
            session_id = event.session_id,
            "Launch request"
        );
    }

    fn on_intent(&self, event: &SkillEvent<'_>, intent_name: &str) {
        self.collector.intent_received(intent_name);
        info!(
            request_id = event.request_id.unwrap_or_default(),
            session_id = event.session_id,
            intent = intent_name,
            "Intent request"
        );
    }

    fn on_session_ended(&self, event: &SkillEvent<'_>, reason: Option<&str>) {
        self.collector.session_ended();
        info!(
            request_id = event.request_id.unwrap_or_default(),
            session_id = event.session_id,
            reason = reason.unwrap_or("unspecified"),
            "Session ended"
        );
    }

    fn on_outcome(&self, event: &SkillEvent<'_>, outcome: InvocationOutcome, elapsed: Duration) {
        self.collector.invocation_completed(outcome, elapsed);
        if outcome.is_failure() {
            warn!(
                request_id = event.request_id.unwrap_or_default(),
                session_id = event.session_id,
                outcome = outcome.as_str(),
                "Invocation failed"
            );
        } else {
            debug!(
                request_id = event.request_id.unwrap_or_default(),
                outcome = outcome.as_str(),
                elapsed_us = elapsed.as_micros() as u64,
                "Invocation completed"
            );
        }
    }
}

/// Notification captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedNotification {
    SessionStarted { request_id: Option<String> },
    Launch,
    Intent { name: String },
    SessionEnded { reason: Option<String> },
    Outcome(InvocationOutcome),
}

/// Observer that keeps every notification in order; used by hosts' tests
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    notifications: Arc<Mutex<Vec<RecordedNotification>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<RecordedNotification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    fn record(&self, notification: RecordedNotification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

impl SkillObserver for RecordingObserver {
    fn on_session_started(&self, event: &SkillEvent<'_>) {
        self.record(RecordedNotification::SessionStarted {
            request_id: event.request_id.map(str::to_string),
        });
    }

    fn on_launch(&self, _event: &SkillEvent<'_>) {
        self.record(RecordedNotification::Launch);
    }

    fn on_intent(&self, _event: &SkillEvent<'_>, intent_name: &str) {
        self.record(RecordedNotification::Intent {
            name: intent_name.to_string(),
        });
    }

    fn on_session_ended(&self, _event: &SkillEvent<'_>, reason: Option<&str>) {
        self.record(RecordedNotification::SessionEnded {
            reason: reason.map(str::to_string),
        });
    }

    fn on_outcome(&self, _event: &SkillEvent<'_>, outcome: InvocationOutcome, _elapsed: Duration) {
        self.record(RecordedNotification::Outcome(outcome));
    }
}
