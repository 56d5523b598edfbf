//! Request router: one event in, at most one response envelope out
//!
//! Dispatch order for every event:
//!
//! 1. Optional application id gate.
//! 2. Session-start notification when `session.new` is set. It never changes
//!    the branch taken.
//! 3. Exhaustive match on the request kind, then on the intent.
//!
//! The router keeps no state between calls.

use crate::config::{ConfigError, SkillConfig};
use crate::error::{SkillError, SkillResult};
use crate::invocation_span;
use crate::protocol::{
    build_response, IntentRequest, RequestEnvelope, ResponseEnvelope, SessionAttributes,
    SkillRequest, SpeechletResponse,
};
use crate::skill::macros;
use crate::skill::observer::{InvocationOutcome, SkillEvent, SkillObserver, TracingObserver};
use crate::skill::responses::{halt_response, welcome_response};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

pub const MACRO_NUTRITION_INTENT: &str = "getMacroNutritionIntent";
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";

/// Intents this skill understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillIntent {
    GetMacroNutrition,
    Help,
    Stop,
    Cancel,
}

impl SkillIntent {
    /// Intent name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            SkillIntent::GetMacroNutrition => MACRO_NUTRITION_INTENT,
            SkillIntent::Help => HELP_INTENT,
            SkillIntent::Stop => STOP_INTENT,
            SkillIntent::Cancel => CANCEL_INTENT,
        }
    }
}

impl FromStr for SkillIntent {
    type Err = SkillError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            MACRO_NUTRITION_INTENT => Ok(SkillIntent::GetMacroNutrition),
            HELP_INTENT => Ok(SkillIntent::Help),
            STOP_INTENT => Ok(SkillIntent::Stop),
            CANCEL_INTENT => Ok(SkillIntent::Cancel),
            other => Err(SkillError::invalid_intent(other)),
        }
    }
}

/// The macro nutrition skill
///
/// # Examples
/// ```
/// use macroskill::skill::Skill;
/// use serde_json::json;
///
/// let skill = Skill::new();
/// let envelope = skill
///     .handle_json(json!({
///         "session": {
///             "new": false,
///             "sessionId": "s-1",
///             "application": { "applicationId": "amzn1.ask.skill.test" }
///         },
///         "request": {
///             "type": "IntentRequest",
///             "requestId": "r-1",
///             "intent": {
///                 "name": "getMacroNutritionIntent",
///                 "slots": {
///                     "totalCalories": { "name": "totalCalories", "value": "2420" },
///                     "bodyWeight": { "name": "bodyWeight", "value": "135" }
///                 }
///             }
///         }
///     }))
///     .unwrap()
///     .expect("intent requests always produce a response");
///
/// assert_eq!(
///     envelope.response.output_speech.text(),
///     "135 grams of protein, 318 grams of carbs, and 67 grams of fat"
/// );
/// ```
#[derive(Clone)]
pub struct Skill {
    observer: Arc<dyn SkillObserver>,
    expected_application_id: Option<String>,
}

impl Skill {
    /// Skill with the default tracing observer and no application id gate
    pub fn new() -> Self {
        Self {
            observer: Arc::new(TracingObserver::new()),
            expected_application_id: None,
        }
    }

    /// Build from configuration, resolving the application id gate
    pub fn from_config(config: &SkillConfig) -> Result<Self, ConfigError> {
        let mut skill = Self::new();
        skill.expected_application_id = config.expected_application_id()?;
        Ok(skill)
    }

    pub fn with_observer(mut self, observer: Arc<dyn SkillObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Reject events whose application id differs from `application_id`
    pub fn with_application_id<S: Into<String>>(mut self, application_id: S) -> Self {
        self.expected_application_id = Some(application_id.into());
        self
    }

    pub fn expected_application_id(&self) -> Option<&str> {
        self.expected_application_id.as_deref()
    }

    /// Decode a raw event document and handle it
    pub fn handle_json(&self, event: Value) -> SkillResult<Option<ResponseEnvelope>> {
        let envelope: RequestEnvelope =
            serde_json::from_value(event).map_err(|e| SkillError::malformed_event(e.to_string()))?;
        self.handle(&envelope)
    }

    /// Handle an event document given as text and render the reply
    ///
    /// The reply is pretty-printed JSON; requests without a response render
    /// as `null`.
    pub fn invoke_str(&self, raw: &str) -> SkillResult<String> {
        let event: Value =
            serde_json::from_str(raw).map_err(|e| SkillError::malformed_event(e.to_string()))?;
        let response = self.handle_json(event)?;
        Ok(serde_json::to_string_pretty(&response)?)
    }

    /// Handle one event
    ///
    /// Returns `Ok(None)` for session-ended and unsupported requests, which the
    /// host answers without a body.
    pub fn handle(&self, event: &RequestEnvelope) -> SkillResult<Option<ResponseEnvelope>> {
        let started = Instant::now();
        let skill_event = SkillEvent {
            request_id: event.request.request_id(),
            session_id: &event.session.session_id,
            application_id: &event.session.application.application_id,
        };

        let span = invocation_span!(
            request_id = skill_event.request_id.unwrap_or_default(),
            session_id = skill_event.session_id,
            request_type = event.request.kind()
        );
        let _enter = span.enter();

        debug!(
            application_id = skill_event.application_id,
            "Received skill event"
        );

        let result = self.dispatch(event, &skill_event);
        let outcome = match &result {
            Ok((outcome, _)) => *outcome,
            Err(SkillError::InvalidIntent { .. }) => InvocationOutcome::InvalidIntent,
            Err(_) => InvocationOutcome::Rejected,
        };
        self.observer
            .on_outcome(&skill_event, outcome, started.elapsed());

        result.map(|(_, response)| response)
    }

    fn dispatch(
        &self,
        event: &RequestEnvelope,
        skill_event: &SkillEvent<'_>,
    ) -> SkillResult<(InvocationOutcome, Option<ResponseEnvelope>)> {
        self.verify_application_id(skill_event.application_id)?;

        if event.session.new {
            self.observer.on_session_started(skill_event);
        }

        match &event.request {
            SkillRequest::Launch(_) => {
                self.observer.on_launch(skill_event);
                Ok((InvocationOutcome::Welcome, Some(respond(welcome_response()))))
            }
            SkillRequest::Intent(request) => self.on_intent(request, skill_event),
            SkillRequest::SessionEnded(request) => {
                self.observer
                    .on_session_ended(skill_event, request.reason.as_deref());
                Ok((InvocationOutcome::SessionEnded, None))
            }
            SkillRequest::Unsupported => {
                warn!("Ignoring unsupported request type");
                Ok((InvocationOutcome::Unsupported, None))
            }
        }
    }

    fn on_intent(
        &self,
        request: &IntentRequest,
        skill_event: &SkillEvent<'_>,
    ) -> SkillResult<(InvocationOutcome, Option<ResponseEnvelope>)> {
        let intent = &request.intent;
        self.observer.on_intent(skill_event, &intent.name);

        let (outcome, speechlet) = match intent.name.parse::<SkillIntent>()? {
            SkillIntent::GetMacroNutrition => {
                let breakdown = macros::breakdown_for(intent);
                let outcome = if breakdown.is_some() {
                    InvocationOutcome::Macros
                } else {
                    InvocationOutcome::MacroFallback
                };
                (
                    outcome,
                    macros::macro_response(&intent.name, breakdown.as_ref()),
                )
            }
            SkillIntent::Help => (InvocationOutcome::Help, welcome_response()),
            SkillIntent::Stop | SkillIntent::Cancel => (InvocationOutcome::Halt, halt_response()),
        };

        Ok((outcome, Some(respond(speechlet))))
    }

    fn verify_application_id(&self, received: &str) -> SkillResult<()> {
        match &self.expected_application_id {
            Some(expected) if expected != received => {
                Err(SkillError::invalid_application_id(received))
            }
            _ => Ok(()),
        }
    }
}

impl Default for Skill {
    fn default() -> Self {
        Self::new()
    }
}

fn respond(speechlet: SpeechletResponse) -> ResponseEnvelope {
    build_response(SessionAttributes::new(), speechlet)
}
