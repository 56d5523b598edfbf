//! Incoming skill event types
//!
//! The voice platform delivers one JSON document per interaction. Only the
//! fields the skill reads are modelled; everything else is ignored on
//! deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level event document delivered by the host
///
/// # Examples
/// ```
/// use macroskill::protocol::{RequestEnvelope, SkillRequest};
/// use serde_json::json;
///
/// let event: RequestEnvelope = serde_json::from_value(json!({
///     "session": {
///         "new": true,
///         "sessionId": "session-1",
///         "application": { "applicationId": "amzn1.ask.skill.test" }
///     },
///     "request": { "type": "LaunchRequest", "requestId": "req-1" }
/// }))
/// .unwrap();
///
/// assert!(event.session.new);
/// assert!(matches!(event.request, SkillRequest::Launch(_)));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestEnvelope {
    /// Event format version, usually "1.0"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub session: Session,
    pub request: SkillRequest,
}

/// Host-managed conversational session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// True on the first event of a session
    pub new: bool,
    pub session_id: String,
    pub application: Application,
    /// Attributes echoed back by the host; never read by the skill
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

/// Request payload, tagged by its `type` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SkillRequest {
    #[serde(rename = "LaunchRequest")]
    Launch(LaunchRequest),
    #[serde(rename = "IntentRequest")]
    Intent(IntentRequest),
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded(SessionEndedRequest),
    /// Any request type this skill does not handle
    #[serde(other)]
    Unsupported,
}

impl SkillRequest {
    /// Request identifier, absent only for unsupported request types
    pub fn request_id(&self) -> Option<&str> {
        match self {
            SkillRequest::Launch(r) => Some(&r.request_id),
            SkillRequest::Intent(r) => Some(&r.request_id),
            SkillRequest::SessionEnded(r) => Some(&r.request_id),
            SkillRequest::Unsupported => None,
        }
    }

    /// Wire name of the request type, used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SkillRequest::Launch(_) => "LaunchRequest",
            SkillRequest::Intent(_) => "IntentRequest",
            SkillRequest::SessionEnded(_) => "SessionEndedRequest",
            SkillRequest::Unsupported => "Unsupported",
        }
    }
}

/// User opened the skill without asking for anything
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// User asked for something the language model resolved to an intent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub intent: Intent,
}

/// Session closed by the host or the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Host-supplied reason such as "USER_INITIATED" or "ERROR"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Named user request with its slot values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            slots: HashMap::new(),
        }
    }

    /// Builder helper used by hosts and tests to attach a filled slot
    pub fn with_slot<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        let name = name.into();
        self.slots.insert(
            name.clone(),
            Slot {
                name: Some(name),
                value: Some(value.into()),
            },
        );
        self
    }

    /// Value of a slot, `None` when the slot is absent or was left unfilled
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.get(name).and_then(|slot| slot.value.as_deref())
    }
}

/// Slot extracted from user speech; the host sends unfilled slots without a value
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session_json() -> Value {
        json!({
            "new": false,
            "sessionId": "session-42",
            "application": { "applicationId": "amzn1.ask.skill.macro" },
            "attributes": {},
            "user": { "userId": "amzn1.ask.account.someone" }
        })
    }

    #[test]
    fn test_intent_request_deserializes_with_slots() {
        let event: RequestEnvelope = serde_json::from_value(json!({
            "version": "1.0",
            "session": session_json(),
            "request": {
                "type": "IntentRequest",
                "requestId": "req-7",
                "locale": "en-US",
                "intent": {
                    "name": "getMacroNutritionIntent",
                    "slots": {
                        "totalCalories": { "name": "totalCalories", "value": "2420" },
                        "bodyWeight": { "name": "bodyWeight", "value": "135" }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(event.version.as_deref(), Some("1.0"));
        assert_eq!(event.session.session_id, "session-42");
        assert_eq!(
            event.session.application.application_id,
            "amzn1.ask.skill.macro"
        );

        match event.request {
            SkillRequest::Intent(request) => {
                assert_eq!(request.request_id, "req-7");
                assert_eq!(request.intent.name, "getMacroNutritionIntent");
                assert_eq!(request.intent.slot_value("totalCalories"), Some("2420"));
                assert_eq!(request.intent.slot_value("bodyWeight"), Some("135"));
            }
            other => panic!("expected intent request, got {other:?}"),
        }
    }

    #[test]
    fn test_unfilled_slot_has_no_value() {
        let intent: Intent = serde_json::from_value(json!({
            "name": "getMacroNutritionIntent",
            "slots": { "bodyWeight": { "name": "bodyWeight" } }
        }))
        .unwrap();

        assert!(intent.slots.contains_key("bodyWeight"));
        assert_eq!(intent.slot_value("bodyWeight"), None);
        assert_eq!(intent.slot_value("totalCalories"), None);
    }

    #[test]
    fn test_intent_without_slots_field() {
        let intent: Intent = serde_json::from_value(json!({ "name": "AMAZON.HelpIntent" })).unwrap();
        assert!(intent.slots.is_empty());
    }

    #[test]
    fn test_session_ended_request_with_reason() {
        let request: SkillRequest = serde_json::from_value(json!({
            "type": "SessionEndedRequest",
            "requestId": "req-end",
            "reason": "USER_INITIATED"
        }))
        .unwrap();

        assert_eq!(request.kind(), "SessionEndedRequest");
        assert_eq!(request.request_id(), Some("req-end"));
        match request {
            SkillRequest::SessionEnded(ended) => {
                assert_eq!(ended.reason.as_deref(), Some("USER_INITIATED"))
            }
            other => panic!("expected session ended request, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_request_type_is_unsupported() {
        let request: SkillRequest = serde_json::from_value(json!({
            "type": "CanFulfillIntentRequest",
            "requestId": "req-cf"
        }))
        .unwrap();

        assert_eq!(request, SkillRequest::Unsupported);
        assert_eq!(request.request_id(), None);
    }

    #[test]
    fn test_missing_session_is_rejected() {
        let result: Result<RequestEnvelope, _> = serde_json::from_value(json!({
            "request": { "type": "LaunchRequest", "requestId": "req-1" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_slot_builder() {
        let intent = Intent::new("getMacroNutritionIntent").with_slot("bodyWeight", "150");
        assert_eq!(intent.slot_value("bodyWeight"), Some("150"));
        assert_eq!(
            intent.slots["bodyWeight"].name.as_deref(),
            Some("bodyWeight")
        );
    }
}
