//! Outgoing response envelope and the builders that produce it
//!
//! Every spoken response goes through [`build_speechlet_response`] and
//! [`build_response`]; the resulting JSON shape is what the voice platform
//! renders as speech, a companion-app card and a reprompt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Envelope format version understood by the host
pub const RESPONSE_VERSION: &str = "1.0";

/// Prefix applied to every card title and card content
pub const CARD_PREFIX: &str = "SessionSpeechlet - ";

/// Session attributes passed back to the host; always empty for this skill
pub type SessionAttributes = HashMap<String, Value>;

/// What to say, what to show and whether to keep listening
///
/// Produced fresh per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechletResponse {
    pub output_speech_text: String,
    pub card_title: String,
    pub card_content: String,
    pub reprompt_text: String,
    pub should_end_session: bool,
}

/// Build a speechlet response; the card mirrors the spoken output
pub fn build_speechlet_response(
    title: &str,
    output: &str,
    reprompt_text: &str,
    should_end_session: bool,
) -> SpeechletResponse {
    SpeechletResponse {
        output_speech_text: output.to_string(),
        card_title: title.to_string(),
        card_content: output.to_string(),
        reprompt_text: reprompt_text.to_string(),
        should_end_session,
    }
}

/// Wrap session attributes and a speechlet into the wire envelope
pub fn build_response(
    session_attributes: SessionAttributes,
    speechlet: SpeechletResponse,
) -> ResponseEnvelope {
    ResponseEnvelope {
        version: RESPONSE_VERSION.to_string(),
        session_attributes,
        response: ResponseBody::from(speechlet),
    }
}

/// Wire-level envelope returned to the host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub session_attributes: SessionAttributes,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    pub card: Card,
    pub reprompt: Reprompt,
    pub should_end_session: bool,
}

impl From<SpeechletResponse> for ResponseBody {
    fn from(speechlet: SpeechletResponse) -> Self {
        Self {
            output_speech: OutputSpeech::plain_text(speechlet.output_speech_text),
            card: Card::Simple {
                title: format!("{CARD_PREFIX}{}", speechlet.card_title),
                content: format!("{CARD_PREFIX}{}", speechlet.card_content),
            },
            reprompt: Reprompt {
                output_speech: OutputSpeech::plain_text(speechlet.reprompt_text),
            },
            should_end_session: speechlet.should_end_session,
        }
    }
}

/// Speech rendered by the device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

impl OutputSpeech {
    pub fn plain_text<S: Into<String>>(text: S) -> Self {
        OutputSpeech::PlainText { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            OutputSpeech::PlainText { text } => text,
        }
    }
}

/// Card shown in the companion app
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Card {
    Simple { title: String, content: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = build_response(
            SessionAttributes::new(),
            build_speechlet_response("Welcome", "Hello there", "Still there?", false),
        );

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.0",
                "sessionAttributes": {},
                "response": {
                    "outputSpeech": { "type": "PlainText", "text": "Hello there" },
                    "card": {
                        "type": "Simple",
                        "title": "SessionSpeechlet - Welcome",
                        "content": "SessionSpeechlet - Hello there"
                    },
                    "reprompt": {
                        "outputSpeech": { "type": "PlainText", "text": "Still there?" }
                    },
                    "shouldEndSession": false
                }
            })
        );
    }

    #[test]
    fn test_empty_texts_keep_card_prefix() {
        let envelope = build_response(
            SessionAttributes::new(),
            build_speechlet_response("Done", "", "", true),
        );

        let Card::Simple { title, content } = &envelope.response.card;
        assert_eq!(title, "SessionSpeechlet - Done");
        assert_eq!(content, "SessionSpeechlet - ");
        assert_eq!(envelope.response.output_speech.text(), "");
        assert_eq!(envelope.response.reprompt.output_speech.text(), "");
        assert!(envelope.response.should_end_session);
    }

    #[test]
    fn test_speechlet_card_content_mirrors_output() {
        let speechlet = build_speechlet_response("Title", "Spoken words", "", false);
        assert_eq!(speechlet.card_content, speechlet.output_speech_text);
    }

    #[test]
    fn test_envelope_deserializes_back() {
        let envelope = build_response(
            SessionAttributes::new(),
            build_speechlet_response("t", "o", "r", true),
        );
        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: ResponseEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }
}
