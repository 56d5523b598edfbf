//! Fixed-content responses: welcome (also used for help) and halt

use crate::protocol::{build_speechlet_response, SpeechletResponse};

pub const WELCOME_TITLE: &str = "Welcome";

pub const WELCOME_SPEECH: &str = "Welcome to the Alexa Macro Nutrition skill. \
    Please tell me your body weight and total calories by saying, \
    get macros for 140 calories and 2500 calories.";

// Double space before "saying" is part of the shipped prompt.
pub const WELCOME_REPROMPT: &str = "Please tell me your body weight and total calories by  saying, \
    get macros for 140 calories and 2500 calories.";

pub const HALT_TITLE: &str = "Macro Nutrition skill has been canceled";

/// Greeting played on launch and on a help request; keeps the session open
pub fn welcome_response() -> SpeechletResponse {
    build_speechlet_response(WELCOME_TITLE, WELCOME_SPEECH, WELCOME_REPROMPT, false)
}

/// Silent goodbye that closes the session
pub fn halt_response() -> SpeechletResponse {
    build_speechlet_response(HALT_TITLE, "", "", true)
}
