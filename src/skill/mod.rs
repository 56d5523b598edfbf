//! Skill logic: request routing, macro calculation and fixed responses

pub mod macros;
pub mod observer;
pub mod responses;
pub mod router;

pub use macros::{get_macros, MacroBreakdown};
pub use observer::{
    InvocationOutcome, NoopObserver, RecordedNotification, RecordingObserver, SkillEvent,
    SkillObserver, TracingObserver,
};
pub use responses::{halt_response, welcome_response};
pub use router::{Skill, SkillIntent};
