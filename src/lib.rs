//! Macro Nutrition Skill
//!
//! A voice-assistant skill that turns a daily calorie budget and a body
//! weight into protein, carbohydrate and fat targets.
//!
//! # Overview
//!
//! - [`protocol`]: incoming event documents and the outgoing response envelope
//! - [`skill`]: request router, macro calculator and fixed responses
//! - [`server`]: warp HTTP endpoint plus health and metrics routes
//! - [`observability`]: `tracing` setup and invocation metrics
//! - [`config`]: TOML configuration
//!
//! # Quick Start
//!
//! ```rust
//! use macroskill::protocol::{
//!     Application, IntentRequest, Intent, RequestEnvelope, Session, SkillRequest,
//! };
//! use macroskill::skill::{NoopObserver, Skill};
//! use std::sync::Arc;
//!
//! let event = RequestEnvelope {
//!     version: Some("1.0".to_string()),
//!     session: Session {
//!         new: true,
//!         session_id: "session-1".to_string(),
//!         application: Application {
//!             application_id: "amzn1.ask.skill.example".to_string(),
//!         },
//!         attributes: None,
//!     },
//!     request: SkillRequest::Intent(IntentRequest {
//!         request_id: "request-1".to_string(),
//!         timestamp: None,
//!         locale: None,
//!         intent: Intent::new("getMacroNutritionIntent")
//!             .with_slot("totalCalories", "2420")
//!             .with_slot("bodyWeight", "135"),
//!     }),
//! };
//!
//! let skill = Skill::new().with_observer(Arc::new(NoopObserver));
//! let envelope = skill.handle(&event).unwrap().unwrap();
//!
//! assert!(!envelope.response.should_end_session);
//! let json = serde_json::to_string(&envelope).unwrap();
//! assert!(json.contains("135 grams of protein, 318 grams of carbs, and 67 grams of fat"));
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod skill;

pub use config::{ConfigError, SkillConfig};
pub use error::{SkillError, SkillResult};
pub use protocol::*;
pub use skill::Skill;
