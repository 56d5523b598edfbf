//! Wire types exchanged with the voice platform
//!
//! `request` models the incoming event document, `response` the envelope the
//! skill hands back.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
