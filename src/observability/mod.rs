//! Observability for the macro nutrition skill
//!
//! Structured logging through `tracing` and process-wide invocation metrics.

pub mod logging;
pub mod metrics;

// Re-export for convenience
pub use logging::{LogFormat, init_default_logging, init_logging};
pub use metrics::{MetricsCollector, MetricsSnapshot, metrics};

// Span macro for structured logging
pub use logging::invocation_span;
