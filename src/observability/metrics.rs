//! Thread-safe metrics collection system
//!
//! Atomic counters for every invocation outcome plus a bounded window of
//! processing times. Exposed over HTTP as a [`MetricsSnapshot`].

use crate::skill::observer::InvocationOutcome;
use crate::skill::SkillIntent;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Processing times kept for percentile calculation
const MAX_PROCESSING_SAMPLES: usize = 1000;

/// Bucket for every intent name the skill does not handle
pub const UNKNOWN_INTENT_KEY: &str = "unknown";

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

/// Thread-safe metrics collector using atomics and mutexes
pub struct MetricsCollector {
    // Invocation outcomes
    invocations: AtomicU64,
    welcomes: AtomicU64,
    help_requests: AtomicU64,
    macro_calculations: AtomicU64,
    macro_fallbacks: AtomicU64,
    halts: AtomicU64,
    unsupported_requests: AtomicU64,
    invalid_intents: AtomicU64,
    rejected: AtomicU64,

    // Session lifecycle
    sessions_started: AtomicU64,
    sessions_ended: AtomicU64,

    // Processing times in microseconds (mutex protected)
    processing_times: Mutex<Vec<u64>>,

    // Known intents by name, everything else under UNKNOWN_INTENT_KEY
    intent_counts: Mutex<HashMap<&'static str, u64>>,

    uptime_start: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            invocations: AtomicU64::new(0),
            welcomes: AtomicU64::new(0),
            help_requests: AtomicU64::new(0),
            macro_calculations: AtomicU64::new(0),
            macro_fallbacks: AtomicU64::new(0),
            halts: AtomicU64::new(0),
            unsupported_requests: AtomicU64::new(0),
            invalid_intents: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            sessions_started: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            processing_times: Mutex::new(Vec::new()),
            intent_counts: Mutex::new(HashMap::new()),
            uptime_start: AtomicU64::new(current_timestamp()),
        }
    }

    // Session lifecycle metrics
    pub fn session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_ended(&self) {
        self.sessions_ended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn intent_received(&self, intent_name: &str) {
        if let Ok(mut counts) = self.intent_counts.lock() {
            *counts.entry(intent_key(intent_name)).or_insert(0) += 1;
        }
    }

    /// Record the outcome of one invocation
    pub fn invocation_completed(&self, outcome: InvocationOutcome, duration: Duration) {
        self.invocations.fetch_add(1, Ordering::Relaxed);

        let counter = match outcome {
            InvocationOutcome::Welcome => &self.welcomes,
            InvocationOutcome::Help => &self.help_requests,
            InvocationOutcome::Macros => &self.macro_calculations,
            InvocationOutcome::MacroFallback => &self.macro_fallbacks,
            InvocationOutcome::Halt => &self.halts,
            // Counted through `session_ended`
            InvocationOutcome::SessionEnded => {
                self.record_processing_time(duration);
                return;
            }
            InvocationOutcome::Unsupported => &self.unsupported_requests,
            InvocationOutcome::InvalidIntent => &self.invalid_intents,
            InvocationOutcome::Rejected => &self.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        self.record_processing_time(duration);
    }

    fn record_processing_time(&self, duration: Duration) {
        if let Ok(mut times) = self.processing_times.lock() {
            times.push(duration.as_micros() as u64);

            if times.len() > MAX_PROCESSING_SAMPLES {
                times.remove(0);
            }
        }
    }

    // Reset all metrics (useful for testing)
    pub fn reset(&self) {
        for counter in [
            &self.invocations,
            &self.welcomes,
            &self.help_requests,
            &self.macro_calculations,
            &self.macro_fallbacks,
            &self.halts,
            &self.unsupported_requests,
            &self.invalid_intents,
            &self.rejected,
            &self.sessions_started,
            &self.sessions_ended,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        self.uptime_start
            .store(current_timestamp(), Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.lock() {
            times.clear();
        }
        if let Ok(mut counts) = self.intent_counts.lock() {
            counts.clear();
        }
    }

    /// Calculate processing time statistics (avg, p50, p95, p99)
    fn calculate_processing_time_statistics(&self) -> (f64, f64, f64, f64) {
        if let Ok(times) = self.processing_times.lock() {
            if times.is_empty() {
                (0.0, 0.0, 0.0, 0.0)
            } else {
                let mut sorted_times = times.clone();
                sorted_times.sort_unstable();

                let avg = sorted_times.iter().sum::<u64>() as f64 / sorted_times.len() as f64;
                let p50 = percentile(&sorted_times, 50.0);
                let p95 = percentile(&sorted_times, 95.0);
                let p99 = percentile(&sorted_times, 99.0);

                (avg, p50, p95, p99)
            }
        } else {
            (0.0, 0.0, 0.0, 0.0)
        }
    }

    /// Get complete metrics snapshot
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let (avg_processing_time_us, p50, p95, p99) = self.calculate_processing_time_statistics();
        let intents = self
            .intent_counts
            .lock()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(name, count)| (name.to_string(), *count))
                    .collect()
            })
            .unwrap_or_default();

        MetricsSnapshot {
            invocations: InvocationMetrics {
                total: self.invocations.load(Ordering::Relaxed),
                welcomes: self.welcomes.load(Ordering::Relaxed),
                help_requests: self.help_requests.load(Ordering::Relaxed),
                macro_calculations: self.macro_calculations.load(Ordering::Relaxed),
                macro_fallbacks: self.macro_fallbacks.load(Ordering::Relaxed),
                halts: self.halts.load(Ordering::Relaxed),
                unsupported_requests: self.unsupported_requests.load(Ordering::Relaxed),
                invalid_intents: self.invalid_intents.load(Ordering::Relaxed),
                rejected: self.rejected.load(Ordering::Relaxed),
                avg_processing_time_us,
                processing_time_p50_us: p50,
                processing_time_p95_us: p95,
                processing_time_p99_us: p99,
            },
            sessions: SessionMetrics {
                started: self.sessions_started.load(Ordering::Relaxed),
                ended: self.sessions_ended.load(Ordering::Relaxed),
            },
            intents,
            uptime_seconds: now.saturating_sub(self.uptime_start.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }
}

/// Map caller-supplied intent names onto a fixed key set
fn intent_key(intent_name: &str) -> &'static str {
    intent_name
        .parse::<SkillIntent>()
        .map(|intent| intent.name())
        .unwrap_or(UNKNOWN_INTENT_KEY)
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

// Public metrics structures
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub invocations: InvocationMetrics,
    pub sessions: SessionMetrics,
    pub intents: HashMap<String, u64>,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct InvocationMetrics {
    pub total: u64,
    pub welcomes: u64,
    pub help_requests: u64,
    pub macro_calculations: u64,
    pub macro_fallbacks: u64,
    pub halts: u64,
    pub unsupported_requests: u64,
    pub invalid_intents: u64,
    pub rejected: u64,
    pub avg_processing_time_us: f64,
    pub processing_time_p50_us: f64,
    pub processing_time_p95_us: f64,
    pub processing_time_p99_us: f64,
}

#[derive(Debug, Serialize)]
pub struct SessionMetrics {
    pub started: u64,
    pub ended: u64,
}

// Helper functions
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn percentile(sorted_data: &[u64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let len = sorted_data.len();
    let index = (percentile / 100.0) * (len - 1) as f64;

    if index.fract() == 0.0 {
        sorted_data[index as usize] as f64
    } else {
        let lower_index = index.floor() as usize;
        let upper_index = index.ceil() as usize;
        let lower_value = sorted_data[lower_index] as f64;
        let upper_value = sorted_data[upper_index] as f64;

        lower_value + (upper_value - lower_value) * index.fract()
    }
}
