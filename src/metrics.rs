//! Prometheus metrics collection for command-hub.
//!
//! Metrics live in a process-wide registry. Recording helpers are no-ops
//! until [`init`] has run, so library users that never call it pay nothing.
//!
//! - `command_hub_command_total{command}` - Commands dispatched by name
//! - `command_hub_command_duration_seconds{command}` - Handler latency histogram
//! - `command_hub_command_errors_total{command,error}` - Dispatch failures by kind
//! - `command_hub_broadcast_fanout` - Subscribers reached per broadcast
//! - `command_hub_envelopes_sent_total` / `_failed_total` - Connection sends
//! - `command_hub_subscriptions` - Live (connection, command) pairings

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Dispatch
// ========================================================================

/// Commands executed by name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command handler latency by name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Command errors by name and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Subscriptions
// ========================================================================

/// Subscribers reached per broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Envelopes written to connections.
pub static ENVELOPES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Envelopes a connection refused.
pub static ENVELOPES_FAILED: OnceLock<IntCounter> = OnceLock::new();

/// Live subscription pairings.
pub static SUBSCRIPTIONS: OnceLock<IntGauge> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the Prometheus metrics registry.
///
/// Idempotent. Concurrent callers wait for the first initialization.
pub fn init() {
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => match r.register(Box::new(m.clone())) {
                    Ok(()) => {
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                },
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("command_hub_command_total", "Commands executed by name"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("command_hub_command_duration_seconds", "Command handler latency by name")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("command_hub_command_errors_total", "Command errors by name and kind"), &["command", "error"]));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("command_hub_broadcast_fanout", "Subscribers reached per broadcast")
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0])));
    register!(ENVELOPES_SENT, IntCounter::new("command_hub_envelopes_sent_total", "Envelopes written to connections"));
    register!(ENVELOPES_FAILED, IntCounter::new("command_hub_envelopes_failed_total", "Envelopes a connection refused"));
    register!(SUBSCRIPTIONS, IntGauge::new("command_hub_subscriptions", "Live subscription pairings"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record broadcast fan-out (how many subscribers one broadcast reached).
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

/// Record the outcome of one envelope send.
#[inline]
pub fn record_envelope(sent: bool) {
    let counter = if sent { &ENVELOPES_SENT } else { &ENVELOPES_FAILED };
    if let Some(c) = counter.get() {
        c.inc();
    }
}

/// Update the live subscription gauge.
#[inline]
pub fn set_subscriptions(count: usize) {
    if let Some(g) = SUBSCRIPTIONS.get() {
        g.set(count as i64);
    }
}
