//! Process-wide Prometheus metrics, registered with the default registry.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, TextEncoder};

pub static SAMPLES_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("eps_samples_written_total", "Samples accepted by the sink").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static WRITE_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("eps_sample_write_failures_total", "Samples the sink rejected").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static OVERLOAD_SAMPLES: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("eps_overload_samples_total", "Samples generated as overload events").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static SESSIONS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("eps_sessions_started_total", "Generation sessions started").unwrap();
    prometheus::register(Box::new(c.clone())).unwrap();
    c
});

pub static GENERATION_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new("eps_generation_active", "1 while a generation session is running").unwrap();
    prometheus::register(Box::new(g.clone())).unwrap();
    g
});

pub static SINK_WRITE_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let h = Histogram::with_opts(HistogramOpts::new(
        "eps_sink_write_duration_seconds",
        "Histogram of sink insert latency",
    ))
    .unwrap();
    prometheus::register(Box::new(h.clone())).unwrap();
    h
});

/// Force registration so every series shows up on the first scrape.
pub fn init() {
    Lazy::force(&SAMPLES_WRITTEN);
    Lazy::force(&WRITE_FAILURES);
    Lazy::force(&OVERLOAD_SAMPLES);
    Lazy::force(&SESSIONS_STARTED);
    Lazy::force(&GENERATION_ACTIVE);
    Lazy::force(&SINK_WRITE_LATENCY);
}

/// Text exposition of the default registry.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %err, "failed to encode metrics");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
