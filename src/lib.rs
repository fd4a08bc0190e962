//! # eps-generator
//!
//! Synthetic electrical telemetry for the EPS dashboard: a background session
//! fabricates current/voltage readings every 25 ms and hands them to a sink,
//! with start/stop/status exposed over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  api (axum)  ──▶  GenerationController  (one session max)    │
//! │                        │ spawn + CancellationToken           │
//! │                        ▼                                     │
//! │                 SessionRunner  ── tick ──▶ TelemetryModel     │
//! │                        │                  (trend walk +      │
//! │                        │                   overload faults)  │
//! │                        ▼                                     │
//! │                 MeasurementSink (memory / jsonl)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eps_generator::{GenerationController, GeneratorConfig, MemorySink};
//!
//! # async fn demo() {
//! let sink = Arc::new(MemorySink::new());
//! let controller = GenerationController::new(GeneratorConfig::default(), sink.clone()).unwrap();
//! controller.start().unwrap();
//! tokio::time::sleep(std::time::Duration::from_millis(250)).await;
//! controller.stop().unwrap();
//! println!("{} samples", sink.len());
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod generation;
pub mod metrics;
pub mod sample;
pub mod sink;

pub use api::{ApiConfig, router};
pub use config::{ChannelProfile, GeneratorConfig, OverloadProfile};
pub use error::{ConfigError, GenerationError, SinkError};
pub use generation::{
    ChannelState, CircuitState, GenerationController, GenerationState, GenerationStatus, Reading,
    SessionSummary, TelemetryModel,
};
pub use sample::MeasurementSample;
pub use sink::{JsonLinesSink, MeasurementSink, MemorySink};
