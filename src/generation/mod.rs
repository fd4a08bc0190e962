//! Synthetic current/voltage generation.
//!
//! ```text
//! GenerationController ──start──▶ SessionRunner (tokio task)
//!        │                            │ every tick
//!        │ cancel                     ▼
//!        └──────────────▶  TelemetryModel ──▶ ChannelState × 2
//!                                     │
//!                                     ▼
//!                              MeasurementSink
//! ```

pub mod channel;
pub mod controller;
pub mod overload;
pub mod runner;

pub use channel::{ChannelState, round_milli};
pub use controller::{GenerationController, GenerationState, GenerationStatus};
pub use overload::{CircuitState, Reading, TelemetryModel};
pub use runner::{SessionRunner, SessionSummary};
