//! Circuit-wide fault injection on top of the per-channel model.

use crate::config::{ChannelProfile, GeneratorConfig, OverloadProfile};
use crate::generation::channel::ChannelState;
use rand::Rng;

/// Trend state for both channels of one circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircuitState {
    pub current: ChannelState,
    pub voltage: ChannelState,
}

/// Values produced for one tick, before sequencing and timestamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub current: f64,
    pub voltage: f64,
    pub is_overload: bool,
}

/// Two-channel sample model with overload injection.
#[derive(Debug, Clone)]
pub struct TelemetryModel {
    current: ChannelProfile,
    voltage: ChannelProfile,
    overload: OverloadProfile,
}

impl TelemetryModel {
    pub fn new(current: ChannelProfile, voltage: ChannelProfile, overload: OverloadProfile) -> Self {
        Self {
            current,
            voltage,
            overload,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.current.clone(),
            config.voltage.clone(),
            config.overload.clone(),
        )
    }

    pub fn current_profile(&self) -> &ChannelProfile {
        &self.current
    }

    pub fn voltage_profile(&self) -> &ChannelProfile {
        &self.voltage
    }

    pub fn overload_profile(&self) -> &OverloadProfile {
        &self.overload
    }

    /// Starting state for a new session.
    pub fn initial_state(&self) -> CircuitState {
        CircuitState {
            current: ChannelState::centered(&self.current),
            voltage: ChannelState::centered(&self.voltage),
        }
    }

    /// One tick: a single fault draw shared by both channels, then either the
    /// anomaly values with both trends reset, or the normal walk on each channel.
    pub fn next<R: Rng + ?Sized>(&self, state: CircuitState, rng: &mut R) -> (Reading, CircuitState) {
        if rng.random_bool(self.overload.probability) {
            let current = pick(&self.overload.current_values, rng);
            let voltage = pick(&self.overload.voltage_values, rng);
            let recovered = CircuitState {
                current: ChannelState::recovered(&self.current, rng),
                voltage: ChannelState::recovered(&self.voltage, rng),
            };
            let reading = Reading {
                current,
                voltage,
                is_overload: true,
            };
            return (reading, recovered);
        }

        let (current, current_state) = state.current.advance(&self.current, rng);
        let (voltage, voltage_state) = state.voltage.advance(&self.voltage, rng);
        let reading = Reading {
            current,
            voltage,
            is_overload: false,
        };
        (
            reading,
            CircuitState {
                current: current_state,
                voltage: voltage_state,
            },
        )
    }
}

impl Default for TelemetryModel {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

// Anomaly sets are validated non-empty by the config; fall back to NaN rather
// than panic if a caller builds a model by hand with an empty set.
fn pick<R: Rng + ?Sized>(values: &[f64], rng: &mut R) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values[rng.random_range(0..values.len())]
}
