//! Generator configuration.
//!
//! Defaults reproduce the constants of the field-deployed generator: a 25 ms
//! cadence, a 1.8–2.6 A current band and a 2–10 V voltage band.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Shape of one simulated channel (current or voltage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelProfile {
    /// Lower edge of the nominal band the trend is clamped to.
    pub base_min: f64,
    /// Upper edge of the nominal band the trend is clamped to.
    pub base_max: f64,
    /// Trend movement per tick (multiplied by the direction).
    pub trend_step: f64,
    /// Probability of flipping direction when the countdown expires.
    pub flip_probability: f64,
    /// Countdown is redrawn uniformly from `trend_min_ticks..trend_max_ticks`.
    pub trend_min_ticks: u32,
    pub trend_max_ticks: u32,
    /// Half-width of the uniform noise added around the trend.
    pub noise_half_width: f64,
    pub spike_probability: f64,
    pub spike_max: f64,
    /// Standard deviation of the gaussian jitter.
    pub gaussian_sigma: f64,
    /// How far past `base_min`/`base_max` a reading may wander.
    pub overshoot: f64,
    /// Width of the re-randomization window just inside the overshoot edge.
    pub rebound_width: f64,
}

impl ChannelProfile {
    pub fn current() -> Self {
        Self {
            base_min: 1.8,
            base_max: 2.6,
            trend_step: 0.005,
            flip_probability: 0.3,
            trend_min_ticks: 50,
            trend_max_ticks: 200,
            noise_half_width: 0.05,
            spike_probability: 0.05,
            spike_max: 0.3,
            gaussian_sigma: 0.02,
            overshoot: 0.2,
            rebound_width: 0.1,
        }
    }

    pub fn voltage() -> Self {
        Self {
            base_min: 2.0,
            base_max: 10.0,
            trend_step: 0.02,
            flip_probability: 0.3,
            trend_min_ticks: 50,
            trend_max_ticks: 200,
            noise_half_width: 0.05,
            spike_probability: 0.05,
            spike_max: 0.5,
            gaussian_sigma: 0.05,
            overshoot: 0.3,
            rebound_width: 0.15,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.base_min + self.base_max) / 2.0
    }

    /// Soft band non-overload readings are kept inside.
    pub fn soft_band(&self) -> (f64, f64) {
        (self.base_min - self.overshoot, self.base_max + self.overshoot)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !(self.base_min < self.base_max) {
            return Err(ConfigError::invalid(
                format!("{name}.base_min"),
                format!("must be below base_max ({} >= {})", self.base_min, self.base_max),
            ));
        }
        if self.trend_min_ticks == 0 || self.trend_min_ticks >= self.trend_max_ticks {
            return Err(ConfigError::invalid(
                format!("{name}.trend_min_ticks"),
                "must be positive and below trend_max_ticks",
            ));
        }
        for (field, p) in [
            ("flip_probability", self.flip_probability),
            ("spike_probability", self.spike_probability),
        ] {
            check_probability(&format!("{name}.{field}"), p)?;
        }
        for (field, v) in [
            ("trend_step", self.trend_step),
            ("noise_half_width", self.noise_half_width),
            ("spike_max", self.spike_max),
            ("gaussian_sigma", self.gaussian_sigma),
            ("overshoot", self.overshoot),
            ("rebound_width", self.rebound_width),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::invalid(
                    format!("{name}.{field}"),
                    "must be a finite, non-negative number",
                ));
            }
        }
        if self.rebound_width > self.overshoot * 2.0 + (self.base_max - self.base_min) {
            return Err(ConfigError::invalid(
                format!("{name}.rebound_width"),
                "must fit inside the soft band",
            ));
        }
        Ok(())
    }
}

/// Fault injection settings shared by both channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverloadProfile {
    /// Per-tick probability of a circuit-wide fault.
    pub probability: f64,
    /// Short-circuit / open-circuit current readings.
    pub current_values: Vec<f64>,
    /// Surge / brown-out voltage readings.
    pub voltage_values: Vec<f64>,
}

impl Default for OverloadProfile {
    fn default() -> Self {
        Self {
            probability: 0.08,
            current_values: vec![9.123, 0.045, 8.765, 0.123, 7.891, 0.234, 10.456, 0.067],
            voltage_values: vec![0.5, 15.0, 0.1, 18.0, 0.05, 20.0, 0.01, 25.0],
        }
    }
}

impl OverloadProfile {
    /// Profile that never injects a fault.
    pub fn disabled() -> Self {
        Self {
            probability: 0.0,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_probability("overload.probability", self.probability)?;
        if self.current_values.is_empty() {
            return Err(ConfigError::invalid("overload.current_values", "must not be empty"));
        }
        if self.voltage_values.is_empty() {
            return Err(ConfigError::invalid("overload.voltage_values", "must not be empty"));
        }
        Ok(())
    }
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Timer period in milliseconds (default: 25)
    pub tick_interval_ms: u64,
    pub circuit_id: String,
    pub sensor_model: String,
    /// Fixed RNG seed; every session replays the same stream when set.
    pub seed: Option<u64>,
    pub current: ChannelProfile,
    pub voltage: ChannelProfile,
    pub overload: OverloadProfile,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 25,
            circuit_id: "circuit_B".to_string(),
            sensor_model: "I-Sensor-Pro".to_string(),
            seed: None,
            current: ChannelProfile::current(),
            voltage: ChannelProfile::voltage(),
            overload: OverloadProfile::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON config file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("tick_interval_ms", "must be > 0"));
        }
        self.current.validate("current")?;
        self.voltage.validate("voltage")?;
        self.overload.validate()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn check_probability(field: &str, p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{p} is not a probability")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(25));
        assert!((config.current.midpoint() - 2.2).abs() < 1e-12);
        assert!((config.voltage.midpoint() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"circuit_id": "circuit_A", "seed": 7}"#).unwrap();
        assert_eq!(config.circuit_id, "circuit_A");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.current, ChannelProfile::current());
        assert_eq!(config.voltage, ChannelProfile::voltage());
        assert_eq!(config.tick_interval_ms, 25);
    }

    #[test]
    fn channel_objects_must_be_complete() {
        let parsed: Result<GeneratorConfig, _> =
            serde_json::from_str(r#"{"voltage": {"base_max": 12.0}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_inverted_band() {
        let mut config = GeneratorConfig::default();
        config.current.base_min = 3.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("current.base_min"));
    }

    #[test]
    fn rejects_empty_anomaly_set() {
        let mut config = GeneratorConfig::default();
        config.overload.voltage_values.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field, .. }) if field == "overload.voltage_values"
        ));
    }

    #[test]
    fn rejects_bad_probability_and_zero_tick() {
        let mut config = GeneratorConfig::default();
        config.overload.probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.json");
        std::fs::write(&path, r#"{"tick_interval_ms": 10, "overload": {"probability": 0.0}}"#).unwrap();

        let config = GeneratorConfig::from_json_file(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 10);
        assert_eq!(config.overload.probability, 0.0);
        assert_eq!(config.overload.current_values.len(), 8);
    }
}
