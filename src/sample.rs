use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// One emitted measurement. Built once per tick and handed to the sink by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    pub sequence: u64,
    pub measurement_time: DateTime<Utc>,
    pub current_value: f64,
    pub voltage_value: f64,
    pub circuit_id: String,
    pub sensor_model: String,
    pub is_overload: bool,
}

impl MeasurementSample {
    /// Wall-clock capture time truncated to milliseconds.
    pub fn capture_time() -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    /// `HH:MM:SS.mmm`, the label stored by the measurements table.
    pub fn time_label(&self) -> String {
        self.measurement_time.format("%H:%M:%S%.3f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_label_has_millisecond_precision() {
        let sample = MeasurementSample {
            sequence: 1,
            measurement_time: Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap()
                + chrono::Duration::milliseconds(42),
            current_value: 2.2,
            voltage_value: 6.0,
            circuit_id: "circuit_B".into(),
            sensor_model: "I-Sensor-Pro".into(),
            is_overload: false,
        };
        assert_eq!(sample.time_label(), "14:05:09.042");
    }

    #[test]
    fn capture_time_drops_sub_millisecond_digits() {
        let t = MeasurementSample::capture_time();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
