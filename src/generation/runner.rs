//! Timer-driven generation loop for one session.

use crate::generation::overload::TelemetryModel;
use crate::metrics;
use crate::sample::MeasurementSample;
use crate::sink::MeasurementSink;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Emit a progress line every this many written samples.
const PROGRESS_EVERY: u64 = 100;

/// Everything one session's loop needs, moved into the spawned task.
pub struct SessionRunner<R> {
    pub session_id: Uuid,
    pub model: TelemetryModel,
    pub tick_interval: Duration,
    pub circuit_id: String,
    pub sensor_model: String,
    pub sink: Arc<dyn MeasurementSink>,
    pub rng: R,
}

/// Counters reported when a session's loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Samples produced, whether or not the sink accepted them.
    pub emitted: u64,
    pub written: u64,
    pub failed: u64,
    pub overloads: u64,
    pub last_sequence: u64,
}

impl<R: Rng + Send> SessionRunner<R> {
    /// Tick until `cancel` fires. Sink failures are logged and skipped.
    pub async fn run(mut self, cancel: CancellationToken) -> SessionSummary {
        // First sample lands one full period after start.
        let mut ticker = time::interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut state = self.model.initial_state();
        let mut summary = SessionSummary::default();
        let mut sequence: u64 = 0;

        debug!(session = %self.session_id, sink = self.sink.name(), "generation loop ticking");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let (reading, next) = self.model.next(state, &mut self.rng);
            state = next;
            sequence += 1;

            let sample = MeasurementSample {
                sequence,
                measurement_time: MeasurementSample::capture_time(),
                current_value: reading.current,
                voltage_value: reading.voltage,
                circuit_id: self.circuit_id.clone(),
                sensor_model: self.sensor_model.clone(),
                is_overload: reading.is_overload,
            };

            summary.emitted += 1;
            summary.last_sequence = sequence;
            if reading.is_overload {
                summary.overloads += 1;
                metrics::OVERLOAD_SAMPLES.inc();
            }

            let timer = metrics::SINK_WRITE_LATENCY.start_timer();
            let result = self.sink.insert(sample).await;
            timer.observe_duration();

            match result {
                Ok(()) => {
                    summary.written += 1;
                    metrics::SAMPLES_WRITTEN.inc();
                    if summary.written % PROGRESS_EVERY == 0 {
                        info!(
                            session = %self.session_id,
                            written = summary.written,
                            sequence,
                            current = reading.current,
                            voltage = reading.voltage,
                            overload = reading.is_overload,
                            "generation progress"
                        );
                    }
                }
                Err(err) => {
                    summary.failed += 1;
                    metrics::WRITE_FAILURES.inc();
                    warn!(
                        session = %self.session_id,
                        sequence,
                        current = reading.current,
                        voltage = reading.voltage,
                        overload = reading.is_overload,
                        error = %err,
                        "sample write failed"
                    );
                }
            }
        }

        info!(
            session = %self.session_id,
            emitted = summary.emitted,
            written = summary.written,
            failed = summary.failed,
            overloads = summary.overloads,
            "generation stopped"
        );
        summary
    }
}
