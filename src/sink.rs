//! Persistence collaborators for emitted samples.
//!
//! The generator only needs `insert`; what happens behind it is up to the sink.

use crate::error::SinkError;
use crate::sample::MeasurementSample;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

/// Destination for generated samples.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether the sink can accept writes right now. Checked before a session starts.
    fn check_ready(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Store one sample. Ownership moves to the sink.
    async fn insert(&self, sample: MeasurementSample) -> Result<(), SinkError>;
}

/// Keeps every sample in memory.
#[derive(Debug)]
pub struct MemorySink {
    samples: Mutex<Vec<MeasurementSample>>,
    available: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle availability; an unavailable sink rejects writes and fails `check_ready`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<MeasurementSample> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MeasurementSample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MeasurementSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn check_ready(&self) -> Result<(), SinkError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SinkError::Unavailable("memory sink is disabled".to_string()))
        }
    }

    async fn insert(&self, sample: MeasurementSample) -> Result<(), SinkError> {
        self.check_ready()?;
        self.lock().push(sample);
        Ok(())
    }
}

/// Row layout written by [`JsonLinesSink`].
#[derive(Serialize)]
struct MeasurementRow<'a> {
    id: u64,
    measurement_time: String,
    captured_at: String,
    current_value: f64,
    voltage_value: f64,
    circuit_id: &'a str,
    sensor_model: &'a str,
    is_overload: bool,
}

impl<'a> From<&'a MeasurementSample> for MeasurementRow<'a> {
    fn from(sample: &'a MeasurementSample) -> Self {
        Self {
            id: sample.sequence,
            measurement_time: sample.time_label(),
            captured_at: sample
                .measurement_time
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            current_value: sample.current_value,
            voltage_value: sample.voltage_value,
            circuit_id: &sample.circuit_id,
            sensor_model: &sample.sensor_model,
            is_overload: sample.is_overload,
        }
    }
}

/// Appends one JSON object per sample to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    file: tokio::sync::Mutex<Option<tokio::fs::File>>,
    open: AtomicBool,
}

impl JsonLinesSink {
    /// Open (or create) `path` for appending.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(Some(file)),
            open: AtomicBool::new(true),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and release the file. Later writes fail with `Unavailable`.
    pub async fn close(&self) -> Result<(), SinkError> {
        self.open.store(false, Ordering::SeqCst);
        if let Some(mut file) = self.file.lock().await.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MeasurementSink for JsonLinesSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn check_ready(&self) -> Result<(), SinkError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SinkError::Unavailable(format!(
                "{} has been closed",
                self.path.display()
            )))
        }
    }

    async fn insert(&self, sample: MeasurementSample) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(&MeasurementRow::from(&sample))?;
        line.push(b'\n');

        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or_else(|| {
            SinkError::Unavailable(format!("{} has been closed", self.path.display()))
        })?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
