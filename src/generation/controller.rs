//! Lifecycle manager for the single generation session.
//!
//! Start, stop and status all go through one lock. The running session owns
//! its cancellation token; the loop only ever reads it.

use crate::config::GeneratorConfig;
use crate::error::{ConfigError, GenerationError};
use crate::generation::overload::TelemetryModel;
use crate::generation::runner::{SessionRunner, SessionSummary};
use crate::metrics;
use crate::sink::MeasurementSink;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle state of the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Idle,
    Running,
}

impl GenerationState {
    /// Label reported over the control API.
    pub fn label(self) -> &'static str {
        match self {
            GenerationState::Idle => "stopped",
            GenerationState::Running => "running",
        }
    }
}

/// Snapshot returned by [`GenerationController::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationStatus {
    pub is_generating: bool,
    pub state: GenerationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl GenerationStatus {
    pub fn label(&self) -> &'static str {
        self.state.label()
    }
}

struct ActiveSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    task: JoinHandle<SessionSummary>,
}

enum Session {
    Idle,
    Running(ActiveSession),
}

/// Owns the generator's lifecycle. Share it behind an `Arc`.
pub struct GenerationController {
    config: GeneratorConfig,
    model: TelemetryModel,
    sink: Arc<dyn MeasurementSink>,
    session: Mutex<Session>,
}

impl GenerationController {
    /// Rejects a config that would make the loop panic once spawned.
    pub fn new(config: GeneratorConfig, sink: Arc<dyn MeasurementSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        let model = TelemetryModel::from_config(&config);
        Ok(Self {
            config,
            model,
            sink,
            session: Mutex::new(Session::Idle),
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Begin a new session. Returns as soon as the loop is spawned.
    pub fn start(&self) -> Result<GenerationStatus, GenerationError> {
        let mut session = self.lock();
        if matches!(*session, Session::Running(_)) {
            return Err(GenerationError::AlreadyRunning);
        }

        self.sink
            .check_ready()
            .map_err(GenerationError::SinkUnavailable)?;
        let runtime = Handle::try_current().map_err(|_| GenerationError::RuntimeUnavailable)?;

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let runner = SessionRunner {
            session_id: id,
            model: self.model.clone(),
            tick_interval: self.config.tick_interval(),
            circuit_id: self.config.circuit_id.clone(),
            sensor_model: self.config.sensor_model.clone(),
            sink: Arc::clone(&self.sink),
            rng,
        };
        let task = runtime.spawn(runner.run(cancel.clone()));

        let active = ActiveSession {
            id,
            started_at: Utc::now(),
            cancel,
            task,
        };
        *session = Session::Running(active);

        metrics::SESSIONS_STARTED.inc();
        metrics::GENERATION_ACTIVE.set(1);
        info!(
            session = %id,
            sink = self.sink.name(),
            tick_ms = self.config.tick_interval_ms,
            "generation started"
        );
        Ok(Self::status_of(&session))
    }

    /// Cancel the running session and flip to idle without waiting for the loop.
    /// A sink write already in flight may still complete afterwards.
    pub fn stop(&self) -> Result<GenerationStatus, GenerationError> {
        let mut session = self.lock();
        let active = match std::mem::replace(&mut *session, Session::Idle) {
            Session::Running(active) => active,
            Session::Idle => return Err(GenerationError::NotRunning),
        };

        active.cancel.cancel();
        metrics::GENERATION_ACTIVE.set(0);
        info!(session = %active.id, "generation stop requested");
        // Dropping the handle detaches the task; it exits on its next iteration.
        drop(active.task);
        Ok(Self::status_of(&session))
    }

    pub fn status(&self) -> GenerationStatus {
        Self::status_of(&self.lock())
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lock(), Session::Running(_))
    }

    /// Stop any running session and wait for its loop to exit.
    pub async fn shutdown(&self) -> Option<SessionSummary> {
        let active = {
            let mut session = self.lock();
            match std::mem::replace(&mut *session, Session::Idle) {
                Session::Running(active) => active,
                Session::Idle => return None,
            }
        };

        active.cancel.cancel();
        metrics::GENERATION_ACTIVE.set(0);
        match active.task.await {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(session = %active.id, error = %err, "generation task did not exit cleanly");
                None
            }
        }
    }

    fn status_of(session: &Session) -> GenerationStatus {
        match session {
            Session::Idle => GenerationStatus {
                is_generating: false,
                state: GenerationState::Idle,
                session_id: None,
                started_at: None,
            },
            Session::Running(active) => GenerationStatus {
                is_generating: true,
                state: GenerationState::Running,
                session_id: Some(active.id),
                started_at: Some(active.started_at),
            },
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for GenerationController {
    fn drop(&mut self) {
        let session = self.session.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Session::Running(active) = session {
            active.cancel.cancel();
            metrics::GENERATION_ACTIVE.set(0);
        }
    }
}
