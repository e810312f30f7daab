//! Run-scoped experiment tracking.
//!
//! The orchestrator describes each run as a stream of [`TrackingEvent`]s.
//! It folds them into its own [`PipelineRun`] and forwards them to a
//! [`RunTracker`], which either records them in process or sends them to an
//! MLflow tracking server.

mod memory;
mod mlflow;

use std::collections::BTreeMap;

use sentiprof_core::TrackingSettings;

use crate::error::SentimentError;

pub use memory::MemoryTracker;
pub use mlflow::MlflowTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

impl RunStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Text(String),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackingEvent {
    Param { key: String, value: String },
    Text { path: String, text: String },
    Json { path: String, value: serde_json::Value },
    Metric { key: String, value: f64 },
    End { status: RunStatus },
}

impl TrackingEvent {
    pub fn param(key: &str, value: impl Into<String>) -> Self {
        Self::Param {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn text(path: &str, text: impl Into<String>) -> Self {
        Self::Text {
            path: path.to_string(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn json(path: &str, value: serde_json::Value) -> Self {
        Self::Json {
            path: path.to_string(),
            value,
        }
    }

    #[must_use]
    pub fn metric(key: &str, value: f64) -> Self {
        Self::Metric {
            key: key.to_string(),
            value,
        }
    }
}

/// Identifies a run on the tracker side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub run_id: String,
    pub run_name: String,
    pub experiment_id: Option<String>,
    /// `false` when the tracker could not open the run; events are then
    /// kept locally only.
    pub attached: bool,
}

impl RunHandle {
    /// A locally identified run that the tracker never acknowledged.
    #[must_use]
    pub fn detached(run_name: &str) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            run_name: run_name.to_string(),
            experiment_id: None,
            attached: false,
        }
    }
}

/// Everything logged against one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub run_id: String,
    pub run_name: String,
    pub status: RunStatus,
    pub params: Vec<(String, String)>,
    pub artifacts: BTreeMap<String, Artifact>,
    pub metrics: BTreeMap<String, f64>,
}

impl PipelineRun {
    #[must_use]
    pub fn new(handle: &RunHandle) -> Self {
        Self {
            run_id: handle.run_id.clone(),
            run_name: handle.run_name.clone(),
            status: RunStatus::Running,
            params: Vec::new(),
            artifacts: BTreeMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn apply(&mut self, event: &TrackingEvent) {
        match event {
            TrackingEvent::Param { key, value } => {
                self.params.push((key.clone(), value.clone()));
            }
            TrackingEvent::Text { path, text } => {
                self.artifacts
                    .insert(path.clone(), Artifact::Text(text.clone()));
            }
            TrackingEvent::Json { path, value } => {
                self.artifacts
                    .insert(path.clone(), Artifact::Json(value.clone()));
            }
            TrackingEvent::Metric { key, value } => {
                self.metrics.insert(key.clone(), *value);
            }
            TrackingEvent::End { status } => self.status = *status,
        }
    }

    /// Latest value logged for `key`.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.param("error")
    }
}

/// Destination for tracking events.
#[derive(Debug, Clone)]
pub enum RunTracker {
    Mlflow(MlflowTracker),
    Memory(MemoryTracker),
}

impl RunTracker {
    /// MLflow when a tracking URI is configured, otherwise in process.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the MLflow client cannot be built.
    pub fn from_settings(
        settings: &TrackingSettings,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        match &settings.tracking_uri {
            Some(uri) => Ok(Self::Mlflow(MlflowTracker::new(
                uri,
                &settings.experiment_name,
                timeout_secs,
            )?)),
            None => Ok(Self::Memory(MemoryTracker::default())),
        }
    }

    /// # Errors
    ///
    /// Returns [`SentimentError`] if the backend rejects the new run.
    pub async fn start_run(&self, run_name: &str) -> Result<RunHandle, SentimentError> {
        match self {
            Self::Mlflow(t) => t.start_run(run_name).await,
            Self::Memory(t) => Ok(t.start_run(run_name)),
        }
    }

    /// Events for detached runs are dropped silently.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError`] if the backend rejects the event.
    pub async fn record(
        &self,
        handle: &RunHandle,
        event: &TrackingEvent,
    ) -> Result<(), SentimentError> {
        if !handle.attached {
            return Ok(());
        }
        match self {
            Self::Mlflow(t) => t.record(handle, event).await,
            Self::Memory(t) => t.record(handle, event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> RunHandle {
        RunHandle {
            run_id: "r1".to_string(),
            run_name: "pipeline_Acme".to_string(),
            experiment_id: None,
            attached: true,
        }
    }

    #[test]
    fn apply_folds_events_into_run() {
        let mut run = PipelineRun::new(&handle());
        run.apply(&TrackingEvent::param("company_name", "Acme"));
        run.apply(&TrackingEvent::text("news.txt", "Article: x\n"));
        run.apply(&TrackingEvent::metric("confidence", 0.5));
        run.apply(&TrackingEvent::End {
            status: RunStatus::Finished,
        });

        assert_eq!(run.param("company_name"), Some("Acme"));
        assert_eq!(
            run.artifacts.get("news.txt"),
            Some(&Artifact::Text("Article: x\n".to_string()))
        );
        assert_eq!(run.metrics.get("confidence"), Some(&0.5));
        assert_eq!(run.status, RunStatus::Finished);
        assert!(run.error().is_none());
    }

    #[test]
    fn param_returns_latest_value() {
        let mut run = PipelineRun::new(&handle());
        run.apply(&TrackingEvent::param("error", "first"));
        run.apply(&TrackingEvent::param("error", "second"));
        assert_eq!(run.error(), Some("second"));
    }

    #[test]
    fn memory_tracker_is_default_without_uri() {
        let settings = TrackingSettings {
            tracking_uri: None,
            experiment_name: "x".to_string(),
        };
        assert!(matches!(
            RunTracker::from_settings(&settings, 5).unwrap(),
            RunTracker::Memory(_)
        ));
    }

    #[tokio::test]
    async fn detached_runs_are_not_recorded() {
        let memory = MemoryTracker::default();
        let tracker = RunTracker::Memory(memory.clone());
        let detached = RunHandle::detached("pipeline_Acme");
        tracker
            .record(&detached, &TrackingEvent::param("k", "v"))
            .await
            .unwrap();
        assert!(memory.runs().is_empty());
    }
}
