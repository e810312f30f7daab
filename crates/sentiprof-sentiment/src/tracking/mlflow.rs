//! MLflow tracking-server client (REST API 2.0).
//!
//! Parameters, metrics and run status go through `/api/2.0/mlflow/...`.
//! Artifacts are uploaded through the server's artifact proxy, which is what
//! `mlflow server` serves by default (`--serve-artifacts`).

use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::{RunHandle, TrackingEvent};
use crate::error::SentimentError;
use crate::http;

/// MLflow rejects parameter values longer than this.
const MAX_PARAM_CHARS: usize = 6000;

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: Experiment,
}

#[derive(Debug, Deserialize)]
struct Experiment {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: Run,
}

#[derive(Debug, Deserialize)]
struct Run {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
    experiment_id: String,
}

#[derive(Debug, Clone)]
pub struct MlflowTracker {
    client: Client,
    base_url: Url,
    experiment_name: String,
}

impl MlflowTracker {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SentimentError::InvalidBaseUrl`] for a malformed URI.
    pub fn new(
        tracking_uri: &str,
        experiment_name: &str,
        timeout_secs: u64,
    ) -> Result<Self, SentimentError> {
        Ok(Self {
            client: http::build_client(timeout_secs, "sentiprof/0.1 (experiment-tracking)")?,
            base_url: http::parse_base_url(tracking_uri)?,
            experiment_name: experiment_name.to_string(),
        })
    }

    /// Look the experiment up by name, creating it on first use.
    async fn experiment_id(&self) -> Result<String, SentimentError> {
        let mut url = http::join(&self.base_url, "api/2.0/mlflow/experiments/get-by-name")?;
        url.query_pairs_mut()
            .append_pair("experiment_name", &self.experiment_name);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!(experiment = %self.experiment_name, "creating MLflow experiment");
            let response = self
                .post(
                    "api/2.0/mlflow/experiments/create",
                    &json!({ "name": self.experiment_name }),
                )
                .await?;
            let created: CreateExperimentResponse =
                http::decode_json(response, "mlflow experiments/create").await?;
            return Ok(created.experiment_id);
        }

        let response = http::ensure_success("mlflow", response).await?;
        let found: GetExperimentResponse =
            http::decode_json(response, "mlflow experiments/get-by-name").await?;
        Ok(found.experiment.experiment_id)
    }

    pub(crate) async fn start_run(&self, run_name: &str) -> Result<RunHandle, SentimentError> {
        let experiment_id = self.experiment_id().await?;
        let response = self
            .post(
                "api/2.0/mlflow/runs/create",
                &json!({
                    "experiment_id": experiment_id,
                    "run_name": run_name,
                    "start_time": chrono::Utc::now().timestamp_millis(),
                    "tags": [{ "key": "mlflow.runName", "value": run_name }],
                }),
            )
            .await?;
        let created: CreateRunResponse = http::decode_json(response, "mlflow runs/create").await?;

        tracing::debug!(run_id = %created.run.info.run_id, run_name, "MLflow run started");
        Ok(RunHandle {
            run_id: created.run.info.run_id,
            run_name: run_name.to_string(),
            experiment_id: Some(created.run.info.experiment_id),
            attached: true,
        })
    }

    pub(crate) async fn record(
        &self,
        handle: &RunHandle,
        event: &TrackingEvent,
    ) -> Result<(), SentimentError> {
        match event {
            TrackingEvent::Param { key, value } => {
                let value: String = value.chars().take(MAX_PARAM_CHARS).collect();
                self.post(
                    "api/2.0/mlflow/runs/log-parameter",
                    &json!({ "run_id": handle.run_id, "key": key, "value": value }),
                )
                .await?;
            }
            TrackingEvent::Metric { key, value } => {
                self.post(
                    "api/2.0/mlflow/runs/log-metric",
                    &json!({
                        "run_id": handle.run_id,
                        "key": key,
                        "value": value,
                        "timestamp": chrono::Utc::now().timestamp_millis(),
                        "step": 0,
                    }),
                )
                .await?;
            }
            TrackingEvent::End { status } => {
                self.post(
                    "api/2.0/mlflow/runs/update",
                    &json!({
                        "run_id": handle.run_id,
                        "status": status.as_str(),
                        "end_time": chrono::Utc::now().timestamp_millis(),
                    }),
                )
                .await?;
            }
            TrackingEvent::Text { path, text } => {
                self.upload(
                    handle,
                    path,
                    "text/plain; charset=utf-8",
                    text.clone().into_bytes(),
                )
                .await?;
            }
            TrackingEvent::Json { path, value } => {
                let body =
                    serde_json::to_vec_pretty(value).map_err(|e| SentimentError::Deserialize {
                        context: format!("artifact {path}"),
                        source: e,
                    })?;
                self.upload(handle, path, "application/json", body).await?;
            }
        }
        Ok(())
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<Response, SentimentError> {
        let url = http::join(&self.base_url, path)?;
        let response = self.client.post(url).json(body).send().await?;
        http::ensure_success("mlflow", response).await
    }

    async fn upload(
        &self,
        handle: &RunHandle,
        artifact_path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), SentimentError> {
        let experiment_id = handle.experiment_id.as_deref().ok_or_else(|| {
            SentimentError::Tracking(format!("run {} has no experiment id", handle.run_id))
        })?;
        let url = http::join(
            &self.base_url,
            &format!(
                "api/2.0/mlflow-artifacts/artifacts/{experiment_id}/{}/artifacts/{artifact_path}",
                handle.run_id
            ),
        )?;
        let response = self
            .client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        http::ensure_success("mlflow artifacts", response).await?;
        Ok(())
    }
}
