//! Company sentiment profiling pipeline.
//!
//! Resolves a company's ticker (Yahoo Finance search), pulls recent news
//! (Exa), flattens it into a corpus, and asks an Azure OpenAI deployment for a
//! validated [`SentimentRecord`](sentiprof_core::SentimentRecord). Each run is
//! logged to MLflow or kept in process.

pub mod aggregate;
pub mod error;
pub mod extractor;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod sources;
pub mod tracking;

mod http;

pub use aggregate::aggregate;
pub use error::{PipelineError, SentimentError};
pub use extractor::{parse_record, ChainTrace, Extraction, SentimentExtractor};
pub use llm::ChatClient;
pub use pipeline::{run_pipeline, Pipeline, PipelineOutput, PipelineStage};
pub use sources::{NewsFetcher, TickerResolver};
pub use tracking::{MemoryTracker, MlflowTracker, PipelineRun, RunStatus, RunTracker};
