//! Pipeline orchestration.
//!
//! One run moves through
//! `Idle → ResolvingTicker → FetchingNews → Aggregating → ExtractingSentiment → Completed`,
//! or drops into `Failed` from any non-terminal stage. Every stage logs to
//! the run's tracker; tracker failures are warnings and never change the
//! outcome.

use sentiprof_core::{AppConfig, CompanyQuery, SentimentRecord, TickerResolution};
use serde::Serialize;
use tracing::Instrument;

use crate::aggregate::aggregate;
use crate::error::PipelineError;
use crate::extractor::SentimentExtractor;
use crate::llm::ChatClient;
use crate::sources::{NewsFetcher, TickerResolver};
use crate::tracking::{PipelineRun, RunHandle, RunStatus, RunTracker, TrackingEvent};

pub const NEWS_ARTIFACT: &str = "news.txt";
pub const RAW_NEWS_ARTIFACT: &str = "raw_news.json";
pub const OUTPUT_ARTIFACT: &str = "sentiment_output.json";
pub const CHAIN_ARTIFACT: &str = "sentiment_chain.json";
pub const CONFIDENCE_METRIC: &str = "confidence";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    ResolvingTicker,
    FetchingNews,
    Aggregating,
    ExtractingSentiment,
    Completed,
    Failed,
}

impl PipelineStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::ResolvingTicker => "resolving_ticker",
            PipelineStage::FetchingNews => "fetching_news",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::ExtractingSentiment => "extracting_sentiment",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful run: the record plus everything logged along the way.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub record: SentimentRecord,
    pub ticker: TickerResolution,
    pub run: PipelineRun,
}

/// Per-run state owned by the orchestrator.
struct RunContext {
    handle: RunHandle,
    run: PipelineRun,
    stage: PipelineStage,
}

impl RunContext {
    fn enter(&mut self, next: PipelineStage) {
        tracing::info!(from = %self.stage, to = %next, "pipeline stage");
        self.stage = next;
    }
}

pub struct Pipeline {
    ticker: TickerResolver,
    news: NewsFetcher,
    extractor: SentimentExtractor,
    tracker: RunTracker,
    news_count: usize,
}

impl Pipeline {
    /// Build every collaborator from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ClientSetup`] if any HTTP client cannot be
    /// built.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let tracker = RunTracker::from_settings(&config.tracking, config.http_timeout_secs)
            .map_err(|source| PipelineError::ClientSetup {
                service: "experiment tracker",
                source,
            })?;
        Self::with_tracker(config, tracker)
    }

    /// Like [`Pipeline::from_config`] but records runs to `tracker`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ClientSetup`] if any HTTP client cannot be
    /// built.
    pub fn with_tracker(config: &AppConfig, tracker: RunTracker) -> Result<Self, PipelineError> {
        let ticker = TickerResolver::new(
            &config.ticker_base_url,
            &config.user_agent,
            config.http_timeout_secs,
        )
        .map_err(|source| PipelineError::ClientSetup {
            service: "ticker search",
            source,
        })?;

        let news = NewsFetcher::new(
            &config.exa_base_url,
            &config.exa_api_key,
            &config.user_agent,
            config.http_timeout_secs,
        )
        .map_err(|source| PipelineError::ClientSetup {
            service: "news search",
            source,
        })?;

        let llm = ChatClient::new(&config.llm, &config.user_agent, config.http_timeout_secs)
            .map_err(|source| PipelineError::ClientSetup {
                service: "chat completion",
                source,
            })?;

        Ok(Self {
            ticker,
            news,
            extractor: SentimentExtractor::new(llm),
            tracker,
            news_count: config.news_count,
        })
    }

    #[must_use]
    pub fn tracker(&self) -> &RunTracker {
        &self.tracker
    }

    /// Resolve a ticker without running the rest of the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] for a blank company name.
    pub async fn resolve_ticker(
        &self,
        company_name: &str,
    ) -> Result<TickerResolution, PipelineError> {
        let company = CompanyQuery::parse(company_name)?;
        Ok(self.ticker.resolve(&company).await)
    }

    /// Run the full pipeline for one company.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`PipelineError`]; it has already been
    /// logged against the run, which is marked failed.
    pub async fn run(&self, company_name: &str) -> Result<PipelineOutput, PipelineError> {
        let company = CompanyQuery::parse(company_name)?;
        let run_name = format!("pipeline_{company}");

        let handle = match self.tracker.start_run(&run_name).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    run_name = %run_name,
                    error = %e,
                    "could not start tracked run; continuing untracked"
                );
                RunHandle::detached(&run_name)
            }
        };
        let span = tracing::info_span!("pipeline", run_id = %handle.run_id, company = %company);

        let mut ctx = RunContext {
            run: PipelineRun::new(&handle),
            handle,
            stage: PipelineStage::Idle,
        };

        async move {
            match self.execute(&company, &mut ctx).await {
                Ok((record, ticker)) => {
                    self.emit_json(&mut ctx, OUTPUT_ARTIFACT, &record).await;
                    self.emit(
                        &mut ctx,
                        TrackingEvent::metric(CONFIDENCE_METRIC, record.confidence_score),
                    )
                    .await;
                    self.emit(
                        &mut ctx,
                        TrackingEvent::End {
                            status: RunStatus::Finished,
                        },
                    )
                    .await;
                    ctx.enter(PipelineStage::Completed);
                    tracing::info!(
                        sentiment = %record.sentiment,
                        confidence = record.confidence_score,
                        "pipeline completed"
                    );
                    Ok(PipelineOutput {
                        record,
                        ticker,
                        run: ctx.run,
                    })
                }
                Err(err) => {
                    tracing::error!(stage = %ctx.stage, error = %err, "pipeline failed");
                    self.emit(&mut ctx, TrackingEvent::param("error", err.to_string()))
                        .await;
                    self.emit(
                        &mut ctx,
                        TrackingEvent::End {
                            status: RunStatus::Failed,
                        },
                    )
                    .await;
                    ctx.enter(PipelineStage::Failed);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        company: &CompanyQuery,
        ctx: &mut RunContext,
    ) -> Result<(SentimentRecord, TickerResolution), PipelineError> {
        ctx.enter(PipelineStage::ResolvingTicker);
        let ticker = self.ticker.resolve(company).await;
        let stock_code = ticker.to_string();
        self.emit(ctx, TrackingEvent::param("company_name", company.as_str()))
            .await;
        self.emit(ctx, TrackingEvent::param("stock_code", stock_code.as_str()))
            .await;

        ctx.enter(PipelineStage::FetchingNews);
        let documents = self
            .news
            .fetch(company, self.news_count)
            .await
            .map_err(|source| PipelineError::FetchFailure {
                company: company.to_string(),
                source,
            })?;
        self.emit_json(ctx, RAW_NEWS_ARTIFACT, &documents).await;

        ctx.enter(PipelineStage::Aggregating);
        let corpus = aggregate(&documents);
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                company: company.to_string(),
            });
        }
        self.emit(ctx, TrackingEvent::text(NEWS_ARTIFACT, corpus.as_str()))
            .await;

        ctx.enter(PipelineStage::ExtractingSentiment);
        let extraction = self
            .extractor
            .extract(company.as_str(), &stock_code, &corpus)
            .await;
        self.emit_json(ctx, CHAIN_ARTIFACT, &extraction.trace).await;
        let record = extraction
            .result
            .map_err(|source| PipelineError::ExtractionFailure {
                company: company.to_string(),
                source,
            })?;

        Ok((record, ticker))
    }

    async fn emit(&self, ctx: &mut RunContext, event: TrackingEvent) {
        ctx.run.apply(&event);
        if let Err(e) = self.tracker.record(&ctx.handle, &event).await {
            tracing::warn!(
                run_id = %ctx.handle.run_id,
                error = %e,
                "failed to record tracking event"
            );
        }
    }

    async fn emit_json<T: Serialize>(&self, ctx: &mut RunContext, path: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.emit(ctx, TrackingEvent::json(path, value)).await,
            Err(e) => tracing::warn!(artifact = path, error = %e, "could not serialize artifact"),
        }
    }
}

/// Load configuration from the environment and run the pipeline once.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] if required settings are
/// missing, otherwise whatever [`Pipeline::run`] returns.
pub async fn run_pipeline(company_name: &str) -> Result<SentimentRecord, PipelineError> {
    let config = sentiprof_core::load_app_config()?;
    let pipeline = Pipeline::from_config(&config)?;
    Ok(pipeline.run(company_name).await?.record)
}
