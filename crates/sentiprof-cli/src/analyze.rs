//! Command handlers for `analyze` and `ticker`.

use sentiprof_core::AppConfig;
use sentiprof_sentiment::Pipeline;

/// Run the full pipeline for `company` and print the record as JSON.
///
/// Diagnostics go to stderr through `tracing`, so stdout carries only the
/// record and can be piped straight into `jq`.
///
/// # Errors
///
/// Returns an error if a client cannot be built or any fatal pipeline stage
/// fails. The run has already been marked failed in the tracker by then.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    company: &str,
    compact: bool,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let output = pipeline.run(company).await?;

    let rendered = if compact {
        serde_json::to_string(&output.record)?
    } else {
        serde_json::to_string_pretty(&output.record)?
    };
    println!("{rendered}");

    tracing::info!(
        run_id = %output.run.run_id,
        stock_code = %output.ticker,
        "analysis complete"
    );
    Ok(())
}

/// Resolve and print the ticker for `company`.
///
/// A lookup that degrades still prints the `ERROR: ...` string and exits
/// successfully, matching how the pipeline treats it.
///
/// # Errors
///
/// Returns an error for a blank company name or if the client cannot be
/// built.
pub(crate) async fn run_ticker(config: &AppConfig, company: &str) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let resolution = pipeline.resolve_ticker(company).await?;

    if resolution.is_degraded() {
        tracing::warn!(company, "ticker lookup degraded");
    }
    println!("{resolution}");
    Ok(())
}
