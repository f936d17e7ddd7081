//! Search -> format -> generate, run once per topic.
//!
//! Each stage is its own function returning `Result<_, ReportError>`, and
//! [`ReportPipeline::run`] threads them together in order. A run never
//! retries, never backtracks and keeps nothing between invocations.

use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::data_models::ReportResult;
use crate::error::{ReportError, Result};
use crate::formatter::{extract_sources, format_results};
use crate::generator::{ReportPrompt, TextGenerator, generate_report};
use crate::logging::{excerpt, section};
use crate::search::{SearchBackend, normalize_response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Searching,
    Validating,
    Formatting,
    Generating,
    Done,
    Errored,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Searching => "searching",
            Stage::Validating => "validating",
            Stage::Formatting => "formatting",
            Stage::Generating => "generating",
            Stage::Done => "done",
            Stage::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Output of the formatting stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedResults {
    pub context: String,
    pub sources: Vec<String>,
}

pub struct ReportPipeline {
    search: Arc<dyn SearchBackend>,
    generator: Arc<dyn TextGenerator>,
    prompt: ReportPrompt,
}

impl ReportPipeline {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        generator: Arc<dyn TextGenerator>,
        prompt: ReportPrompt,
    ) -> Self {
        Self {
            search,
            generator,
            prompt,
        }
    }

    pub fn search_backend(&self) -> &dyn SearchBackend {
        self.search.as_ref()
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    /// Language the report is written in.
    pub fn language(&self) -> &str {
        self.prompt.language()
    }

    /// Runs every stage for `topic`. Nothing from a failed run is returned.
    pub async fn run(&self, topic: &str) -> Result<ReportResult> {
        section("report generation");
        log::info!("topic: {}", excerpt(topic, 40));

        let mut stage = Stage::Idle;
        let outcome = AssertUnwindSafe(self.run_stages(topic, &mut stage))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ReportError::unknown(topic, panic_message(panic.as_ref()))));

        match &outcome {
            Ok(_) => log::info!("report generation finished"),
            Err(e) => {
                log::error!("pipeline failed while {stage} ({}): {e}", e.kind());
                advance(&mut stage, Stage::Errored);
            }
        }
        outcome
    }

    async fn run_stages(&self, topic: &str, stage: &mut Stage) -> Result<ReportResult> {
        self.check_configured()?;

        advance(stage, Stage::Searching);
        let response = self.search_stage(topic).await?;

        advance(stage, Stage::Validating);
        let results = validate_stage(topic, response)?;
        log::info!("search done results={}", results.len());

        advance(stage, Stage::Formatting);
        let formatted = format_stage(&results)?;

        advance(stage, Stage::Generating);
        let report = self.generate_stage(topic, &formatted.context).await?;

        advance(stage, Stage::Done);
        Ok(ReportResult {
            report,
            sources: formatted.sources,
        })
    }

    /// Guard for leaving `Idle`.
    pub fn check_configured(&self) -> Result<()> {
        self.search.ensure_configured()?;
        log::info!("search provider ready provider={}", self.search.provider());
        Ok(())
    }

    pub async fn search_stage(&self, topic: &str) -> Result<Value> {
        log::info!("searching query_len={}", topic.chars().count());
        self.search.search(topic).await.map_err(|e| match e {
            ReportError::Configuration(_) | ReportError::SearchBackend { .. } => e,
            other => ReportError::SearchBackend {
                query: topic.to_string(),
                source_type: other.kind().to_string(),
                message: other.to_string(),
            },
        })
    }

    pub async fn generate_stage(&self, topic: &str, context: &str) -> Result<String> {
        let report = generate_report(self.generator.as_ref(), &self.prompt, topic, context).await?;
        log::info!("report generated chars={}", report.chars().count());
        Ok(report)
    }
}

pub fn validate_stage(topic: &str, response: Value) -> Result<Vec<Value>> {
    normalize_response(topic, response)
}

/// Source extraction tolerates malformed entries; formatting does not.
pub fn format_stage(results: &[Value]) -> Result<FormattedResults> {
    let sources = extract_sources(results);
    let context = format_results(results)?;
    Ok(FormattedResults { context, sources })
}

fn advance(stage: &mut Stage, next: Stage) {
    log::debug!("pipeline stage {stage} -> {next}");
    *stage = next;
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "stage panicked".to_string()
    }
}
