//! Research report generator: web search, prompt assembly and a local LLM,
//! served through a small browser UI.

pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod export;
pub mod formatter;
pub mod generator;
pub mod logging;
pub mod pipeline;
pub mod search;

use std::sync::Arc;

use crate::config::Config;
use crate::generator::{OllamaGenerator, ReportPrompt};
use crate::pipeline::ReportPipeline;
use crate::search::TavilyClient;

/// Wires the production search and generation backends from `config`.
pub fn build_pipeline(config: &Config) -> ReportPipeline {
    ReportPipeline::new(
        Arc::new(TavilyClient::new(config.credentials.clone())),
        Arc::new(OllamaGenerator::new()),
        ReportPrompt::new(&config.report_language),
    )
}
