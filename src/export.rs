use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use crate::data_models::ReportResult;

const MAX_FILENAME_CHARS: usize = 50;
const FALLBACK_FILENAME: &str = "report";

/// File stem derived from a topic: alphanumerics, spaces and underscores
/// only, spaces turned into underscores, at most 50 characters.
pub fn sanitize_topic(topic: &str) -> String {
    let kept: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    let stem: String = kept
        .trim()
        .replace(' ', "_")
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect();
    if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        stem
    }
}

/// Heading of the appended sources section, in the report's language.
pub fn references_heading(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "korean" | "ko" | "한국어" => "## 📚 참고 문헌",
        _ => "## References",
    }
}

/// The report followed by a numbered references section, if there are sources.
pub fn render_markdown(report: &str, sources: &[String], language: &str) -> String {
    let mut content = report.to_string();
    if !sources.is_empty() {
        content.push_str("\n\n---\n\n");
        content.push_str(references_heading(language));
        content.push_str("\n\n");
        for (idx, url) in sources.iter().enumerate() {
            content.push_str(&format!("{}. {}\n", idx + 1, url));
        }
    }
    content
}

/// Writes the report under `output_dir`, creating it if needed, and returns
/// the path written.
pub fn save_report(
    output_dir: &Path,
    topic: &str,
    result: &ReportResult,
    language: &str,
    timestamped: bool,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let stem = sanitize_topic(topic);
    let filename = if timestamped {
        format!("{}_{}.md", Local::now().format("%Y%m%d_%H%M%S"), stem)
    } else {
        format!("{stem}.md")
    };
    let path = output_dir.join(filename);

    fs::write(&path, render_markdown(&result.report, &result.sources, language))
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    log::info!("report saved path={}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_topic() {
        assert_eq!(
            sanitize_topic("transformer model evolution"),
            "transformer_model_evolution"
        );
        assert_eq!(sanitize_topic("  C++ / Rust: a comparison! "), "C__Rust_a_comparison");
        assert_eq!(sanitize_topic("트랜스포머 모델"), "트랜스포머_모델");
        assert_eq!(sanitize_topic("???"), "report");
        assert_eq!(sanitize_topic(""), "report");
    }

    #[test]
    fn test_sanitize_topic_truncates() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_topic(&long).chars().count(), 50);
    }

    #[test]
    fn test_render_markdown_with_sources() {
        let sources = vec!["https://a.dev".to_string(), "https://b.dev".to_string()];
        let content = render_markdown("# Title", &sources, "English");
        assert_eq!(
            content,
            "# Title\n\n---\n\n## References\n\n1. https://a.dev\n2. https://b.dev\n"
        );
    }

    #[test]
    fn test_render_markdown_korean_heading() {
        let sources = vec!["https://a.dev".to_string()];
        let content = render_markdown("# 제목", &sources, "Korean");
        assert_eq!(content, "# 제목\n\n---\n\n## 📚 참고 문헌\n\n1. https://a.dev\n");
    }

    #[test]
    fn test_references_heading() {
        assert_eq!(references_heading("Korean"), "## 📚 참고 문헌");
        assert_eq!(references_heading(" korean "), "## 📚 참고 문헌");
        assert_eq!(references_heading("English"), "## References");
        assert_eq!(references_heading("Japanese"), "## References");
    }

    #[test]
    fn test_render_markdown_without_sources() {
        assert_eq!(render_markdown("# Title", &[], "Korean"), "# Title");
    }
}
