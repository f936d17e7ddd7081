use anyhow::Result;
use std::fs;
use tempfile::TempDir;

use tech_report::data_models::ReportResult;
use tech_report::export::save_report;

fn sample_result() -> ReportResult {
    ReportResult {
        report: "# Rust async\n\nbody".to_string(),
        sources: vec!["https://a.dev".to_string(), "https://b.dev".to_string()],
    }
}

#[test]
fn test_save_creates_missing_directory() -> Result<()> {
    let tmp = TempDir::new()?;
    let dir = tmp.path().join("nested").join("reports");

    let path = save_report(&dir, "Rust async: a primer", &sample_result(), "English", false)?;

    assert_eq!(path, dir.join("Rust_async_a_primer.md"));
    let content = fs::read_to_string(&path)?;
    assert!(content.starts_with("# Rust async"));
    assert!(content.ends_with("1. https://a.dev\n2. https://b.dev\n"));
    Ok(())
}

#[test]
fn test_save_with_timestamp_prefix() -> Result<()> {
    let tmp = TempDir::new()?;

    let path = save_report(tmp.path(), "rust", &sample_result(), "English", true)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    // YYYYmmdd_HHMMSS_rust.md
    assert_eq!(name.len(), "20260101_120000_rust.md".len());
    assert!(name.ends_with("_rust.md"));
    assert!(name[..8].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(&name[8..9], "_");
    Ok(())
}

#[test]
fn test_save_without_sources_writes_report_only() -> Result<()> {
    let tmp = TempDir::new()?;
    let result = ReportResult {
        report: "just the report".to_string(),
        sources: vec![],
    };

    let path = save_report(tmp.path(), "!!!", &result, "Korean", false)?;
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("report.md"));
    assert_eq!(fs::read_to_string(&path)?, "just the report");
    Ok(())
}

#[test]
fn test_save_uses_korean_references_heading() -> Result<()> {
    let tmp = TempDir::new()?;

    let path = save_report(tmp.path(), "rust", &sample_result(), "Korean", false)?;
    let content = fs::read_to_string(&path)?;
    assert!(content.contains("\n## 📚 참고 문헌\n\n1. https://a.dev\n"));
    assert!(!content.contains("## References"));
    Ok(())
}
