//! JSON export for analysis results.

use super::result::AggregateResult;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Default file name for the exported result.
pub const DEFAULT_OUTPUT_FILE: &str = "questionnaire_analysis.json";

/// Serializes the aggregate as pretty JSON (2-space indent, non-ASCII kept as-is).
pub fn to_json_string(results: &AggregateResult) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize analysis results to JSON")
}

/// Export analysis results to a JSON file.
pub fn export_to_json(results: &AggregateResult, output_path: &Path) -> Result<()> {
    let json = to_json_string(results)?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create JSON file: {}", output_path.display()))?;

    file.write_all(json.as_bytes())
        .context("Failed to write JSON data")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::AnalysisResult;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample() -> AggregateResult {
        AggregateResult::from_entries(vec![
            (
                "A".to_string(),
                AnalysisResult::Parsed(json!({
                    "section": "A",
                    "title": "あなたの仕事について",
                    "questions": [{"number": 1, "question": "時間内に仕事が処理しきれない", "answer": "まあそうだ"}]
                })),
            ),
            ("B".to_string(), AnalysisResult::error("Gemini API error: HTTP 429")),
        ])
    }

    #[test]
    fn test_json_keeps_japanese_unescaped() {
        let text = to_json_string(&sample()).unwrap();
        assert!(text.contains("\"title\": \"あなたの仕事について\""));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn test_json_two_space_indent() {
        let text = to_json_string(&sample()).unwrap();
        assert!(text.starts_with("{\n  \"A\": {\n    \"section\": \"A\","));
    }

    #[test]
    fn test_export_to_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT_FILE);

        export_to_json(&sample(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["A"]["questions"][0]["answer"], "まあそうだ");
        assert_eq!(value["B"]["error"], "Gemini API error: HTTP 429");
        assert!(value["B"].get("raw_response").is_none());
    }
}
