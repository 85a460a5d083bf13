//! Per-section outcomes and the aggregate mapping returned to the caller.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Error record stored in place of a parsed section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
    /// Present only for parse failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Outcome of analyzing one section: parsed JSON or an error record, never both.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// Whatever JSON the model returned. Not checked against the section schema.
    Parsed(serde_json::Value),
    Failed(ErrorRecord),
}

impl AnalysisResult {
    pub fn error(message: impl Into<String>) -> Self {
        AnalysisResult::Failed(ErrorRecord {
            error: message.into(),
            raw_response: None,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AnalysisResult::Failed(_))
    }

    /// Typed view of a successful reply, if it has the expected shape.
    pub fn section_record(&self) -> Option<SectionRecord> {
        match self {
            AnalysisResult::Parsed(value) => serde_json::from_value(value.clone()).ok(),
            AnalysisResult::Failed(_) => None,
        }
    }
}

/// Expected reply shape for one section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SectionRecord {
    pub section: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct QuestionAnswer {
    pub number: u32,
    pub question: String,
    pub answer: String,
}

/// Section id → outcome, in region-table order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregateResult {
    results: Vec<(String, AnalysisResult)>,
}

impl Serialize for AggregateResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for (id, result) in &self.results {
            map.serialize_entry(id, result)?;
        }
        map.end()
    }
}

impl AggregateResult {
    pub(crate) fn from_entries(results: Vec<(String, AnalysisResult)>) -> Self {
        Self { results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[cfg(test)]
    pub fn get(&self, section_id: &str) -> Option<&AnalysisResult> {
        self.results
            .iter()
            .find(|(id, _)| id == section_id)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnalysisResult)> {
        self.results.iter().map(|(id, r)| (id.as_str(), r))
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_record_omits_missing_raw_response() {
        let result = AnalysisResult::error("Gemini APIキーが設定されていません");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"error": "Gemini APIキーが設定されていません"})
        );
    }

    #[test]
    fn test_parsed_serializes_as_is() {
        let value = json!({"section": "A", "questions": []});
        let result = AnalysisResult::Parsed(value.clone());
        assert_eq!(serde_json::to_value(&result).unwrap(), value);
    }

    #[test]
    fn test_section_record_view() {
        let result = AnalysisResult::Parsed(json!({
            "section": "D",
            "title": "満足度について",
            "questions": [{"number": 1, "question": "仕事に満足だ", "answer": "まあ満足"}]
        }));
        let record = result.section_record().unwrap();
        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.questions[0].answer, "まあ満足");

        // Parseable but off-schema replies stay successes without a typed view
        let loose = AnalysisResult::Parsed(json!({"a": 1}));
        assert!(!loose.is_error());
        assert!(loose.section_record().is_none());
    }

    #[test]
    fn test_aggregate_keeps_insertion_order() {
        let aggregate = AggregateResult::from_entries(vec![
            ("B".to_string(), AnalysisResult::Parsed(json!({"x": 1}))),
            ("A".to_string(), AnalysisResult::error("boom")),
        ]);

        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.error_count(), 1);
        let ids: Vec<&str> = aggregate.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(
            serde_json::to_string(&aggregate).unwrap(),
            r#"{"B":{"x":1},"A":{"error":"boom"}}"#
        );
    }
}
