//! Per-section instructions sent alongside each cropped region.
//!
//! Each prompt names the section, lists its closed answer vocabulary, demands
//! a JSON-only reply, and anchors the shape with a one-question example.
//! Prompts are rendered once from the region table and reused for every call.

use std::sync::LazyLock;

use super::{REGIONS, Region};

static PROMPTS: LazyLock<Vec<(&'static str, String)>> =
    LazyLock::new(|| REGIONS.iter().map(|r| (r.id, render_prompt(r))).collect());

/// Example reply embedded in the prompt, pretty-printed.
fn example_json(region: &Region) -> String {
    let example = serde_json::json!({
        "section": region.id,
        "title": region.title,
        "questions": [
            {
                "number": 1,
                "question": region.example.question,
                "answer": region.example.answer,
            }
        ]
    });
    // A json! literal of strings and numbers always serializes
    serde_json::to_string_pretty(&example).unwrap_or_default()
}

fn render_prompt(region: &Region) -> String {
    format!(
        concat!(
            "この画像はアンケートの「{title}」のセクションです。\n",
            "各質問項目について、どの選択肢（{choices}）にチェックが入っているかを読み取ってください。\n",
            "\n",
            "重要: 必ず以下のJSON形式で回答してください。他の説明は不要です。\n",
            "\n",
            "{example}\n"
        ),
        title = region.title,
        choices = region.choices.join("、"),
        example = example_json(region),
    )
}

/// Returns the instruction text for a section.
///
/// `None` for an identifier outside the region table.
pub fn build_prompt(section_id: &str) -> Option<&'static str> {
    PROMPTS
        .iter()
        .find(|(id, _)| *id == section_id)
        .map(|(_, prompt)| prompt.as_str())
}
