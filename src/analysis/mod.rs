//! Survey analysis pipeline.
//!
//! This module provides:
//! - Per-section analysis (crop → Gemini → JSON extraction)
//! - Aggregation of all sections into one ordered result
//! - JSON export of the aggregate

pub mod export;
pub mod extract;
pub mod result;

pub use extract::extract_json;
pub use result::{AggregateResult, AnalysisResult};

use anyhow::Result;
use image::DynamicImage;

use crate::gemini::{ModelClient, ModelError};
use crate::survey::{REGIONS, Region, build_prompt, crop_region, encode_png};

/// Error marker when no API key is configured.
pub const MISSING_API_KEY: &str = "Gemini API key is not set";

/// Analyzes one cropped section.
///
/// Never fails: a missing key, an encoding problem, or a remote error becomes
/// an error record. With a blank key the client is not called at all;
/// otherwise the call is made with `api_key`.
pub fn analyze_section(
    client: &dyn ModelClient,
    cropped: &DynamicImage,
    section_id: &str,
    api_key: &str,
    model: &str,
) -> AnalysisResult {
    if api_key.trim().is_empty() {
        return AnalysisResult::error(MISSING_API_KEY);
    }

    let Some(prompt) = build_prompt(section_id) else {
        return AnalysisResult::error(format!("Unknown section: {}", section_id));
    };

    match request_section(client, cropped, prompt, model, api_key) {
        Ok(text) => extract_json(&text),
        Err(e) => AnalysisResult::error(format!("Gemini API error: {}", e)),
    }
}

fn request_section(
    client: &dyn ModelClient,
    cropped: &DynamicImage,
    prompt: &str,
    model: &str,
    api_key: &str,
) -> Result<String, ModelError> {
    let png = encode_png(cropped)?;
    client.generate(&png, prompt, model, api_key)
}

fn analyze_region(
    client: &dyn ModelClient,
    img: &DynamicImage,
    region: &Region,
    api_key: &str,
    model: &str,
) -> Result<AnalysisResult> {
    let cropped = crop_region(img, &region.bounds)?;
    crate::log(&format!(
        "Section {}: cropped {}x{}, sending to {}",
        region.id,
        cropped.width(),
        cropped.height(),
        model
    ));

    let result = analyze_section(client, &cropped, region.id, api_key, model);

    match &result {
        AnalysisResult::Failed(e) => {
            crate::log(&format!("Section {} failed: {}", region.id, e.error));
            if let Some(raw) = &e.raw_response {
                crate::log(&format!("Section {} raw response: {}", region.id, raw));
            }
        }
        AnalysisResult::Parsed(_) => match result.section_record() {
            Some(record) => crate::log(&format!(
                "Section {} complete: {} questions",
                region.id,
                record.questions.len()
            )),
            None => crate::log(&format!(
                "Section {} complete (reply does not match the section schema)",
                region.id
            )),
        },
    }

    Ok(result)
}

/// Analyzes every section of a survey image, in region-table order.
///
/// Sections are independent: one section's error record does not stop the
/// rest. Returns `Err` only when a region does not fit inside the image.
pub fn analyze_survey(
    client: &dyn ModelClient,
    img: &DynamicImage,
    api_key: &str,
    model: &str,
) -> Result<AggregateResult> {
    let mut entries = Vec::with_capacity(REGIONS.len());

    for region in &REGIONS {
        let result = analyze_region(client, img, region, api_key, model)?;
        entries.push((region.id.to_string(), result));
    }

    let aggregate = AggregateResult::from_entries(entries);
    crate::log(&format!(
        "Analysis finished: {} sections, {} errors",
        aggregate.len(),
        aggregate.error_count()
    ));

    Ok(aggregate)
}
