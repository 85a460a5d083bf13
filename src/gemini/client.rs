use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use std::time::Duration;

use super::{ModelClient, ModelError};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Blocking client for `models/{model}:generateContent`.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ModelError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn request(
        &self,
        png: &[u8],
        prompt: &str,
        model: &str,
        api_key: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&request_body(png, prompt))
    }
}

/// Request body with the instruction first and the image second.
fn request_body(png: &[u8], prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                { "inline_data": { "mime_type": "image/png", "data": STANDARD.encode(png) } }
            ]
        }]
    })
}

/// Joins the text parts of the first candidate.
fn response_text(response: GenerateResponse) -> Result<String, ModelError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

impl ModelClient for GeminiClient {
    fn generate(
        &self,
        png: &[u8],
        prompt: &str,
        model: &str,
        api_key: &str,
    ) -> Result<String, ModelError> {
        let response = self.request(png, prompt, model, api_key).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        response_text(response.json()?)
    }
}
