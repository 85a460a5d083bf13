//! Gemini multimodal inference.
//!
//! This module provides:
//! - The `ModelClient` seam used by the analysis pipeline
//! - The known model identifiers
//! - A blocking REST client for the Generative Language API

pub mod client;

pub use client::GeminiClient;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure of a single inference call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response contained no text")]
    EmptyResponse,
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Sends one image plus one instruction to a multimodal model.
///
/// Implementations perform exactly one remote call per invocation, authenticated
/// with the key given for that call, and do not retry.
pub trait ModelClient {
    fn generate(
        &self,
        png: &[u8],
        prompt: &str,
        model: &str,
        api_key: &str,
    ) -> Result<String, ModelError>;
}

/// Models selectable for analysis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeminiModel {
    #[serde(rename = "gemini-1.5-flash")]
    Flash15,
    #[serde(rename = "gemini-1.5-pro")]
    Pro15,
    #[serde(rename = "gemini-2.0-flash-exp")]
    Flash20Exp,
    #[default]
    #[serde(rename = "gemini-2.5-pro")]
    Pro25,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 4] = [
        GeminiModel::Flash15,
        GeminiModel::Pro15,
        GeminiModel::Flash20Exp,
        GeminiModel::Pro25,
    ];

    /// API model identifier.
    pub fn id(self) -> &'static str {
        match self {
            GeminiModel::Flash15 => "gemini-1.5-flash",
            GeminiModel::Pro15 => "gemini-1.5-pro",
            GeminiModel::Flash20Exp => "gemini-2.0-flash-exp",
            GeminiModel::Pro25 => "gemini-2.5-pro",
        }
    }

    /// Display name shown in the model list.
    pub fn label(self) -> &'static str {
        match self {
            GeminiModel::Flash15 => "Gemini 1.5 Flash (高速)",
            GeminiModel::Pro15 => "Gemini 1.5 Pro (高精度)",
            GeminiModel::Flash20Exp => "Gemini 2.0 Flash (最新)",
            GeminiModel::Pro25 => "Gemini 2.5 Pro (最高精度)",
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeminiModel::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = GeminiModel::ALL.iter().map(|m| m.id()).collect();
                format!("unknown model '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
