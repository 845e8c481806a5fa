//! Narrative Text - sales paragraph for a configuration
//!
//! One remote call per explicit request. Every failure degrades to a fixed
//! fallback string; callers always get text back.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{ItemKind, OfferItem};
use crate::selection::{ItemValue, Selection};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const MODEL: &str = "gemini-2.5-flash";

pub const MISSING_KEY_FALLBACK: &str = "API key is missing. Cannot generate AI description.";
pub const EMPTY_FALLBACK: &str = "Could not generate a description.";
pub const ERROR_FALLBACK: &str = "An error occurred while generating the AI description.";

const SUMMARY_HEADER: &str = "Konfiguracja Domu Modułowego:";

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Display label for a set value; `None` when the item is not chosen.
fn value_label(item: &OfferItem, value: &ItemValue) -> Option<String> {
    if value.is_unset() {
        return None;
    }
    match (&item.kind, value) {
        (ItemKind::Toggle { .. }, ItemValue::Toggle(true)) => Some("Tak".to_string()),
        (ItemKind::Quantity { unit, .. }, ItemValue::Quantity(n)) => Some(format!("{} {}", n, unit)),
        (ItemKind::SingleChoice { .. }, ItemValue::Choice(id)) => {
            Some(item.option(id).map(|o| o.name.clone()).unwrap_or_else(|| id.clone()))
        }
        _ => None,
    }
}

/// Plain-text summary of the chosen items, one line each.
pub fn config_summary(items: &[OfferItem], selection: &Selection) -> String {
    let mut summary = format!("{}\n", SUMMARY_HEADER);
    for item in items {
        let label = selection.get(&item.code).and_then(|v| value_label(item, v));
        if let Some(label) = label {
            summary.push_str(&format!("- {}: {}\n", item.name, label));
        }
    }
    summary
}

pub fn build_prompt(summary: &str) -> String {
    format!(
        "You are a professional real-estate advisor and architect.\n\
         Based on the technical configuration of a modular house below, write an \
         appealing sales description for the client (2-3 paragraphs).\n\
         Language: Polish.\n\
         Tone: professional, encouraging, highlighting comfort and the chosen amenities.\n\
         Do not just list the options; tell a coherent story of living in this house \
         with the selected options.\n\n\
         Data:\n{}",
        summary
    )
}

#[derive(Clone)]
pub struct NarrativeService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NarrativeService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Points the service at another endpoint root, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Returns the generated paragraph or one of the fallback strings.
    pub async fn describe(&self, summary: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Narrative API key is missing");
            return MISSING_KEY_FALLBACK.to_string();
        };

        match self.generate(api_key, &build_prompt(summary)).await {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_FALLBACK.to_string(),
            Err(e) => {
                warn!(error = %e, "Narrative generation failed");
                ERROR_FALLBACK.to_string()
            }
        }
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<Option<String>, NarrativeError> {
        let url = format!("{}/{}:generateContent", self.base_url, MODEL);
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api { status: status.as_u16(), message });
        }

        let parsed: GenerateResponse = response.json().await?;
        debug!(candidates = parsed.candidates.len(), "Narrative response received");
        Ok(parsed.text())
    }
}
