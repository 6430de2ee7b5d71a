use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
const TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f64 = 0.8;
const ERROR_SNIPPET_CHARS: usize = 400;

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// A service that turns one prompt into free text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
}

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(GeminiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.trim().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        // The key travels in a header so it never shows up in a URL.
        let resp = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request_body(prompt))
            .send()
            .map_err(strip_url)?;

        let status = resp.status();

        // Read as text first so the error body survives a JSON failure.
        let text = resp.text().map_err(strip_url)?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|_| Error::InvalidResponse("body is not valid JSON".into()))?;

        let out = extract_text(&v)?;
        debug!(model = %self.model, chars = out.len(), "generateContent ok");
        Ok(out)
    }
}

fn strip_url(e: reqwest::Error) -> Error {
    Error::Request(e.without_url())
}

fn request_body(prompt: &str) -> Value {
    let safety: Vec<Value> = SAFETY_CATEGORIES
        .iter()
        .map(|c| json!({ "category": c, "threshold": "BLOCK_NONE" }))
        .collect();

    json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": { "temperature": TEMPERATURE },
        "safetySettings": safety
    })
}

fn extract_text(v: &Value) -> Result<String> {
    let parts = v
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());

    let Some(parts) = parts else {
        if let Some(reason) = v
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
        {
            return Err(Error::InvalidResponse(format!("prompt blocked: {reason}")));
        }
        return Err(Error::InvalidResponse(
            "missing candidates[0].content.parts".into(),
        ));
    };

    Ok(parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect())
}

fn extract_error_message(body_text: &str) -> String {
    // Common shapes: { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return msg.to_string();
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return msg.to_string();
        }
    }

    let trimmed = body_text.trim();
    if trimmed.chars().count() > ERROR_SNIPPET_CHARS {
        let head: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
