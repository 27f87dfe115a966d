// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Translation client for the MyMemory-compatible GET API
//!
//! `GET <endpoint>?q=<text>&langpair=<src>|<dst>` returning
//! `{"responseData": {"translatedText": "..."}}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Default public MyMemory endpoint
pub const DEFAULT_TRANSLATION_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Default request timeout
pub const DEFAULT_TRANSLATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Languages used by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Korean,
    English,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Korean => "ko",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors from the translation client
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Request timed out
    #[error("Translation timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport failure before a response arrived
    #[error("Translation request failed: {0}")]
    Request(String),

    /// Non-success status from the API
    #[error("Translation API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Body was not the expected shape
    #[error("Invalid translation response: {0}")]
    InvalidResponse(String),
}

/// Text translation between two languages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` into `target`
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// MyMemory translation provider
#[derive(Debug, Clone)]
pub struct MyMemoryTranslator {
    endpoint: String,
    timeout: Duration,
    client: Client,
}

impl MyMemoryTranslator {
    /// Create a client for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            timeout,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let langpair = format!("{}|{}", source.code(), target.code());
        debug!("Translating {} chars ({})", text.chars().count(), langpair);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    TranslationError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Translation API error: {}", status);
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "mymemory"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryData>,
    /// Integer or string depending on the error path
    response_status: Option<serde_json::Value>,
    response_details: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: Option<String>,
}

/// Extract `responseData.translatedText` from a response body
pub(crate) fn parse_response(body: &str) -> Result<String, TranslationError> {
    let parsed: MyMemoryResponse = serde_json::from_str(body)
        .map_err(|e| TranslationError::InvalidResponse(format!("JSON parse error: {}", e)))?;

    // The API reports quota and validation errors in-band with HTTP 200
    let in_band_status = parsed.response_status.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    });
    if let Some(code) = in_band_status {
        if code != 200 {
            return Err(TranslationError::ApiError {
                status: code as u16,
                message: parsed.response_details.unwrap_or_default(),
            });
        }
    }

    parsed
        .response_data
        .and_then(|d| d.translated_text)
        .ok_or_else(|| {
            TranslationError::InvalidResponse("missing responseData.translatedText".to_string())
        })
}
