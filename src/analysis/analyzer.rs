// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Korean message analysis: translation, key content and emotions
//!
//! Each step degrades to a placeholder string instead of failing the request.
//! Only a classifier error aborts the analysis.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use super::emotion::{
    ClassifierError, EmotionClassifier, EmotionScore, OnnxZeroShotClassifier,
    DEFAULT_ENTAILMENT_INDEX, EMOTION_LABELS,
};
use super::summarizer::LexRankSummarizer;
use super::translation::{
    Language, MyMemoryTranslator, Translator, DEFAULT_TRANSLATION_ENDPOINT,
    DEFAULT_TRANSLATION_TIMEOUT,
};

/// Placeholder when a translation step fails
pub const TRANSLATION_FAILED: &str = "Translation failed";

/// Key content when there is no English text to summarise
pub const SUMMARIZATION_SKIPPED: &str = "Summarization skipped";

/// Key content when the summarizer errors
pub const KEY_CONTENT_ERROR: &str = "Key content extraction error";

/// Result of `/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// English translation of the message
    pub translated_text: String,
    /// Korean rendering of the key content
    pub happen: String,
    /// Emotion scores, highest first
    pub emotions: Vec<EmotionScore>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis failed: {0}")]
    Classification(#[from] ClassifierError),

    #[error("Analysis failed: {0}")]
    Internal(String),
}

/// Configuration for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub translation_endpoint: String,
    pub translation_timeout: Duration,
    /// Sentences kept in the key content
    pub summary_sentences: usize,
    pub classifier_model_path: Option<PathBuf>,
    pub classifier_tokenizer_path: Option<PathBuf>,
    /// Output column holding the entailment logit
    pub entailment_index: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            translation_endpoint: DEFAULT_TRANSLATION_ENDPOINT.to_string(),
            translation_timeout: DEFAULT_TRANSLATION_TIMEOUT,
            summary_sentences: 1,
            classifier_model_path: Some(PathBuf::from("./models/bart-large-mnli/model.onnx")),
            classifier_tokenizer_path: Some(PathBuf::from(
                "./models/bart-large-mnli/tokenizer.json",
            )),
            entailment_index: DEFAULT_ENTAILMENT_INDEX,
        }
    }
}

/// Orchestrates the analysis steps
#[derive(Clone)]
pub struct MessageAnalyzer {
    translator: Arc<dyn Translator>,
    summarizer: LexRankSummarizer,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    summary_sentences: usize,
}

impl std::fmt::Debug for MessageAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAnalyzer")
            .field("translator", &self.translator.name())
            .field("classifier", &self.classifier.as_ref().map(|c| c.name().to_string()))
            .field("summary_sentences", &self.summary_sentences)
            .finish()
    }
}

impl MessageAnalyzer {
    pub fn new(
        translator: Arc<dyn Translator>,
        classifier: Option<Arc<dyn EmotionClassifier>>,
    ) -> Self {
        Self {
            translator,
            summarizer: LexRankSummarizer::default(),
            classifier,
            summary_sentences: 1,
        }
    }

    pub fn with_summary_sentences(mut self, count: usize) -> Self {
        self.summary_sentences = count;
        self
    }

    /// Build the analyzer from configuration.
    ///
    /// A classifier that fails to load is logged and left out; emotions are
    /// then always empty.
    pub fn from_config(config: &AnalysisConfig) -> anyhow::Result<Self> {
        let translator = MyMemoryTranslator::new(
            config.translation_endpoint.clone(),
            config.translation_timeout,
        )?;

        let classifier: Option<Arc<dyn EmotionClassifier>> =
            match (&config.classifier_model_path, &config.classifier_tokenizer_path) {
                (Some(model), Some(tokenizer)) => {
                    match OnnxZeroShotClassifier::new("bart-large-mnli", model, tokenizer) {
                        Ok(c) => {
                            info!("✅ Zero-shot emotion analysis model initialized successfully");
                            Some(Arc::new(c.with_entailment_index(config.entailment_index)))
                        }
                        Err(e) => {
                            error!("⚠️ Zero-shot emotion analysis model initialization failed: {:#}", e);
                            None
                        }
                    }
                }
                _ => {
                    warn!("Emotion classifier not configured, emotions will be empty");
                    None
                }
            };

        Ok(Self::new(Arc::new(translator), classifier)
            .with_summary_sentences(config.summary_sentences))
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Analyze a Korean message
    pub async fn analyze(&self, message: &str) -> Result<AnalysisResult, AnalysisError> {
        // 1. KO -> EN
        let english = match self
            .translator
            .translate(message, Language::Korean, Language::English)
            .await
        {
            Ok(text) if !text.trim().is_empty() => {
                info!("Translation (KO->EN) successful");
                Some(text)
            }
            Ok(_) => {
                error!("Translation failed: empty translation");
                None
            }
            Err(e) => {
                error!("Translation failed: {}", e);
                None
            }
        };

        // 2. Key content
        let key_content = match &english {
            Some(text) => match self.summarizer.summarize(text, self.summary_sentences) {
                Ok(summary) => {
                    info!("Key content extraction successful: {}", summary);
                    summary
                }
                Err(e) => {
                    error!("Extract key content error: {}", e);
                    KEY_CONTENT_ERROR.to_string()
                }
            },
            None => {
                info!("No valid English text, summarization skipped");
                SUMMARIZATION_SKIPPED.to_string()
            }
        };

        // 3. EN -> KO
        let happen = match self
            .translator
            .translate(&key_content, Language::English, Language::Korean)
            .await
        {
            Ok(text) => {
                info!("Translation (EN->KO) of summary successful: {}", text);
                text
            }
            Err(e) => {
                error!("Translation of summary failed: {}", e);
                TRANSLATION_FAILED.to_string()
            }
        };

        // 4. Emotions
        let emotions = match (&self.classifier, &english) {
            (Some(classifier), Some(text)) => {
                let classifier = Arc::clone(classifier);
                let text = text.clone();
                let scores = tokio::task::spawn_blocking(move || {
                    classifier.classify(&text, &EMOTION_LABELS)
                })
                .await
                .map_err(|e| AnalysisError::Internal(format!("classifier task failed: {}", e)))??;
                info!("Emotion analysis successful");
                scores
            }
            _ => {
                info!("Emotion analysis skipped due to translation failure or classifier init failure");
                Vec::new()
            }
        };

        Ok(AnalysisResult {
            translated_text: english.unwrap_or_else(|| TRANSLATION_FAILED.to_string()),
            happen,
            emotions,
        })
    }
}
