// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Korean message analysis
//!
//! - `translation` - KO↔EN over a MyMemory-compatible HTTP API
//! - `summarizer` - LexRank extractive summary
//! - `emotion` - Zero-shot NLI emotion classification
//! - `analyzer` - Orchestration with per-step fallbacks

pub mod analyzer;
pub mod emotion;
pub mod summarizer;
pub mod translation;

pub use analyzer::{AnalysisConfig, AnalysisError, AnalysisResult, MessageAnalyzer};
pub use emotion::{EmotionClassifier, EmotionScore, OnnxZeroShotClassifier, EMOTION_LABELS};
pub use summarizer::{LexRankSummarizer, SummaryError};
pub use translation::{Language, MyMemoryTranslator, TranslationError, Translator};
