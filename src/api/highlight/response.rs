// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Highlight response types

use serde::{Deserialize, Serialize};

/// Response from `/highlight`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightResponse {
    /// Public URL of the annotated image
    pub file_url: String,
}
