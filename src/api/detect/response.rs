// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::Detection;

/// Response from `/detect`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    /// Public URL of the persisted image
    pub file_url: String,
    /// Matching detections as flat records
    pub detections: Vec<Detection>,
}
