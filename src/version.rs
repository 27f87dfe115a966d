// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Lookback AI node

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-11-02";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "yolov5-detection",
    "strawberry-custom-model",
    "blue-border-highlight",
    "korean-translation",
    "lexrank-summary",
    "zero-shot-emotions",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Lookback AI {} ({})", VERSION_NUMBER, BUILD_DATE)
}
