// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Message analysis API endpoint module
//!
//! Provides POST /analyze for translating and analysing a Korean message.

pub mod handler;
pub mod request;

pub use handler::analyze_handler;
pub use request::AnalyzeRequest;
