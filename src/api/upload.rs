// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart form reading shared by the upload endpoints

use std::collections::HashMap;

use axum_extra::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use super::errors::ApiError;

/// Name of the file part carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Raw multipart form: the image part plus every text field
#[derive(Debug, Default, Clone)]
pub struct UploadForm {
    pub image: Option<Bytes>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain a multipart body. Later parts with the same name win.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let data = field.bytes().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read image part: {}", e))
                })?;
                debug!("Received image part: {} bytes", data.len());
                form.image = Some(data);
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Text field value, `None` when absent or blank
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    /// Image bytes, `None` when absent or empty
    pub fn image(&self) -> Option<Bytes> {
        self.image.clone().filter(|b| !b.is_empty())
    }
}
