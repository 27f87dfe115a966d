// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types

use bytes::Bytes;

use crate::api::errors::ApiError;
use crate::api::upload::UploadForm;

/// Form field naming the target object
pub const OBJECT_FIELD: &str = "object";

/// Parsed `/detect` form
#[derive(Debug, Clone, Default)]
pub struct DetectRequest {
    /// Raw image bytes (required)
    pub image: Option<Bytes>,
    /// Target label (required)
    pub object: Option<String>,
}

impl DetectRequest {
    pub fn from_form(form: &UploadForm) -> Self {
        Self {
            image: form.image(),
            object: form.text(OBJECT_FIELD),
        }
    }

    /// Validate the detection request
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image.is_none() {
            return Err(ApiError::validation("image", "Missing image file"));
        }

        if self.object.is_none() {
            return Err(ApiError::validation("object", "Missing object parameter"));
        }

        Ok(())
    }

    /// Validated image and target
    pub fn into_parts(self) -> Result<(Bytes, String), ApiError> {
        self.validate()?;
        match (self.image, self.object) {
            (Some(image), Some(object)) => Ok((image, object)),
            _ => Err(ApiError::InvalidRequest("Missing parameters".to_string())),
        }
    }
}
