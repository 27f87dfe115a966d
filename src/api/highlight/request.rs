// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Highlight request types

use bytes::Bytes;

use crate::api::detect::request::OBJECT_FIELD;
use crate::api::errors::ApiError;
use crate::api::upload::UploadForm;
use crate::vision::HighlightMethod;

/// Form field selecting the rendering style
pub const HIGHLIGHT_METHOD_FIELD: &str = "highlightMethod";

/// Parsed `/highlight` form
#[derive(Debug, Clone, Default)]
pub struct HighlightRequest {
    pub image: Option<Bytes>,
    pub object: Option<String>,
    pub highlight_method: Option<String>,
}

impl HighlightRequest {
    pub fn from_form(form: &UploadForm) -> Self {
        Self {
            image: form.image(),
            object: form.text(OBJECT_FIELD),
            highlight_method: form.text(HIGHLIGHT_METHOD_FIELD),
        }
    }

    /// All three fields are required
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image.is_none() {
            return Err(ApiError::validation("image", "Missing image file"));
        }

        if self.object.is_none() || self.highlight_method.is_none() {
            let field = if self.object.is_none() {
                OBJECT_FIELD
            } else {
                HIGHLIGHT_METHOD_FIELD
            };
            return Err(ApiError::validation(field, "Missing parameters"));
        }

        Ok(())
    }

    /// Validated image, target and parsed method
    pub fn into_parts(self) -> Result<(Bytes, String, HighlightMethod), ApiError> {
        self.validate()?;
        match (self.image, self.object, self.highlight_method) {
            (Some(image), Some(object), Some(method)) => {
                Ok((image, object, HighlightMethod::parse(&method)))
            }
            _ => Err(ApiError::InvalidRequest("Missing parameters".to_string())),
        }
    }
}
