// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod artifacts;

pub use artifacts::{
    artifact_filename, ArtifactConfig, ArtifactError, ArtifactStore, PersistedArtifact,
    PROCESSED_SUBDIR, STATIC_URL_PATH,
};
