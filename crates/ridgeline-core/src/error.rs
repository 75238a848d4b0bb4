// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Ridgeline.

use thiserror::Error;

/// Top-level error type for all Ridgeline operations.
#[derive(Debug, Error)]
pub enum RidgelineError {
    // -- Imaging errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("unknown interpolation code: {0}")]
    UnknownInterpolation(i32),

    // -- Pipeline errors --
    #[error("expected a binary (two-valued) image, found {0} distinct levels")]
    NotBinary(usize),

    #[error("image too small for minutiae analysis: {width}x{height}")]
    TooSmall { width: u32, height: u32 },

    // -- Template errors --
    #[error("template integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("template grid size must be non-zero")]
    EmptyTemplateGrid,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RidgelineError>;
