// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for operator-facing surfaces (enrollment
// kiosks, the CLI). Every technical error is mapped to plain English with a
// clear suggestion. The taxonomy uses three severity levels that drive
// presentation.

use crate::error::RidgelineError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A fresh capture of the finger will likely fix it.
    Recapture,
    /// The operator must change something (file, settings) before retrying.
    ActionRequired,
    /// Cannot be fixed by recapturing — bad format, corrupted template, etc.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the operator should try (shown as body text).
    pub suggestion: String,
    /// Whether capturing the finger again is worth attempting.
    pub recapture_helps: bool,
    pub severity: Severity,
}

/// Convert a `RidgelineError` into a `HumanError` anyone at the capture
/// station can act on.
pub fn humanize_error(err: &RidgelineError) -> HumanError {
    match err {
        RidgelineError::Decode(detail) => HumanError {
            message: "This file doesn't look like an image.".into(),
            suggestion: format!(
                "Use a PNG, JPEG, or TIFF scan of the fingerprint. ({detail})"
            ),
            recapture_helps: false,
            severity: Severity::ActionRequired,
        },

        RidgelineError::Encode(detail) => HumanError {
            message: "The result image couldn't be written.".into(),
            suggestion: format!("Check the output path and free disk space. ({detail})"),
            recapture_helps: false,
            severity: Severity::ActionRequired,
        },

        RidgelineError::EmptyImage => HumanError {
            message: "The image is empty.".into(),
            suggestion: "The scan has zero width or height. Capture the finger again.".into(),
            recapture_helps: true,
            severity: Severity::Recapture,
        },

        RidgelineError::UnknownInterpolation(code) => HumanError {
            message: "Unknown resize quality setting.".into(),
            suggestion: format!("Use a mode between 0 and 4 (got {code})."),
            recapture_helps: false,
            severity: Severity::Permanent,
        },

        RidgelineError::NotBinary(levels) => HumanError {
            message: "The image isn't black-and-white yet.".into(),
            suggestion: format!(
                "Run the enhancement step before skeletonization ({levels} gray levels found)."
            ),
            recapture_helps: false,
            severity: Severity::ActionRequired,
        },

        RidgelineError::TooSmall { width, height } => HumanError {
            message: "The scan is too small to analyse.".into(),
            suggestion: format!(
                "Capture a larger area of the finger — this scan is only {width}x{height} pixels."
            ),
            recapture_helps: true,
            severity: Severity::Recapture,
        },

        RidgelineError::IntegrityMismatch { .. } => HumanError {
            message: "This fingerprint template has been altered.".into(),
            suggestion: "Re-enroll the finger to generate a fresh template.".into(),
            recapture_helps: false,
            severity: Severity::Permanent,
        },

        RidgelineError::EmptyTemplateGrid => HumanError {
            message: "Template settings are invalid.".into(),
            suggestion: "Set the template grid size to at least 1.".into(),
            recapture_helps: false,
            severity: Severity::ActionRequired,
        },

        RidgelineError::Io(detail) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check that the path exists and is writable. ({detail})"),
            recapture_helps: false,
            severity: Severity::ActionRequired,
        },

        RidgelineError::Serialization(detail) => HumanError {
            message: "A settings or template file is malformed.".into(),
            suggestion: format!("Fix or regenerate the JSON file. ({detail})"),
            recapture_helps: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_small_suggests_recapture() {
        let err = RidgelineError::TooSmall {
            width: 12,
            height: 9,
        };
        let human = humanize_error(&err);
        assert!(human.recapture_helps);
        assert_eq!(human.severity, Severity::Recapture);
        assert!(human.suggestion.contains("12x9"));
    }

    #[test]
    fn integrity_mismatch_is_permanent() {
        let err = RidgelineError::IntegrityMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        };
        let human = humanize_error(&err);
        assert!(!human.recapture_helps);
        assert_eq!(human.severity, Severity::Permanent);
    }
}
