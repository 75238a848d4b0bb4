// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Ridgeline fingerprint engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one processed fingerprint scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interpolation filter used when resampling an image.
///
/// The numeric codes match the constants of the native library the engine
/// replaces, so callers driving the engine over FFI can keep passing the
/// integers they already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Nearest-neighbour sampling (code 0).
    Nearest,
    /// Bilinear filtering (code 1).
    Linear,
    /// Bicubic filtering (code 2).
    Cubic,
    /// Area-style resampling, best for strong downscaling (code 3).
    Area,
    /// Lanczos windowed-sinc filtering (code 4).
    Lanczos,
}

impl InterpolationMode {
    /// Numeric wire code for this mode.
    pub fn code(&self) -> i32 {
        match self {
            Self::Nearest => 0,
            Self::Linear => 1,
            Self::Cubic => 2,
            Self::Area => 3,
            Self::Lanczos => 4,
        }
    }

    /// Resolve a numeric wire code. Returns `None` for unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Nearest),
            1 => Some(Self::Linear),
            2 => Some(Self::Cubic),
            3 => Some(Self::Area),
            4 => Some(Self::Lanczos),
            _ => None,
        }
    }
}

impl Default for InterpolationMode {
    fn default() -> Self {
        Self::Linear
    }
}

/// Kind of ridge feature found at a skeleton pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinutiaKind {
    /// A ridge terminates here (crossing number 1).
    RidgeEnding,
    /// A ridge splits into two here (crossing number 3).
    Bifurcation,
}

/// A single minutia detected on the ridge skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minutia {
    /// Pixel column on the skeleton image.
    pub x: u32,
    /// Pixel row on the skeleton image.
    pub y: u32,
    pub kind: MinutiaKind,
    /// Raw crossing number, kept for diagnostics.
    pub crossing_number: u8,
}

/// How the enhancement stage turns a grayscale scan into a binary ridge mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinarizationMethod {
    /// Fixed global threshold: pixels below `threshold` are ridge.
    Global { threshold: u8 },
    /// Automatic global threshold via Otsu's method.
    Otsu,
    /// Local mean threshold over a square neighbourhood, minus a constant.
    Adaptive { block_radius: u32, c: i32 },
}

impl Default for BinarizationMethod {
    fn default() -> Self {
        // The fixed 128 cut is the engine's historical default.
        Self::Global { threshold: 128 }
    }
}

/// Structured result of a minutiae extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub scan: ScanId,
    /// Source image dimensions the coordinates refer to.
    pub width: u32,
    pub height: u32,
    /// Filtered minutiae, in row-major discovery order.
    pub minutiae: Vec<Minutia>,
    /// Number of foreground pixels remaining after skeletonization.
    pub skeleton_pixels: u64,
}

impl ExtractionOutcome {
    /// Count of minutiae of the given kind.
    pub fn count(&self, kind: MinutiaKind) -> usize {
        self.minutiae.iter().filter(|m| m.kind == kind).count()
    }
}

/// Engine version information, as reported by the version query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Semantic version of the engine.
    pub engine: String,
    /// Human-readable description of the imaging backend.
    pub backend: String,
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ridgeline {} ({})", self.engine, self.backend)
    }
}
