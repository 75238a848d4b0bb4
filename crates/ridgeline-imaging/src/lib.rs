// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ridgeline-imaging — Image handling for the Ridgeline fingerprint engine.
//
// Provides scan I/O (decode, encode, load, save), geometric and tonal
// operations (grayscale, resize with selectable interpolation, crop, invert,
// contrast), and the enhancement stages that prepare a scan for minutiae
// analysis (normalization, histogram equalization, binarization).

pub mod enhance;
pub mod ops;

pub use enhance::RidgeEnhancer;
pub use ops::ScanImage;

use ridgeline_core::VersionInfo;

/// Report the engine version and imaging backend description.
///
/// This is the version query of the engine's public surface; the FFI layer
/// exposes it as a C string.
pub fn engine_version() -> VersionInfo {
    VersionInfo {
        engine: env!("CARGO_PKG_VERSION").to_owned(),
        backend: "image/imageproc native pipeline".to_owned(),
    }
}
