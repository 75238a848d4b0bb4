// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ridgeline-minutiae — Minutiae analysis for the Ridgeline fingerprint engine.
//
// Takes the binary ridge mask produced by ridgeline-imaging, reduces it to a
// one-pixel-wide skeleton (Zhang-Suen), detects ridge endings and
// bifurcations by crossing-number analysis, renders an annotated overlay,
// and encodes a compact fingerprint template with an integrity digest.

pub mod extract;
pub mod overlay;
pub mod template;
pub mod thinning;

pub use extract::{Extraction, MinutiaeExtractor};
pub use template::FingerprintTemplate;
pub use thinning::RidgeMask;
