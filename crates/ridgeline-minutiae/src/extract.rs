// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minutiae detection — crossing-number analysis over the ridge skeleton,
// false-minutiae filtering, and the full image-to-minutiae pipeline.

use image::{DynamicImage, RgbImage};
use ridgeline_core::error::{Result, RidgelineError};
use ridgeline_core::{EngineConfig, ExtractionOutcome, Minutia, MinutiaKind, ScanId};
use ridgeline_imaging::RidgeEnhancer;
use tracing::{debug, info, instrument};

use crate::overlay::render_overlay;
use crate::thinning::{transitions, RidgeMask};

/// Smallest scan side the pipeline accepts. Anything below this cannot hold
/// even a single ridge period at capture resolution.
const MIN_SIDE: u32 = 16;

/// Result of a full extraction run: the annotated overlay plus the
/// structured outcome.
#[derive(Debug)]
pub struct Extraction {
    pub overlay: RgbImage,
    pub outcome: ExtractionOutcome,
}

/// Runs the complete extraction pipeline: enhance, thin, detect, filter,
/// render.
pub struct MinutiaeExtractor {
    config: EngineConfig,
}

impl MinutiaeExtractor {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Extract minutiae from a decoded scan.
    ///
    /// Stages: grayscale + enhancement (normalize, equalize, binarize),
    /// Zhang-Suen thinning, crossing-number detection, border and spacing
    /// filtering, overlay rendering.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &DynamicImage) -> Result<Extraction> {
        let (width, height) = (image.width(), image.height());
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(RidgelineError::TooSmall { width, height });
        }

        let binary = RidgeEnhancer::from_dynamic(image).enhance(&self.config)?;

        let mut mask = RidgeMask::from_binary(&binary)?;
        mask.thin();
        let skeleton_pixels = mask.count_foreground();

        let raw = detect_minutiae(&mask);
        let minutiae = filter_minutiae(raw, width, height, &self.config);
        info!(
            found = minutiae.len(),
            skeleton_pixels, "Minutiae extraction complete"
        );

        let overlay = render_overlay(&mask, &minutiae);

        Ok(Extraction {
            overlay,
            outcome: ExtractionOutcome {
                scan: ScanId::new(),
                width,
                height,
                minutiae,
                skeleton_pixels,
            },
        })
    }
}

impl Default for MinutiaeExtractor {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Crossing number at a skeleton pixel: half the sum of absolute differences
/// around the 8-neighbour cycle. 1 marks a ridge ending, 3 a bifurcation,
/// 2 an interior ridge pixel.
pub fn crossing_number(mask: &RidgeMask, x: i64, y: i64) -> u8 {
    let n = mask.neighbors(x, y);
    // For binary values, half the sum of |P(i) - P(i+1)| equals the number
    // of 0->1 transitions around the cycle.
    transitions(&n)
}

/// Scan the skeleton and report every ridge ending and bifurcation.
///
/// Border pixels are skipped here; the configurable margin filter applies on
/// top of that.
pub fn detect_minutiae(mask: &RidgeMask) -> Vec<Minutia> {
    let mut found = Vec::new();
    if mask.width() < 3 || mask.height() < 3 {
        return found;
    }

    for y in 1..(mask.height() as i64 - 1) {
        for x in 1..(mask.width() as i64 - 1) {
            if !mask.get(x, y) {
                continue;
            }
            let cn = crossing_number(mask, x, y);
            let kind = match cn {
                1 => MinutiaKind::RidgeEnding,
                3 => MinutiaKind::Bifurcation,
                _ => continue,
            };
            found.push(Minutia {
                x: x as u32,
                y: y as u32,
                kind,
                crossing_number: cn,
            });
        }
    }
    debug!(raw = found.len(), "Crossing-number scan complete");
    found
}

/// Drop minutiae within `border_margin` of the image edge, then collapse
/// pairs closer than `min_minutia_distance` (the first of each close pair
/// wins).
pub fn filter_minutiae(
    minutiae: Vec<Minutia>,
    width: u32,
    height: u32,
    config: &EngineConfig,
) -> Vec<Minutia> {
    let margin = config.border_margin;
    let min_dist_sq = (config.min_minutia_distance as i64).pow(2);

    let mut kept: Vec<Minutia> = Vec::new();
    for m in minutiae {
        let inside = m.x >= margin
            && m.y >= margin
            && m.x + margin < width
            && m.y + margin < height;
        if !inside {
            continue;
        }

        let crowded = kept.iter().any(|k| {
            let dx = k.x as i64 - m.x as i64;
            let dy = k.y as i64 - m.y as i64;
            dx * dx + dy * dy < min_dist_sq
        });
        if !crowded {
            kept.push(m);
        }
    }
    kept
}
