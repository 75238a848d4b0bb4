// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotated overlay rendering — skeleton plus minutiae markers.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut};
use ridgeline_core::{Minutia, MinutiaKind};

use crate::thinning::RidgeMask;

/// Marker colour for ridge endings.
const ENDING_COLOR: Rgb<u8> = Rgb([220, 30, 30]);
/// Marker colour for bifurcations.
const BIFURCATION_COLOR: Rgb<u8> = Rgb([30, 60, 220]);
/// Skeleton ink on the white canvas.
const SKELETON_COLOR: Rgb<u8> = Rgb([40, 40, 40]);

const ENDING_RADIUS: i32 = 3;

/// Render the skeleton dark-on-white and mark every minutia: hollow circles
/// for ridge endings, crosses for bifurcations.
///
/// This is the image the extraction operation returns, matching the
/// image-in/image-out contract of the engine's public surface.
pub fn render_overlay(mask: &RidgeMask, minutiae: &[Minutia]) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(mask.width(), mask.height(), Rgb([255, 255, 255]));

    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x as i64, y as i64) {
                canvas.put_pixel(x, y, SKELETON_COLOR);
            }
        }
    }

    for m in minutiae {
        match m.kind {
            MinutiaKind::RidgeEnding => {
                draw_hollow_circle_mut(
                    &mut canvas,
                    (m.x as i32, m.y as i32),
                    ENDING_RADIUS,
                    ENDING_COLOR,
                );
            }
            MinutiaKind::Bifurcation => {
                draw_cross_mut(&mut canvas, BIFURCATION_COLOR, m.x as i32, m.y as i32);
            }
        }
    }

    canvas
}
