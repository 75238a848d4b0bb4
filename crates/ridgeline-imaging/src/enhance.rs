// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ridge enhancement pipeline — intensity normalization, histogram
// equalization, and binarization of a grayscale fingerprint scan.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use ridgeline_core::error::{Result, RidgelineError};
use ridgeline_core::{BinarizationMethod, EngineConfig};
use tracing::{debug, info, instrument};

/// Enhances a grayscale fingerprint scan into a binary ridge mask.
///
/// The pipeline stages mirror the capture driver this engine replaces:
/// normalize the intensity range, equalize the histogram, then binarize.
/// In the binary output, ridge pixels are black (0) and valleys white (255).
pub struct RidgeEnhancer {
    /// The working grayscale image.
    gray: GrayImage,
}

impl RidgeEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Create an enhancer from any decoded image, converting to grayscale.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self {
            gray: image.to_luma8(),
        }
    }

    /// Wrap an already-grayscale image.
    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray }
    }

    /// Borrow the current working image.
    pub fn as_gray(&self) -> &GrayImage {
        &self.gray
    }

    /// Consume the enhancer and return the working image.
    pub fn into_gray(self) -> GrayImage {
        self.gray
    }

    // -- Stages ---------------------------------------------------------------

    /// Stretch the intensity range to cover [0, 255].
    ///
    /// Constant images are returned unchanged, since there is no range to
    /// stretch.
    #[instrument(skip(self))]
    pub fn normalize(self) -> Self {
        let (min, max) = intensity_range(&self.gray);
        if min == max {
            debug!(level = min, "Constant image, normalization skipped");
            return self;
        }

        let span = (max - min) as u32;
        let gray = map_levels(&self.gray, |v| {
            (((v - min) as u32 * 255 + span / 2) / span) as u8
        });
        debug!(min, max, "Intensity normalized");
        Self { gray }
    }

    /// Gaussian blur for sensor-noise reduction. A sigma around 1.0 removes
    /// speckle without merging adjacent ridges at typical 500 dpi scans.
    #[instrument(skip(self), fields(sigma))]
    pub fn denoise(self, sigma: f32) -> Self {
        Self {
            gray: gaussian_blur_f32(&self.gray, sigma),
        }
    }

    /// Histogram equalization via the cumulative-histogram mapping
    /// `map[v] = 255 * cdf[v] / total`.
    #[instrument(skip(self))]
    pub fn equalize(self) -> Self {
        let total = self.gray.width() as u64 * self.gray.height() as u64;
        if total == 0 {
            return self;
        }

        let mut histogram = [0u64; 256];
        for pixel in self.gray.pixels() {
            histogram[pixel.0[0] as usize] += 1;
        }

        let mut mapping = [0u8; 256];
        let mut cumulative: u64 = 0;
        for (v, &count) in histogram.iter().enumerate() {
            cumulative += count;
            let mapped = (255.0 * cumulative as f64 / total as f64).clamp(0.0, 255.0);
            mapping[v] = mapped as u8;
        }

        let gray = map_levels(&self.gray, |v| mapping[v as usize]);
        debug!("Histogram equalized");
        Self { gray }
    }

    /// Binarize with the given method. Output pixels are strictly 0 (ridge)
    /// or 255 (valley).
    #[instrument(skip(self), fields(method = ?method))]
    pub fn binarize(self, method: BinarizationMethod) -> Self {
        match method {
            BinarizationMethod::Global { threshold } => self.binarize_global(threshold),
            BinarizationMethod::Otsu => {
                let threshold = otsu_threshold(&self.gray);
                debug!(threshold, "Otsu threshold computed");
                self.binarize_global(threshold)
            }
            BinarizationMethod::Adaptive { block_radius, c } => {
                self.binarize_adaptive(block_radius, c)
            }
        }
    }

    /// Fixed global threshold: pixels `>= threshold` become white (valley),
    /// the rest black (ridge).
    fn binarize_global(self, threshold: u8) -> Self {
        let gray = map_levels(&self.gray, |v| if v >= threshold { 255 } else { 0 });
        Self { gray }
    }

    /// Local mean threshold: for each pixel, the threshold is the mean
    /// intensity within a `block_radius` neighbourhood, minus a constant `c`.
    ///
    /// A typical `block_radius` is 15 and `c` is 10.
    fn binarize_adaptive(self, block_radius: u32, c: i32) -> Self {
        let (width, height) = self.gray.dimensions();

        // Integral image for fast local mean lookup.
        let integral = compute_integral_image(&self.gray);

        let mut output = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let local_mean = region_mean(&integral, width, height, x, y, block_radius);
                let threshold = (local_mean as i32 - c).clamp(0, 255) as u8;
                let v = self.gray.get_pixel(x, y).0[0];
                let binary = if v >= threshold { 255u8 } else { 0u8 };
                output.put_pixel(x, y, Luma([binary]));
            }
        }

        Self { gray: output }
    }

    // -- Full pipeline --------------------------------------------------------

    /// Run the configured enhancement pipeline:
    ///
    /// 1. Normalize the intensity range
    /// 2. Histogram equalization (if `config.equalize`)
    /// 3. Binarization with `config.binarization`
    ///
    /// This is the single-call method the extraction pipeline uses.
    #[instrument(skip(self, config))]
    pub fn enhance(self, config: &EngineConfig) -> Result<GrayImage> {
        if self.gray.width() == 0 || self.gray.height() == 0 {
            return Err(RidgelineError::EmptyImage);
        }

        info!(
            width = self.gray.width(),
            height = self.gray.height(),
            "Running enhancement pipeline"
        );

        let mut enhancer = self.normalize();
        if config.equalize {
            enhancer = enhancer.equalize();
        }
        Ok(enhancer.binarize(config.binarization).into_gray())
    }
}

// -- Histogram / integral image helpers ----------------------------------------

/// Apply a per-level mapping to every pixel.
fn map_levels(gray: &GrayImage, f: impl Fn(u8) -> u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = f(pixel.0[0]);
    }
    out
}

/// Minimum and maximum intensity of the image. Returns (0, 0) when empty.
fn intensity_range(gray: &GrayImage) -> (u8, u8) {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for pixel in gray.pixels() {
        let v = pixel.0[0];
        min = min.min(v);
        max = max.max(v);
    }
    if min > max {
        (0, 0)
    } else {
        (min, max)
    }
}

/// Compute the integral (summed-area table) of a grayscale image.
///
/// `integral[y * (width+1) + x]` contains the sum of all pixel values in the
/// rectangle [0, 0) to (x, y) (exclusive on both axes). The table has
/// dimensions `(width+1) x (height+1)` with a zero-padded border.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value within a square region centred on (cx, cy) with the
/// given radius, using the precomputed integral image.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(img_width as usize);
    let y2 = ((cy + radius + 1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    // Summed-area table lookup: S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64
        - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Finds the threshold value that maximises the between-class variance of
/// the ridge and valley pixel groups.
fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let mut sum_total: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([(x * 255 / (width - 1)) as u8]))
    }

    #[test]
    fn normalize_stretches_to_full_range() {
        // Intensities confined to [100, 150].
        let gray = GrayImage::from_fn(51, 1, |x, _| Luma([100 + x as u8]));
        let out = RidgeEnhancer::from_gray(gray).normalize().into_gray();

        let values: Vec<u8> = out.pixels().map(|p| p.0[0]).collect();
        assert_eq!(*values.first().expect("non-empty"), 0);
        assert_eq!(*values.last().expect("non-empty"), 255);
    }

    #[test]
    fn normalize_leaves_constant_image_alone() {
        let gray = GrayImage::from_pixel(10, 10, Luma([77u8]));
        let out = RidgeEnhancer::from_gray(gray.clone()).normalize().into_gray();
        assert_eq!(out, gray);
    }

    #[test]
    fn equalize_constant_image_stays_constant() {
        let gray = GrayImage::from_pixel(8, 8, Luma([42u8]));
        let out = RidgeEnhancer::from_gray(gray).equalize().into_gray();
        let first = out.get_pixel(0, 0).0[0];
        assert!(out.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn equalize_spreads_two_level_histogram() {
        // Half dark (60), half bright (70): equalization should push the two
        // levels far apart even though the input span is narrow.
        let gray = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 60u8 } else { 70u8 }]));
        let out = RidgeEnhancer::from_gray(gray).equalize().into_gray();

        let dark = out.get_pixel(0, 0).0[0];
        let bright = out.get_pixel(9, 0).0[0];
        assert!(bright as i32 - dark as i32 > 100, "dark={dark} bright={bright}");
        assert_eq!(bright, 255);
    }

    #[test]
    fn global_binarization_is_two_valued_with_ridge_black() {
        let out = RidgeEnhancer::from_gray(gradient(64, 4))
            .binarize(BinarizationMethod::Global { threshold: 128 })
            .into_gray();

        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // Below-threshold (dark) side is ridge black.
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(63, 0).0[0], 255);
    }

    #[test]
    fn otsu_separates_bimodal_image() {
        // Two well-separated intensity populations at 40 and 210.
        let gray = GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 40u8 } else { 210u8 }]));
        let threshold = otsu_threshold(&gray);
        assert!(
            (40..=210).contains(&threshold),
            "threshold {threshold} outside modes"
        );

        let out = RidgeEnhancer::from_gray(gray)
            .binarize(BinarizationMethod::Otsu)
            .into_gray();
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(19, 0).0[0], 255);
    }

    #[test]
    fn adaptive_binarization_is_two_valued() {
        let out = RidgeEnhancer::from_gray(gradient(32, 32))
            .binarize(BinarizationMethod::Adaptive {
                block_radius: 5,
                c: 3,
            })
            .into_gray();
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn enhance_rejects_empty_image() {
        let err = RidgeEnhancer::from_gray(GrayImage::new(0, 0))
            .enhance(&EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, RidgelineError::EmptyImage));
    }

    #[test]
    fn enhance_produces_binary_output() {
        let out = RidgeEnhancer::from_gray(gradient(40, 40))
            .enhance(&EngineConfig::default())
            .expect("enhance");
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert_eq!((out.width(), out.height()), (40, 40));
    }

    #[test]
    fn denoise_preserves_dimensions() {
        let out = RidgeEnhancer::from_gray(gradient(24, 18))
            .denoise(1.0)
            .into_gray();
        assert_eq!((out.width(), out.height()), (24, 18));
    }
}
