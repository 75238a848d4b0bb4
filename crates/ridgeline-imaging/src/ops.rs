// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan image wrapper — decode/encode plus the geometric and tonal operations
// of the engine's public surface. Operates on in-memory images using the
// `image` crate.

use image::{DynamicImage, ImageFormat, imageops::FilterType};
use ridgeline_core::error::{Result, RidgelineError};
use ridgeline_core::InterpolationMode;
use tracing::{debug, info, instrument};

/// A fingerprint scan held in memory.
///
/// All operations are non-destructive: each method consumes `self` and
/// returns a new `ScanImage` wrapping the transformed image, enabling method
/// chaining.
///
/// ```ignore
/// let result = ScanImage::open("scan.png")?
///     .grayscale()
///     .resize(512, 512, InterpolationMode::Lanczos)?
///     .to_png_bytes()?;
/// ```
#[derive(Debug)]
pub struct ScanImage {
    /// The current working image.
    image: DynamicImage,
}

impl ScanImage {
    // -- Construction ---------------------------------------------------------

    /// Load a scan from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            RidgelineError::Decode(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Scan loaded");
        Ok(Self { image: img })
    }

    /// Create a scan from raw encoded bytes (PNG, JPEG, TIFF, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| RidgelineError::Decode(format!("failed to decode scan: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Scan decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the wrapper and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Convert the scan to single-channel 8-bit grayscale.
    ///
    /// Already-gray scans pass through with their pixel values unchanged.
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        info!("Converting to grayscale");
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Resize the scan to exactly `width` x `height` with the given filter.
    ///
    /// Aspect ratio is not preserved; the caller controls both dimensions,
    /// matching the engine's historical resize contract.
    #[instrument(skip(self), fields(width, height, mode = ?mode))]
    pub fn resize(self, width: u32, height: u32, mode: InterpolationMode) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RidgelineError::EmptyImage);
        }
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            width,
            height,
            "Resizing scan"
        );
        let resized = self.image.resize_exact(width, height, filter_for(mode));
        Ok(Self { image: resized })
    }

    /// Resize using a numeric interpolation code (the native-library wire
    /// convention). Unknown codes are rejected.
    pub fn resize_code(self, width: u32, height: u32, code: i32) -> Result<Self> {
        let mode = InterpolationMode::from_code(code)
            .ok_or(RidgelineError::UnknownInterpolation(code))?;
        self.resize(width, height, mode)
    }

    /// Crop a rectangular region from the scan.
    ///
    /// `x` and `y` are the top-left corner. Values are clamped to image bounds.
    #[instrument(skip(self), fields(x, y, width, height))]
    pub fn crop(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = x.min(img_w.saturating_sub(1));
        let safe_y = y.min(img_h.saturating_sub(1));
        let safe_w = width.min(img_w - safe_x);
        let safe_h = height.min(img_h - safe_y);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping scan");

        let cropped = self.image.crop_imm(safe_x, safe_y, safe_w, safe_h);
        Self { image: cropped }
    }

    /// Invert pixel intensities. Useful for scans captured with light ridges
    /// on a dark background.
    pub fn invert(self) -> Self {
        let mut image = self.image;
        image.invert();
        Self { image }
    }

    /// Adjust contrast by a factor. Values > 1.0 increase contrast; values
    /// < 1.0 decrease it. A value of 1.0 is a no-op.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let gray = self.image.to_luma8();
        let adjusted = image::ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            let val = factor * (v as f32 - 128.0) + 128.0;
            image::Luma([val.clamp(0.0, 255.0) as u8])
        });
        Self {
            image: DynamicImage::ImageLuma8(adjusted),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current scan as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| RidgelineError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the scan to a file. The format is inferred from the extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            RidgelineError::Encode(format!(
                "failed to save scan to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Map an interpolation mode to the `image` crate filter that implements it.
fn filter_for(mode: InterpolationMode) -> FilterType {
    match mode {
        InterpolationMode::Nearest => FilterType::Nearest,
        InterpolationMode::Linear => FilterType::Triangle,
        InterpolationMode::Cubic => FilterType::CatmullRom,
        // No pixel-area filter exists in the backend; Gaussian is the closest
        // smoothing filter for strong downscales.
        InterpolationMode::Area => FilterType::Gaussian,
        InterpolationMode::Lanczos => FilterType::Lanczos3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn rgb_test_image() -> ScanImage {
        let img = RgbImage::from_fn(16, 12, |x, y| Rgb([(x * 16) as u8, (y * 20) as u8, 128]));
        ScanImage::from_dynamic(DynamicImage::ImageRgb8(img))
    }

    #[test]
    fn grayscale_is_single_channel_same_dims() {
        let out = rgb_test_image().grayscale().into_dynamic();
        assert_eq!(out.color().channel_count(), 1);
        assert_eq!((out.width(), out.height()), (16, 12));
    }

    #[test]
    fn grayscale_fixed_point_on_gray_input() {
        let gray = GrayImage::from_fn(8, 8, |x, y| Luma([(x + y * 8) as u8]));
        let before = gray.clone();
        let out = ScanImage::from_dynamic(DynamicImage::ImageLuma8(gray))
            .grayscale()
            .into_dynamic()
            .to_luma8();
        assert_eq!(out, before);
    }

    #[test]
    fn resize_hits_exact_dimensions_for_every_mode() {
        for code in 0..=4 {
            let out = rgb_test_image()
                .resize_code(9, 21, code)
                .expect("known code")
                .into_dynamic();
            assert_eq!((out.width(), out.height()), (9, 21), "code {code}");
        }
    }

    #[test]
    fn resize_rejects_unknown_code() {
        let err = rgb_test_image().resize_code(8, 8, 7).unwrap_err();
        assert!(matches!(err, RidgelineError::UnknownInterpolation(7)));
    }

    #[test]
    fn resize_rejects_zero_dimensions() {
        let err = rgb_test_image()
            .resize(0, 10, InterpolationMode::Nearest)
            .unwrap_err();
        assert!(matches!(err, RidgelineError::EmptyImage));
    }

    #[test]
    fn crop_clamps_to_bounds() {
        let out = rgb_test_image().crop(10, 10, 100, 100);
        assert_eq!((out.width(), out.height()), (6, 2));
    }

    #[test]
    fn invert_round_trips() {
        let original = rgb_test_image().grayscale().into_dynamic().to_luma8();
        let twice = ScanImage::from_dynamic(DynamicImage::ImageLuma8(original.clone()))
            .invert()
            .invert()
            .into_dynamic()
            .to_luma8();
        assert_eq!(twice, original);
    }

    #[test]
    fn png_bytes_round_trip() {
        let bytes = rgb_test_image().grayscale().to_png_bytes().expect("encode");
        let back = ScanImage::from_bytes(&bytes).expect("decode");
        assert_eq!((back.width(), back.height()), (16, 12));
    }

    #[test]
    fn save_and_open_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scan.png");

        rgb_test_image().save(&path).expect("save");
        let back = ScanImage::open(&path).expect("open");
        assert_eq!((back.width(), back.height()), (16, 12));
    }

    #[test]
    fn open_missing_file_is_decode_error() {
        let err = ScanImage::open("/nonexistent/scan.png").unwrap_err();
        assert!(matches!(err, RidgelineError::Decode(_)));
    }
}
