// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C-ABI surface for the Ridgeline engine.
//
// Exposes the four historical wrapper operations (version query, grayscale,
// resize, minutiae extraction) over encoded image buffers, so mobile and
// desktop hosts can embed the engine without linking Rust directly. Images
// cross the boundary as encoded bytes (PNG/JPEG in, PNG out); ownership of
// returned buffers transfers to the caller, who must release them with
// `ridgeline_buffer_free`.

use std::ffi::{c_char, CString};
use std::sync::OnceLock;

use ridgeline_core::RidgelineError;
use ridgeline_imaging::{engine_version, ScanImage};
use ridgeline_minutiae::MinutiaeExtractor;

/// Operation completed.
pub const RIDGELINE_OK: i32 = 0;
/// A required pointer argument was null.
pub const RIDGELINE_ERR_NULL: i32 = -1;
/// The input bytes could not be decoded as an image.
pub const RIDGELINE_ERR_DECODE: i32 = -2;
/// The interpolation code is not one of 0..=4.
pub const RIDGELINE_ERR_INTERPOLATION: i32 = -3;
/// The image (or a requested dimension) is empty.
pub const RIDGELINE_ERR_EMPTY: i32 = -4;
/// The scan is too small for minutiae analysis.
pub const RIDGELINE_ERR_TOO_SMALL: i32 = -5;
/// Any other engine failure (encoding, pipeline internals).
pub const RIDGELINE_ERR_INTERNAL: i32 = -6;

/// A heap buffer whose ownership has transferred to the caller.
#[repr(C)]
pub struct RidgelineBuffer {
    pub data: *mut u8,
    pub len: usize,
}

impl RidgelineBuffer {
    fn empty() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
        }
    }

    fn from_vec(vec: Vec<u8>) -> Self {
        let boxed = vec.into_boxed_slice();
        let len = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8;
        Self { data, len }
    }
}

/// Engine version as a NUL-terminated UTF-8 string.
///
/// The returned pointer refers to a process-lifetime static; the caller must
/// not free it.
#[unsafe(no_mangle)]
pub extern "C" fn ridgeline_version() -> *const c_char {
    static VERSION: OnceLock<CString> = OnceLock::new();
    VERSION
        .get_or_init(|| {
            CString::new(engine_version().to_string())
                .unwrap_or_else(|_| CString::new("ridgeline").expect("static string"))
        })
        .as_ptr()
}

/// Decode `data`, convert to grayscale, re-encode as PNG into `out`.
///
/// # Safety
/// `data` must point to `len` readable bytes and `out` to a writable
/// `RidgelineBuffer`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ridgeline_grayscale(
    data: *const u8,
    len: usize,
    out: *mut RidgelineBuffer,
) -> i32 {
    // SAFETY: forwarded from this function's own contract.
    unsafe { run_image_op(data, len, out, |scan| scan.grayscale().to_png_bytes()) }
}

/// Decode `data`, resize to `width` x `height` using the numeric
/// interpolation code (0..=4), re-encode as PNG into `out`.
///
/// # Safety
/// `data` must point to `len` readable bytes and `out` to a writable
/// `RidgelineBuffer`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ridgeline_resize(
    data: *const u8,
    len: usize,
    width: u32,
    height: u32,
    interpolation: i32,
    out: *mut RidgelineBuffer,
) -> i32 {
    // SAFETY: forwarded from this function's own contract.
    unsafe {
        run_image_op(data, len, out, |scan| {
            scan.resize_code(width, height, interpolation)?.to_png_bytes()
        })
    }
}

/// Decode `data`, run the full minutiae extraction pipeline with default
/// configuration, and write the annotated overlay as PNG into `out`.
///
/// # Safety
/// `data` must point to `len` readable bytes and `out` to a writable
/// `RidgelineBuffer`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ridgeline_extract_minutiae(
    data: *const u8,
    len: usize,
    out: *mut RidgelineBuffer,
) -> i32 {
    // SAFETY: forwarded from this function's own contract.
    unsafe {
        run_image_op(data, len, out, |scan| {
            let extraction = MinutiaeExtractor::default().extract(scan.as_dynamic())?;
            ScanImage::from_dynamic(extraction.overlay.into()).to_png_bytes()
        })
    }
}

/// Release a buffer previously returned by this library. Null data is a
/// no-op.
///
/// # Safety
/// `buffer` must be exactly as returned by a ridgeline call, and must not be
/// freed twice.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ridgeline_buffer_free(buffer: RidgelineBuffer) {
    if buffer.data.is_null() {
        return;
    }
    // SAFETY: the buffer was produced by `RidgelineBuffer::from_vec`, so the
    // pointer and length reconstitute the original allocation.
    unsafe {
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            buffer.data,
            buffer.len,
        )));
    }
}

/// Shared decode/operate/encode plumbing for the image-in/image-out calls.
///
/// # Safety
/// See the callers: `data` must be `len` readable bytes, `out` writable.
unsafe fn run_image_op(
    data: *const u8,
    len: usize,
    out: *mut RidgelineBuffer,
    op: impl FnOnce(ScanImage) -> Result<Vec<u8>, RidgelineError>,
) -> i32 {
    if data.is_null() || out.is_null() {
        return RIDGELINE_ERR_NULL;
    }
    // SAFETY: caller guarantees `data` points to `len` readable bytes.
    let bytes = unsafe { std::slice::from_raw_parts(data, len) };

    let result = ScanImage::from_bytes(bytes).and_then(op);
    // SAFETY: caller guarantees `out` is writable.
    unsafe {
        match result {
            Ok(encoded) => {
                *out = RidgelineBuffer::from_vec(encoded);
                RIDGELINE_OK
            }
            Err(err) => {
                *out = RidgelineBuffer::empty();
                status_for(&err)
            }
        }
    }
}

fn status_for(err: &RidgelineError) -> i32 {
    match err {
        RidgelineError::Decode(_) => RIDGELINE_ERR_DECODE,
        RidgelineError::UnknownInterpolation(_) => RIDGELINE_ERR_INTERPOLATION,
        RidgelineError::EmptyImage => RIDGELINE_ERR_EMPTY,
        RidgelineError::TooSmall { .. } => RIDGELINE_ERR_TOO_SMALL,
        _ => RIDGELINE_ERR_INTERNAL,
    }
}
