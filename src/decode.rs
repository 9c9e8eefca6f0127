//! Image loading into [`PixelBuffer`]s.
//!
//! Files are decoded with the `image` crate (PNG, JPEG, PNM, OpenEXR). Integer
//! formats come out as gamma-encoded values in `[0, 1]`; EXR data is returned
//! as stored, i.e. linear light with an unbounded range.
//!
//! # Example
//!
//! ```ignore
//! use diffpool::decode::{is_hdr_path, load_image};
//!
//! let mut reference = load_image("render.png".as_ref())?;
//! if !is_hdr_path("render.png".as_ref()) {
//!     reference.srgb_to_linear();
//! }
//! ```

use std::path::Path;

use rgb::RGB;

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Decide whether a comparison runs in HDR mode.
///
/// The policy is a plain substring test: a path containing `"exr"` anywhere
/// (extension or not) is treated as a floating-point HDR container. Only the
/// reference path is consulted by the comparison driver, and HDR inputs skip
/// sRGB linearization.
#[must_use]
pub fn is_hdr_path(path: &Path) -> bool {
    path.to_string_lossy().contains("exr")
}

/// Load an image file as a three-channel float buffer.
///
/// Alpha is dropped. Grayscale images are expanded to RGB.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] with the offending path if the file can't be
/// read or its format isn't recognized.
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let image = image::open(path).map_err(|e| Error::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let rgb = image.to_rgb32f();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    let pixels: Vec<RGB<f32>> = rgb
        .pixels()
        .map(|p| RGB::new(p.0[0], p.0[1], p.0[2]))
        .collect();

    log::debug!("loaded {} ({}x{})", path.display(), width, height);

    PixelBuffer::new(pixels, width, height).map_err(|e| Error::ImageLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdr_detection_by_substring() {
        assert!(is_hdr_path(Path::new("renders/frame.exr")));
        assert!(is_hdr_path(Path::new("exr_outputs/frame.png")));
        assert!(!is_hdr_path(Path::new("renders/frame.png")));
        assert!(!is_hdr_path(Path::new("renders/frame.EXR")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image(Path::new("/nonexistent/reference.png")).unwrap_err();
        match err {
            Error::ImageLoad { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/reference.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_png_roundtrip_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grey.png");
        let data = vec![255u8, 0, 128].repeat(6);
        image::save_buffer(&path, &data, 3, 2, image::ColorType::Rgb8).unwrap();

        let buf = load_image(&path).unwrap();
        assert_eq!(buf.dimensions(), (3, 2));
        let p = buf.get(2, 1);
        assert!((p.r - 1.0).abs() < 1e-6);
        assert_eq!(p.g, 0.0);
        assert!((p.b - 128.0 / 255.0).abs() < 1e-6);
    }
}
