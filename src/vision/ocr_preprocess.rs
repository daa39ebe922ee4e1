//! Image preprocessing for OCR
//!
//! Scanned forms have uneven lighting and faint handwriting. The page is
//! converted to grayscale, optionally contrast-stretched, then binarized with
//! a local (adaptive) threshold. Geometry is never changed, so OCR boxes on
//! the processed page line up with the original.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::adaptive_threshold;
use tracing::debug;

use crate::config::PreprocessSettings;

/// Produce the page handed to OCR
pub fn preprocess_for_ocr(image: &DynamicImage, settings: &PreprocessSettings) -> GrayImage {
    let mut gray = image.to_luma8();

    if !settings.enabled {
        debug!("OCR preprocessing disabled, grayscale only");
        return gray;
    }

    debug!(
        "OCR preprocessing: contrast={}, block_radius={}",
        settings.contrast, settings.block_radius
    );

    if (settings.contrast - 1.0).abs() > 0.01 {
        apply_contrast(&mut gray, settings.contrast);
    }

    if settings.block_radius > 0 {
        gray = adaptive_threshold(&gray, settings.block_radius);
    }

    gray
}

/// Contrast stretch around mid-grey.
/// Factor > 1.0 increases contrast, < 1.0 decreases
fn apply_contrast(image: &mut GrayImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let val = pixel.0[0] as f32;
        pixel.0[0] = ((val - 128.0) * factor + 128.0).clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_preserves_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(37, 21));
        let settings = PreprocessSettings::default();
        let out = preprocess_for_ocr(&image, &settings);
        assert_eq!(out.dimensions(), (37, 21));
    }

    #[test]
    fn test_disabled_is_plain_grayscale() {
        let mut rgb = RgbImage::new(1, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        let image = DynamicImage::ImageRgb8(rgb);
        let settings = PreprocessSettings {
            enabled: false,
            ..Default::default()
        };
        let out = preprocess_for_ocr(&image, &settings);
        assert_eq!(out, image.to_luma8());
    }

    #[test]
    fn test_contrast_increase() {
        let mut img = GrayImage::from_raw(3, 1, vec![100, 128, 200]).unwrap();
        apply_contrast(&mut img, 2.0);
        // 100: (100-128)*2+128 = 72
        // 128: unchanged
        // 200: (200-128)*2+128 = 272 -> clamped to 255
        assert_eq!(img.get_pixel(0, 0), &Luma([72]));
        assert_eq!(img.get_pixel(1, 0), &Luma([128]));
        assert_eq!(img.get_pixel(2, 0), &Luma([255]));
    }

    #[test]
    fn test_threshold_binarizes() {
        let img = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([40]) } else { Luma([220]) });
        let settings = PreprocessSettings {
            enabled: true,
            contrast: 1.0,
            block_radius: 3,
        };
        let out = preprocess_for_ocr(&DynamicImage::ImageLuma8(img), &settings);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }
}
