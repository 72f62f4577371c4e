//! Stretches arbitrary bitmaps onto power-of-two canvases so they upload on
//! contexts without non-power-of-two texture support.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Supported canvas edge lengths, ascending.
pub const POT_BUCKETS: [u32; 5] = [128, 256, 512, 1024, 2048];

/// Smallest bucket that holds `size`; anything from 1024 up lands in 2048.
pub fn pot_bucket(size: u32) -> u32 {
    match size {
        0..=128 => 128,
        129..=256 => 256,
        257..=512 => 512,
        513..=1023 => 1024,
        _ => 2048,
    }
}

/// Resamples `source` (stretched, not letterboxed) to its bucketed dimensions
/// and returns the raw RGBA pixels.
pub fn normalize(source: &RgbaImage) -> RgbaImage {
    let width = pot_bucket(source.width());
    let height = pot_bucket(source.height());
    log::debug!(
        "normalizing {}x{} bitmap to {}x{}",
        source.width(),
        source.height(),
        width,
        height
    );
    imageops::resize(source, width, height, FilterType::Triangle)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(pot_bucket(1), 128);
        assert_eq!(pot_bucket(128), 128);
        assert_eq!(pot_bucket(129), 256);
        assert_eq!(pot_bucket(512), 512);
        assert_eq!(pot_bucket(300), 512);
        assert_eq!(pot_bucket(1023), 1024);
        assert_eq!(pot_bucket(1024), 2048);
        assert_eq!(pot_bucket(4096), 2048);
    }

    #[test]
    fn dimensions_are_bucketed_independently() {
        let source = RgbaImage::from_pixel(300, 90, Rgba([10, 20, 30, 255]));
        let out = normalize(&source);
        assert_eq!(out.dimensions(), (512, 128));
        assert_eq!(out.as_raw().len(), 512 * 128 * 4);
        // A flat source stays flat after stretching.
        assert_eq!(*out.get_pixel(200, 64), Rgba([10, 20, 30, 255]));
    }

    proptest! {
        #[test]
        fn bucket_is_smallest_fitting_value(d in 0u32..5000) {
            let b = pot_bucket(d);
            prop_assert!(POT_BUCKETS.contains(&b));
            if d >= 1024 {
                prop_assert_eq!(b, 2048);
            } else {
                let smallest = POT_BUCKETS.iter().copied().find(|&v| v >= d).unwrap();
                prop_assert_eq!(b, smallest);
            }
        }
    }
}
