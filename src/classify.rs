//! Background classification rule.
//!
//! A pixel is background when its red, green and blue channels are all
//! strictly above the threshold. Alpha takes no part in the test. Background
//! pixels are replaced with fully transparent white; every other pixel keeps
//! its value.
//!
//! Nothing here touches the filesystem, so every [`Backend`](crate::Backend)
//! shares the same rule.

use image::{DynamicImage, Rgba, RgbaImage};

/// Default per-channel brightness cutoff.
pub const DEFAULT_THRESHOLD: u8 = 240;

/// Replacement value for background pixels.
pub const TRANSPARENT_WHITE: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Whether `pixel` counts as background for the given `threshold`.
///
/// The comparison is strict: a channel equal to the threshold is not bright
/// enough.
#[must_use]
#[inline]
pub fn is_background(pixel: Rgba<u8>, threshold: u8) -> bool {
    let [r, g, b, _] = pixel.0;
    r > threshold && g > threshold && b > threshold
}

/// Replace every background pixel in-place with [`TRANSPARENT_WHITE`].
///
/// Returns the number of pixels classified as background.
pub fn strip_pixels(image: &mut RgbaImage, threshold: u8) -> usize {
    let mut cleared = 0;
    for px in image.pixels_mut() {
        if is_background(*px, threshold) {
            *px = TRANSPARENT_WHITE;
            cleared += 1;
        }
    }
    cleared
}

/// Normalize a decoded image to RGBA and strip its background.
///
/// Images without an alpha channel get one at 255 before classification.
#[must_use]
pub fn strip_image(image: &DynamicImage, threshold: u8) -> (RgbaImage, usize) {
    let mut rgba = image.to_rgba8();
    let cleared = strip_pixels(&mut rgba, threshold);
    (rgba, cleared)
}
