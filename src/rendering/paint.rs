/// Solid fills used by the compositor

use image::{Rgb, RgbImage};

use super::layout::{CANVAS_HEIGHT, CANVAS_WIDTH, TILE_SIZE};

/// `#f0f4f8`
pub const BACKGROUND: Rgb<u8> = Rgb([0xf0, 0xf4, 0xf8]);
/// `#bdbdbd`
pub const PLACEHOLDER: Rgb<u8> = Rgb([0xbd, 0xbd, 0xbd]);

pub fn solid(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Empty output canvas filled with [`BACKGROUND`]
pub fn blank_canvas() -> RgbImage {
    solid(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND)
}

/// Tile substituted when a profile picture cannot be obtained
pub fn placeholder_tile() -> RgbImage {
    solid(TILE_SIZE, TILE_SIZE, PLACEHOLDER)
}
