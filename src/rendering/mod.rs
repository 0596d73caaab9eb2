//! Grid compositing for memorial images

pub mod layout;
pub mod paint;
pub mod raster;

use image::RgbImage;

use crate::OutputFormat;

/// One square tile to be placed on the canvas.
#[derive(Debug, Clone)]
pub struct SourceTile {
    /// 3-channel pixels, expected to be `TILE_SIZE` x `TILE_SIZE`
    pub pixels: RgbImage,
    /// Handle of the engager the tile belongs to
    pub owner: String,
    /// Whether this tile is the solid placeholder rather than a fetched picture
    pub is_placeholder: bool,
}

impl SourceTile {
    pub fn placeholder(owner: impl Into<String>) -> Self {
        Self {
            pixels: paint::placeholder_tile(),
            owner: owner.into(),
            is_placeholder: true,
        }
    }
}

/// An encoded composite ready for upload.
#[derive(Debug, Clone)]
pub struct CompositeImage {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub data: Vec<u8>,
}

impl CompositeImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
