/// Flattens tiles onto the canvas and encodes the result

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageFormat, RgbImage};

use super::layout::{grid_layout, CANVAS_HEIGHT, CANVAS_WIDTH};
use super::paint::blank_canvas;
use super::{CompositeImage, SourceTile};
use crate::{OutputFormat, Result};

/// Paint up to [`MAX_TILES`](super::layout::MAX_TILES) tiles onto a fresh background canvas.
///
/// Tiles are painted in index order; anything past index 4 is ignored. An
/// empty slice yields the bare background.
pub fn compose(tiles: &[SourceTile]) -> RgbImage {
    let mut canvas = blank_canvas();
    for (tile, at) in tiles.iter().zip(grid_layout(tiles.len())) {
        imageops::replace(&mut canvas, &tile.pixels, at.left as i64, at.top as i64);
    }
    canvas
}

pub fn encode(canvas: &RgbImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png => {
            DynamicImage::ImageRgb8(canvas.clone()).write_to(&mut out, ImageFormat::Png)?;
        }
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut out, 90);
            DynamicImage::ImageRgb8(canvas.clone()).write_with_encoder(encoder)?;
        }
    }
    Ok(out.into_inner())
}

/// Compose and encode in one step.
pub fn render_composite(tiles: &[SourceTile], format: OutputFormat) -> Result<CompositeImage> {
    let canvas = compose(tiles);
    let data = encode(&canvas, format)?;
    Ok(CompositeImage {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        format,
        data,
    })
}
