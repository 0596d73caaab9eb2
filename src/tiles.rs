//! Concurrent profile-picture acquisition.
//!
//! Every engager gets exactly one tile. Each fetch is its own task, bounded
//! by the configured timeout and byte cap, and decodes on the blocking pool.
//! A failed fetch is turned into the gray placeholder at the call site and
//! never aborts the batch.

use std::fmt;
use std::time::Duration;

use futures::future::join_all;
use image::imageops::FilterType;
use image::RgbImage;
use log::{debug, warn};
use url::Url;

use crate::engagers::EngagerRecord;
use crate::rendering::layout::{MAX_TILES, TILE_SIZE};
use crate::rendering::SourceTile;

/// Default cap on a downloaded profile picture body
pub const MAX_TILE_BYTES: u64 = 10 * 1024 * 1024;

/// Why a tile could not be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileFailure {
    /// The record carries no image URL
    MissingUrl,
    /// The URL is not an absolute http(s) URL
    InvalidUrl(String),
    /// Fetch and read did not finish in time
    Timeout(u64),
    /// Transport or body read error
    Network(String),
    /// The image host answered with a non-success status
    Status(u16),
    /// The body exceeds the byte cap
    TooLarge(u64),
    /// The body is not a decodable image
    Decode(String),
    /// The acquisition task panicked or was cancelled
    Task(String),
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileFailure::MissingUrl => f.write_str("no image url"),
            TileFailure::InvalidUrl(u) => write!(f, "invalid image url {:?}", u),
            TileFailure::Timeout(ms) => write!(f, "timed out after {}ms", ms),
            TileFailure::Network(e) => write!(f, "network error: {}", e),
            TileFailure::Status(s) => write!(f, "http status {}", s),
            TileFailure::TooLarge(cap) => write!(f, "body larger than {} bytes", cap),
            TileFailure::Decode(e) => write!(f, "decode error: {}", e),
            TileFailure::Task(e) => write!(f, "task failed: {}", e),
        }
    }
}

/// Outcome of a single tile fetch
#[derive(Debug, Clone)]
pub enum TileFetch {
    Fetched(RgbImage),
    Failed(TileFailure),
}

impl TileFetch {
    /// Turn the outcome into a tile, substituting the placeholder on failure.
    pub fn into_tile(self, owner: &str) -> SourceTile {
        match self {
            TileFetch::Fetched(pixels) => SourceTile {
                pixels,
                owner: owner.to_string(),
                is_placeholder: false,
            },
            TileFetch::Failed(reason) => {
                warn!("using placeholder tile for @{}: {}", owner, reason);
                SourceTile::placeholder(owner)
            }
        }
    }
}

/// Limits applied to every tile acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLimits {
    /// Bound on fetch plus body read; decoding is not counted
    pub timeout: Duration,
    /// Largest accepted body in bytes
    pub max_bytes: u64,
}

impl TileLimits {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_bytes: MAX_TILE_BYTES,
        }
    }
}

/// Decode raw bytes and cover-fit them to a square RGB tile.
///
/// CPU heavy for large pictures; async callers go through [`decode_off_runtime`].
pub fn decode_tile(bytes: &[u8]) -> Result<RgbImage, TileFailure> {
    let img = image::load_from_memory(bytes).map_err(|e| TileFailure::Decode(e.to_string()))?;
    Ok(img
        .resize_to_fill(TILE_SIZE, TILE_SIZE, FilterType::Lanczos3)
        .to_rgb8())
}

/// Run [`decode_tile`] on the blocking pool so async workers keep polling.
pub async fn decode_off_runtime(bytes: Vec<u8>) -> Result<RgbImage, TileFailure> {
    tokio::task::spawn_blocking(move || decode_tile(&bytes))
        .await
        .map_err(|e| TileFailure::Task(e.to_string()))?
}

fn parse_image_url(raw: Option<&str>) -> Result<Url, TileFailure> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(TileFailure::MissingUrl)?;
    match Url::parse(raw) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(u),
        _ => Err(TileFailure::InvalidUrl(raw.to_string())),
    }
}

async fn download(client: &reqwest::Client, url: Url, max_bytes: u64) -> Result<Vec<u8>, TileFailure> {
    let mut res = client
        .get(url)
        .send()
        .await
        .map_err(|e| TileFailure::Network(e.to_string()))?;
    if !res.status().is_success() {
        return Err(TileFailure::Status(res.status().as_u16()));
    }
    if res.content_length().is_some_and(|len| len > max_bytes) {
        return Err(TileFailure::TooLarge(max_bytes));
    }

    // Content-Length may be absent (chunked), so the cap is enforced while reading too
    let mut body = Vec::new();
    while let Some(chunk) = res
        .chunk()
        .await
        .map_err(|e| TileFailure::Network(e.to_string()))?
    {
        if body.len() as u64 + chunk.len() as u64 > max_bytes {
            return Err(TileFailure::TooLarge(max_bytes));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Fetch and decode one profile picture. Never errors; failures are tagged.
pub async fn fetch_tile(client: &reqwest::Client, image_url: Option<&str>, limits: TileLimits) -> TileFetch {
    let url = match parse_image_url(image_url) {
        Ok(u) => u,
        Err(reason) => return TileFetch::Failed(reason),
    };

    debug!("fetching tile {}", url);
    let bytes = match tokio::time::timeout(limits.timeout, download(client, url, limits.max_bytes)).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(reason)) => return TileFetch::Failed(reason),
        Err(_) => return TileFetch::Failed(TileFailure::Timeout(limits.timeout.as_millis() as u64)),
    };

    match decode_off_runtime(bytes).await {
        Ok(pixels) => TileFetch::Fetched(pixels),
        Err(reason) => TileFetch::Failed(reason),
    }
}

/// Acquire tiles for the first [`MAX_TILES`] engagers, preserving order.
///
/// Each acquisition runs as its own task so a slow or heavy tile cannot
/// starve its siblings. Waits for every task; there are no partial results.
pub async fn acquire_tiles(
    client: &reqwest::Client,
    engagers: &[EngagerRecord],
    limits: TileLimits,
) -> Vec<SourceTile> {
    let selected = &engagers[..engagers.len().min(MAX_TILES)];
    let handles = selected.iter().map(|e| {
        let client = client.clone();
        let url = e.pfp_url.clone();
        tokio::spawn(async move { fetch_tile(&client, url.as_deref(), limits).await })
    });
    let outcomes = join_all(handles).await;

    outcomes
        .into_iter()
        .zip(selected)
        .map(|(joined, engager)| {
            let outcome = joined.unwrap_or_else(|e| TileFetch::Failed(TileFailure::Task(e.to_string())));
            outcome.into_tile(&engager.fname)
        })
        .collect()
}
