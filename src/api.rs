//! HTTP surface: router, shared state and the two JSON handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::engagers::{EngagerRecord, EngagerSource, MockEngagerSource};
use crate::metadata::MemorialMetadata;
use crate::pinning::{gateway_url, ipfs_uri, PinataClient, PinningService};
use crate::rendering::raster::render_composite;
use crate::tiles::{self, TileLimits};
use crate::{Error, Result, ServiceConfig};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    /// Client used for tile fetches
    pub http: reqwest::Client,
    pub pinning: Arc<dyn PinningService>,
    pub engagers: Arc<dyn EngagerSource>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        pinning: Arc<dyn PinningService>,
        engagers: Arc<dyn EngagerSource>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config: Arc::new(config),
            http,
            pinning,
            engagers,
        })
    }

    /// Production wiring: Pinata client and the mocked engager table.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let pinning = Arc::new(PinataClient::from_config(&config)?);
        let engagers = Arc::new(MockEngagerSource::new(Duration::from_millis(config.lookup_delay_ms)));
        Self::new(config, pinning, engagers)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/engagers", post(lookup_engagers))
        .route("/api/generate-memorial-nft", post(generate_memorial))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct EngagersRequest {
    pub fname: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EngagersResponse {
    pub success: bool,
    pub engagers: Vec<EngagerRecord>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn lookup_engagers(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EngagersRequest>, JsonRejection>,
) -> Result<Json<EngagersResponse>> {
    let fname = payload
        .ok()
        .and_then(|Json(body)| body.fname)
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| Error::Validation("fname is required".into()))?;

    let engagers = state.engagers.top_engagers(&fname).await?;
    info!("engager lookup for @{} returned {} records", fname, engagers.len());
    Ok(Json(EngagersResponse {
        success: true,
        engagers,
    }))
}

/// Token ids arrive either as JSON numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub fname: Option<String>,
    #[serde(rename = "tokenId")]
    pub token_id: Option<TokenId>,
    pub engagers: Option<Vec<EngagerRecord>>,
}

/// A generation request that passed validation
#[derive(Debug, Clone)]
pub struct MemorialRequest {
    pub fname: String,
    pub token_id: String,
    pub engagers: Vec<EngagerRecord>,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<MemorialRequest> {
        let fname = non_blank(self.fname).ok_or_else(|| Error::Validation("fname is required".into()))?;
        let token_id = match self.token_id {
            Some(TokenId::Number(n)) => n.to_string(),
            Some(TokenId::Text(s)) => {
                non_blank(Some(s)).ok_or_else(|| Error::Validation("tokenId is required".into()))?
            }
            None => return Err(Error::Validation("tokenId is required".into())),
        };
        let engagers = self
            .engagers
            .filter(|list| !list.is_empty())
            .ok_or_else(|| Error::Validation("engagers must be a non-empty list".into()))?;
        Ok(MemorialRequest {
            fname,
            token_id,
            engagers,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorialResponse {
    pub success: bool,
    #[serde(rename = "imageCID")]
    pub image_cid: String,
    #[serde(rename = "metadataCID")]
    pub metadata_cid: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    #[serde(rename = "metadataURI")]
    pub metadata_uri: String,
    #[serde(rename = "gatewayImage")]
    pub gateway_image: String,
    #[serde(rename = "gatewayMetadata")]
    pub gateway_metadata: String,
}

/// File-name-safe form of a handle or token id
fn slug(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

pub async fn generate_memorial(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<MemorialResponse>> {
    let Json(body) = payload.map_err(|e| Error::Validation(format!("invalid request body: {}", e.body_text())))?;
    let req = body.validate()?;
    info!(
        "generating memorial for @{} token {} with {} engagers",
        req.fname,
        req.token_id,
        req.engagers.len()
    );

    let limits = TileLimits {
        timeout: Duration::from_millis(state.config.tile_fetch_timeout_ms),
        max_bytes: state.config.max_tile_bytes,
    };
    let tiles = tiles::acquire_tiles(&state.http, &req.engagers, limits).await;

    let format = state.config.output_format;
    let image = tokio::task::spawn_blocking(move || render_composite(&tiles, format))
        .await
        .map_err(|e| Error::Other(format!("render task failed: {}", e)))??;

    let base_name = format!("memorial-{}-{}", slug(&req.fname), slug(&req.token_id));
    let mime_type = image.mime_type();
    let image_cid = state
        .pinning
        .pin_file(&format!("{}.{}", base_name, format.extension()), mime_type, image.data)
        .await
        .inspect_err(|e| error!("image pin failed for @{}: {}", req.fname, e))?;
    let image_uri = ipfs_uri(&image_cid);

    let metadata = MemorialMetadata::new(&req.fname, &req.token_id, &image_uri, &req.engagers);
    let document = serde_json::to_value(&metadata).map_err(|e| Error::Other(e.to_string()))?;
    let metadata_cid = match state.pinning.pin_json(&format!("{}.json", base_name), &document).await {
        Ok(cid) => cid,
        Err(e) => {
            error!("metadata pin failed for @{}: {}", req.fname, e);
            warn!("image {} stays pinned without metadata", image_cid);
            return Err(e);
        }
    };

    let gateway = &state.config.gateway_base;
    Ok(Json(MemorialResponse {
        success: true,
        gateway_image: gateway_url(gateway, &image_cid),
        gateway_metadata: gateway_url(gateway, &metadata_cid),
        metadata_uri: ipfs_uri(&metadata_cid),
        image_uri,
        image_cid,
        metadata_cid,
    }))
}
