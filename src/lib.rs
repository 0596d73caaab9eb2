//! Memorial Grid
//!
//! Backend for two JSON endpoints:
//!
//! - **Engager lookup**: returns a ranked list of engagers for a handle.
//! - **Memorial generation**: fetches up to five profile pictures, flattens them
//!   into a fixed 800x500 grid image, pins the image and an NFT metadata
//!   document to IPFS and returns the resulting content identifiers.
//!
//! # Example
//!
//! ```no_run
//! use memorial_grid::{api, ServiceConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig {
//!     tile_fetch_timeout_ms: 5_000,
//!     ..Default::default()
//! };
//!
//! let state = api::AppState::from_config(config)?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, api::router(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod api;
pub mod engagers;
pub mod metadata;
pub mod pinning;
pub mod rendering;
pub mod tiles;

pub use engagers::{EngagerRecord, EngagerSource, MockEngagerSource};
pub use pinning::{PinataClient, PinningService};
pub use rendering::{CompositeImage, SourceTile};

/// Configuration for the backend service
///
/// The defaults match the production deployment except for credentials,
/// which are never defaulted:
/// - tile fetches time out after 10 seconds
/// - the mocked engager source simulates one second of latency
/// - output images are PNG
///
/// # Examples
///
/// ```
/// let cfg = memorial_grid::ServiceConfig::default();
/// assert_eq!(cfg.tile_fetch_timeout_ms, 10_000);
/// assert!(cfg.credentials.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// User agent sent with outbound tile fetches
    pub user_agent: String,
    /// Per-tile fetch timeout in milliseconds
    pub tile_fetch_timeout_ms: u64,
    /// Largest accepted profile picture body in bytes
    pub max_tile_bytes: u64,
    /// Simulated latency of the mocked engager source in milliseconds
    pub lookup_delay_ms: u64,
    /// Raster format of the composed image
    pub output_format: OutputFormat,
    /// Base URL of the pinning API
    pub pinning_api_base: String,
    /// Base URL of the public IPFS gateway, without trailing slash
    pub gateway_base: String,
    /// Pinning credentials; `None` defers failure to the first pin attempt
    pub credentials: Option<PinningCredentials>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            user_agent: concat!("memorial-grid/", env!("CARGO_PKG_VERSION")).to_string(),
            tile_fetch_timeout_ms: 10_000,
            max_tile_bytes: tiles::MAX_TILE_BYTES,
            lookup_delay_ms: 1_000,
            output_format: OutputFormat::Png,
            pinning_api_base: "https://api.pinata.cloud".to_string(),
            gateway_base: "https://gateway.pinata.cloud/ipfs".to_string(),
            credentials: None,
        }
    }
}

/// Encoding used for the composed memorial image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Lossless PNG
    #[default]
    Png,
    /// JPEG at quality 90
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Credentials accepted by the pinning API
#[derive(Clone)]
pub enum PinningCredentials {
    /// Scoped JWT sent as a bearer token
    Jwt(String),
    /// Legacy key/secret header pair
    ApiKey { key: String, secret: String },
}

impl std::fmt::Debug for PinningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinningCredentials::Jwt(_) => f.write_str("Jwt(<redacted>)"),
            PinningCredentials::ApiKey { .. } => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// Diagnostic produced by [`check_startup`] for a degraded but runnable config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupWarning {
    /// Short machine-friendly code
    pub code: &'static str,
    /// Human readable explanation
    pub message: String,
}

impl std::fmt::Display for StartupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Validate configuration at process start.
///
/// Missing credentials are not fatal: the server still starts and serves
/// engager lookups, and memorial generation fails with a server error on
/// first use.
pub fn check_startup(config: &ServiceConfig) -> Option<StartupWarning> {
    match &config.credentials {
        None => Some(StartupWarning {
            code: "missing-credentials",
            message: "no pinning credentials configured (set PINATA_JWT or PINATA_API_KEY/PINATA_SECRET_API_KEY); memorial generation will fail".to_string(),
        }),
        Some(PinningCredentials::Jwt(jwt)) if jwt.trim().is_empty() => Some(StartupWarning {
            code: "empty-credentials",
            message: "PINATA_JWT is set but empty; memorial generation will fail".to_string(),
        }),
        Some(PinningCredentials::ApiKey { key, secret })
            if key.trim().is_empty() || secret.trim().is_empty() =>
        {
            Some(StartupWarning {
                code: "empty-credentials",
                message: "pinning API key or secret is empty; memorial generation will fail".to_string(),
            })
        }
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.tile_fetch_timeout_ms, 10_000);
        assert_eq!(config.max_tile_bytes, 10 * 1024 * 1024);
        assert_eq!(config.output_format, OutputFormat::Png);
        assert!(config.user_agent.starts_with("memorial-grid/"));
    }

    #[test]
    fn startup_warns_without_credentials() {
        let warning = check_startup(&ServiceConfig::default()).expect("should warn");
        assert_eq!(warning.code, "missing-credentials");
    }

    #[test]
    fn startup_warns_on_blank_secret() {
        let config = ServiceConfig {
            credentials: Some(PinningCredentials::ApiKey {
                key: "k".into(),
                secret: "  ".into(),
            }),
            ..Default::default()
        };
        assert_eq!(check_startup(&config).map(|w| w.code), Some("empty-credentials"));
    }

    #[test]
    fn startup_is_quiet_with_jwt() {
        let config = ServiceConfig {
            credentials: Some(PinningCredentials::Jwt("eyJ...".into())),
            ..Default::default()
        };
        assert!(check_startup(&config).is_none());
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = PinningCredentials::Jwt("secret-token".into());
        assert!(!format!("{:?}", creds).contains("secret-token"));
    }
}
