//! IPFS pinning collaborator.
//!
//! [`PinningService`] is the seam the memorial handler talks to;
//! [`PinataClient`] implements it against the Pinata HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, PinningCredentials, Result, ServiceConfig};

/// Content-addressed storage that returns a CID per upload
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Upload raw file bytes and return their CID.
    async fn pin_file(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String>;

    /// Upload a JSON document and return its CID.
    async fn pin_json(&self, name: &str, document: &Value) -> Result<String>;
}

/// `ipfs://<cid>`
pub fn ipfs_uri(cid: &str) -> String {
    format!("ipfs://{}", cid)
}

/// Public gateway URL for `cid`.
pub fn gateway_url(gateway_base: &str, cid: &str) -> String {
    format!("{}/{}", gateway_base.trim_end_matches('/'), cid)
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: Option<String>,
}

/// Pinata HTTP API client
pub struct PinataClient {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<PinningCredentials>,
}

impl PinataClient {
    pub fn new(api_base: impl Into<String>, credentials: Option<PinningCredentials>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(config.pinning_api_base.clone(), config.credentials.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/pinning/{}", self.api_base, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        match &self.credentials {
            Some(PinningCredentials::Jwt(jwt)) if !jwt.trim().is_empty() => Ok(req.bearer_auth(jwt.trim())),
            Some(PinningCredentials::ApiKey { key, secret })
                if !key.trim().is_empty() && !secret.trim().is_empty() =>
            {
                Ok(req
                    .header("pinata_api_key", key.trim())
                    .header("pinata_secret_api_key", secret.trim()))
            }
            _ => Err(Error::Config("pinning credentials are missing".into())),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String> {
        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Pinning(format!("HTTP {}: {}", status, body.trim())));
        }
        let parsed: PinResponse = res
            .json()
            .await
            .map_err(|e| Error::Pinning(format!("unreadable pin response: {}", e)))?;
        parsed
            .ipfs_hash
            .filter(|cid| !cid.is_empty())
            .ok_or_else(|| Error::Pinning("pin response carried no IpfsHash".into()))
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<String> {
        let req = self.authorize(self.client.post(self.endpoint("pinFileToIPFS")))?;
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| Error::Other(format!("bad mime type {}: {}", mime_type, e)))?;
        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", serde_json::json!({ "name": name }).to_string());

        debug!("pinning file {} ({} bytes)", name, size);
        let cid = self.send(req.multipart(form)).await?;
        info!("pinned file {} as {}", name, cid);
        Ok(cid)
    }

    async fn pin_json(&self, name: &str, document: &Value) -> Result<String> {
        let req = self.authorize(self.client.post(self.endpoint("pinJSONToIPFS")))?;
        let body = serde_json::json!({
            "pinataContent": document,
            "pinataMetadata": { "name": name },
        });

        debug!("pinning json {}", name);
        let cid = self.send(req.json(&body)).await?;
        info!("pinned json {} as {}", name, cid);
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_helpers() {
        assert_eq!(ipfs_uri("QmAbc"), "ipfs://QmAbc");
        assert_eq!(
            gateway_url("https://gateway.pinata.cloud/ipfs/", "QmAbc"),
            "https://gateway.pinata.cloud/ipfs/QmAbc"
        );
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_network() {
        // Unroutable base: any network attempt would error differently.
        let client = PinataClient::new("http://127.0.0.1:9", None).unwrap();
        let err = client.pin_json("x.json", &serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
