//! Engager records and the data source that ranks them.
//!
//! The production source is mocked: a small static table keyed by handle,
//! with a default list for unknown handles and a simulated lookup latency.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One account that engaged with the subject handle.
///
/// Lists are ordered by descending engagement by the source; callers never
/// re-sort them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagerRecord {
    /// Account handle, without the leading `@`
    pub fname: String,
    /// Numeric account id
    #[serde(default)]
    pub fid: u64,
    #[serde(default)]
    pub engagement_score: f64,
    #[serde(default)]
    pub casts: u64,
    /// Preformatted follower count such as `"15.2k"`
    #[serde(default)]
    pub followers: String,
    /// Profile picture URL used for the memorial tile
    #[serde(
        default,
        alias = "profileImageURL",
        alias = "pfpUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub pfp_url: Option<String>,
}

impl EngagerRecord {
    fn mock(fname: &str, fid: u64, engagement_score: f64, casts: u64, followers: &str) -> Self {
        Self {
            fname: fname.to_string(),
            fid,
            engagement_score,
            casts,
            followers: followers.to_string(),
            pfp_url: None,
        }
    }
}

/// Source of ranked engagers for a handle
#[async_trait]
pub trait EngagerSource: Send + Sync {
    /// Return the engagers of `fname`, most engaged first.
    async fn top_engagers(&self, fname: &str) -> Result<Vec<EngagerRecord>>;
}

/// Handle whose list is returned for any unknown handle
pub const FALLBACK_HANDLE: &str = "simulasyoncu";

/// Static engager table with a default fallback
#[derive(Debug, Clone)]
pub struct MockEngagerSource {
    delay: Duration,
}

impl MockEngagerSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Look a handle up in the table without the simulated latency.
    ///
    /// Matching folds case only, no trimming; unknown handles get the
    /// [`FALLBACK_HANDLE`] list.
    pub fn lookup(fname: &str) -> Vec<EngagerRecord> {
        match fname.to_lowercase().as_str() {
            "dwr" => vec![
                EngagerRecord::mock("v", 2, 980.0, 120, "15.2k"),
                EngagerRecord::mock("ccarella", 3, 750.0, 80, "10.5k"),
                EngagerRecord::mock("pedro", 4, 520.0, 200, "2.1k"),
            ],
            "nodepro" => vec![
                EngagerRecord::mock("synth_dev", 501, 1100.0, 300, "50k"),
                EngagerRecord::mock("web3_wizard", 502, 950.0, 150, "22k"),
            ],
            _ => vec![
                EngagerRecord::mock("mehmet", 101, 650.0, 50, "300"),
                EngagerRecord::mock("ayse", 102, 500.0, 90, "450"),
            ],
        }
    }
}

impl Default for MockEngagerSource {
    fn default() -> Self {
        Self::new(Duration::from_millis(1_000))
    }
}

#[async_trait]
impl EngagerSource for MockEngagerSource {
    async fn top_engagers(&self, fname: &str) -> Result<Vec<EngagerRecord>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Self::lookup(fname))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let list = MockEngagerSource::lookup("DWR");
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].fname, "v");
        assert_eq!(list[0].fid, 2);
    }

    #[test]
    fn lookup_matches_the_handle_verbatim() {
        // only case is folded; surrounding whitespace makes it a different handle
        assert_eq!(
            MockEngagerSource::lookup(" dwr "),
            MockEngagerSource::lookup(FALLBACK_HANDLE)
        );
        assert_eq!(MockEngagerSource::lookup("Dwr")[0].fname, "v");
    }

    #[test]
    fn unknown_handle_falls_back() {
        assert_eq!(
            MockEngagerSource::lookup("nobody"),
            MockEngagerSource::lookup(FALLBACK_HANDLE)
        );
    }

    #[test]
    fn table_lists_are_ranked() {
        for handle in ["dwr", "nodepro", FALLBACK_HANDLE] {
            let list = MockEngagerSource::lookup(handle);
            assert!(list
                .windows(2)
                .all(|w| w[0].engagement_score >= w[1].engagement_score));
        }
    }

    #[test]
    fn record_accepts_image_url_aliases() {
        let rec: EngagerRecord = serde_json::from_value(serde_json::json!({
            "fname": "v", "fid": 2, "engagement_score": 980, "casts": 120,
            "followers": "15.2k", "profileImageURL": "https://example.com/v.png"
        }))
        .unwrap();
        assert_eq!(rec.pfp_url.as_deref(), Some("https://example.com/v.png"));
    }

    #[tokio::test]
    async fn mock_source_without_delay() {
        let src = MockEngagerSource::new(Duration::ZERO);
        let list = src.top_engagers("nodepro").await.unwrap();
        assert_eq!(list[1].fname, "web3_wizard");
    }
}
