use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::error::DetectionError;
use crate::models::{Platform, Quote};

/// A source of normalized quotes for one platform
#[async_trait]
pub trait FeedAdapter: Send + Sync {
    /// Platform the quotes come from
    fn platform(&self) -> Platform;

    /// Fetch every quote the platform currently lists
    async fn get_all_quotes(&self) -> Result<Vec<Quote>, DetectionError>;
}

/// Serves a fixed set of quotes
pub struct StaticFeed {
    platform: Platform,
    quotes: Vec<Quote>,
}

impl StaticFeed {
    pub fn new(platform: Platform, quotes: Vec<Quote>) -> Self {
        Self { platform, quotes }
    }

    /// Load quotes from a JSON array file; the platform comes from the first quote
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read quote file {}", path.display()))?;

        let quotes: Vec<Quote> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse quote file {}", path.display()))?;

        let platform = quotes
            .first()
            .map(|q| q.platform)
            .context("Quote file is empty")?;

        if quotes.iter().any(|q| q.platform != platform) {
            anyhow::bail!("Quote file {} mixes platforms", path.display());
        }

        info!(
            "Loaded {} static {} quotes from {}",
            quotes.len(),
            platform,
            path.display()
        );

        Ok(Self { platform, quotes })
    }
}

#[async_trait]
impl FeedAdapter for StaticFeed {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn get_all_quotes(&self) -> Result<Vec<Quote>, DetectionError> {
        Ok(self.quotes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::fixtures::quote;
    use crate::models::Outcome;

    #[tokio::test]
    async fn test_static_feed_returns_quotes() {
        let feed = StaticFeed::new(
            Platform::Manifold,
            vec![quote(Platform::Manifold, "Will Bitcoin reach 100k?", Outcome::Yes, 0.4)],
        );

        assert_eq!(feed.platform(), Platform::Manifold);
        assert_eq!(feed.get_all_quotes().await.unwrap().len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let quotes = vec![
            quote(Platform::Kalshi, "Will Bitcoin reach 100k?", Outcome::Yes, 0.4),
            quote(Platform::Kalshi, "Will Bitcoin reach 100k?", Outcome::No, 0.6),
        ];
        let path = std::env::temp_dir().join("spread_scout_static_feed_test.json");
        std::fs::write(&path, serde_json::to_string(&quotes).unwrap()).unwrap();

        let feed = StaticFeed::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(feed.platform(), Platform::Kalshi);
        assert_eq!(feed.quotes, quotes);
    }

    #[test]
    fn test_load_rejects_mixed_platforms() {
        let quotes = vec![
            quote(Platform::Kalshi, "Will Bitcoin reach 100k?", Outcome::Yes, 0.4),
            quote(Platform::Manifold, "Will Bitcoin reach 100k?", Outcome::Yes, 0.5),
        ];
        let path = std::env::temp_dir().join("spread_scout_mixed_feed_test.json");
        std::fs::write(&path, serde_json::to_string(&quotes).unwrap()).unwrap();

        let result = StaticFeed::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }
}
