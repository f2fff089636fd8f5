use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::listing::IdPolicy;

pub const DEFAULT_FEED_BASE_URL: &str = "http://services.tvrage.com/feeds/episode_list.php";

/// Which external catalogue a scraper talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Tvrage,
}

impl SourceKind {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "tvrage" => Ok(Self::Tvrage),
            other => anyhow::bail!("unsupported scraper source: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScraperConfig {
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "ScraperConfig::default_feed_base_url")]
    pub feed_base_url: String,
    #[serde(default = "ScraperConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "ScraperConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub id_policy: IdPolicy,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            feed_base_url: Self::default_feed_base_url(),
            user_agent: Self::default_user_agent(),
            timeout_secs: Self::default_timeout_secs(),
            id_policy: IdPolicy::default(),
        }
    }
}

impl ScraperConfig {
    pub fn default_feed_base_url() -> String {
        DEFAULT_FEED_BASE_URL.to_owned()
    }
    pub fn default_user_agent() -> String {
        concat!("showsync/", env!("CARGO_PKG_VERSION")).to_owned()
    }
    pub fn default_timeout_secs() -> u64 {
        30
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("parse scraper config")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML config file and applies `SHOWSYNC_*` environment
    /// overrides on top of it.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("read scraper config: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&yaml)
            .with_context(|| format!("parse scraper config: {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(raw) = var("SHOWSYNC_SOURCE") {
            self.source = SourceKind::parse(&raw).with_context(|| {
                format!("invalid SHOWSYNC_SOURCE={raw:?}. expected one of: tvrage")
            })?;
        }
        if let Some(raw) = var("SHOWSYNC_FEED_BASE_URL") {
            self.feed_base_url = raw;
        }
        if let Some(raw) = var("SHOWSYNC_USER_AGENT") {
            self.user_agent = raw;
        }
        if let Some(raw) = var("SHOWSYNC_TIMEOUT_SECS") {
            self.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid SHOWSYNC_TIMEOUT_SECS={raw:?}"))?;
        }
        if let Some(raw) = var("SHOWSYNC_ID_POLICY") {
            self.id_policy = IdPolicy::parse(&raw).with_context(|| {
                format!(
                    "invalid SHOWSYNC_ID_POLICY={raw:?}. expected one of: most_referenced, last_seen"
                )
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.feed_base_url)
            .with_context(|| format!("parse feed_base_url: {}", self.feed_base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("feed_base_url must be http/https: {url}");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
