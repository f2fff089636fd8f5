use anyhow::Context as _;
use async_trait::async_trait;
use url::Url;

use crate::config::{ScraperConfig, SourceKind};
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::formats::{ReconciledEpisode, ScrapeMode, SeasonCandidate, ShowId};
use crate::listing::IdPolicy;
use crate::store::EpisodeStore;

/// Collaborators a scraper works against for one call.
#[derive(Clone, Copy)]
pub struct ScrapeContext<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub store: &'a dyn EpisodeStore,
}

impl<'a> ScrapeContext<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, store: &'a dyn EpisodeStore) -> Self {
        Self { fetcher, store }
    }
}

/// An external show catalogue that can be scraped for seasons and episodes.
#[async_trait]
pub trait ShowSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Canonical id of the show whose listing page lives at `listing_uri`.
    async fn resolve_show_id(
        &self,
        ctx: &ScrapeContext<'_>,
        listing_uri: &str,
    ) -> Result<ShowId>;

    /// Where the episode feed for `id` can be fetched.
    fn feed_uri(&self, id: &ShowId) -> String;

    async fn list_seasons(
        &self,
        ctx: &ScrapeContext<'_>,
        feed_uri: &str,
    ) -> Result<Vec<SeasonCandidate>>;

    async fn reconcile_season(
        &self,
        ctx: &ScrapeContext<'_>,
        season_id: &str,
        feed_uri: &str,
        mode: ScrapeMode,
    ) -> Result<Vec<ReconciledEpisode>>;
}

pub fn build_source(config: &ScraperConfig) -> anyhow::Result<Box<dyn ShowSource>> {
    match config.source {
        SourceKind::Tvrage => Ok(Box::new(TvRageSource::new(config)?)),
    }
}

#[derive(Debug, Clone)]
pub struct TvRageSource {
    feed_base: Url,
    id_policy: IdPolicy,
}

impl TvRageSource {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        let feed_base = Url::parse(&config.feed_base_url)
            .with_context(|| format!("parse feed_base_url: {}", config.feed_base_url))?;
        Ok(Self {
            feed_base,
            id_policy: config.id_policy,
        })
    }
}

#[async_trait]
impl ShowSource for TvRageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Tvrage
    }

    async fn resolve_show_id(
        &self,
        ctx: &ScrapeContext<'_>,
        listing_uri: &str,
    ) -> Result<ShowId> {
        crate::resolver::resolve_show_id(ctx.fetcher, listing_uri, self.id_policy).await
    }

    fn feed_uri(&self, id: &ShowId) -> String {
        crate::seasons::feed_uri(&self.feed_base, id)
    }

    async fn list_seasons(
        &self,
        ctx: &ScrapeContext<'_>,
        feed_uri: &str,
    ) -> Result<Vec<SeasonCandidate>> {
        crate::seasons::list_seasons(ctx.fetcher, feed_uri).await
    }

    async fn reconcile_season(
        &self,
        ctx: &ScrapeContext<'_>,
        season_id: &str,
        feed_uri: &str,
        mode: ScrapeMode,
    ) -> Result<Vec<ReconciledEpisode>> {
        crate::reconcile::reconcile_season(ctx, season_id, feed_uri, mode).await
    }
}
