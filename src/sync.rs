use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::formats::{ReconciledEpisode, ScrapeMode, SeasonCandidate};
use crate::source::{ScrapeContext, ShowSource};
use crate::store::SeasonCandidateSink;

/// What a scraper run points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScraperTarget {
    /// A show's listing page; `show_id` is the show's id in the local store.
    Show { show_id: String, uri: String },
    /// A season stored locally, and the feed its episodes come from.
    Season { season_id: String, uri: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Seasons(Vec<SeasonCandidate>),
    Episodes(Vec<ReconciledEpisode>),
}

pub async fn run(
    source: &dyn ShowSource,
    ctx: &ScrapeContext<'_>,
    sink: &dyn SeasonCandidateSink,
    target: &ScraperTarget,
    mode: ScrapeMode,
) -> Result<ScrapeOutcome> {
    let result = match target {
        ScraperTarget::Show { show_id, uri } => {
            run_show_scraper(source, ctx, sink, show_id, uri, mode)
                .await
                .map(ScrapeOutcome::Seasons)
        }
        ScraperTarget::Season { season_id, uri } => {
            run_season_scraper(source, ctx, season_id, uri, mode)
                .await
                .map(ScrapeOutcome::Episodes)
        }
    };

    if let Err(err) = &result {
        tracing::error!(
            source = ?source.kind(),
            ?target,
            collaborator = err.is_collaborator_failure(),
            "scraper failed: {}",
            error_chain(err)
        );
    }
    result
}

/// Resolves the show's id, lists the seasons its feed exposes and hands them
/// to `sink`.
pub async fn run_show_scraper(
    source: &dyn ShowSource,
    ctx: &ScrapeContext<'_>,
    sink: &dyn SeasonCandidateSink,
    show_id: &str,
    listing_uri: &str,
    mode: ScrapeMode,
) -> Result<Vec<SeasonCandidate>> {
    let id = source.resolve_show_id(ctx, listing_uri).await?;
    let feed_uri = source.feed_uri(&id);
    let candidates = source.list_seasons(ctx, &feed_uri).await?;

    sink.submit_season_candidates(show_id, candidates, mode)
        .await
        .map_err(ScrapeError::Submit)
}

pub async fn run_season_scraper(
    source: &dyn ShowSource,
    ctx: &ScrapeContext<'_>,
    season_id: &str,
    feed_uri: &str,
    mode: ScrapeMode,
) -> Result<Vec<ReconciledEpisode>> {
    source.reconcile_season(ctx, season_id, feed_uri, mode).await
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
