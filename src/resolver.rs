use crate::error::{Result, ScrapeError};
use crate::fetch::Fetcher;
use crate::formats::ShowId;
use crate::listing::{IdPolicy, tally_show_ids};

/// Fetches a show's listing page and picks the show id its edit links
/// point to.
pub async fn resolve_show_id(
    fetcher: &dyn Fetcher,
    listing_uri: &str,
    policy: IdPolicy,
) -> Result<ShowId> {
    tracing::info!(uri = %listing_uri, "parsing listing page");
    let html = fetcher
        .fetch(listing_uri)
        .await
        .map_err(|source| ScrapeError::Fetch {
            uri: listing_uri.to_owned(),
            source,
        })?;

    let tally = tally_show_ids(&html)?;
    tracing::info!(count = tally.len(), "found ids");
    tracing::debug!(entries = ?tally.entries(), ?policy, "id tally");

    let id = tally
        .select(policy)
        .cloned()
        .ok_or_else(|| ScrapeError::ShowIdNotFound {
            uri: listing_uri.to_owned(),
        })?;
    tracing::info!(%id, "selected show id");
    Ok(id)
}
