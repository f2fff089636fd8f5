use url::Url;

use crate::error::{Result, ScrapeError};
use crate::feed::{FeedDocument, parse_feed};
use crate::fetch::Fetcher;
use crate::formats::{SeasonCandidate, ShowId};

/// `<feed-base>?sid=<id>`, keeping any query the base already carries.
pub fn feed_uri(feed_base: &Url, id: &ShowId) -> String {
    let mut uri = feed_base.clone();
    uri.query_pairs_mut().append_pair("sid", id.as_str());
    uri.to_string()
}

/// One candidate per season that has a `no` attribute, in document order.
/// Every candidate points at the feed itself.
pub fn season_candidates(document: &FeedDocument, feed_uri: &str) -> Vec<SeasonCandidate> {
    document
        .seasons()
        .iter()
        .filter_map(|season| {
            season.no.as_ref().map(|n| SeasonCandidate {
                n: n.clone(),
                uri: feed_uri.to_owned(),
            })
        })
        .collect()
}

pub(crate) async fn fetch_feed(fetcher: &dyn Fetcher, feed_uri: &str) -> Result<FeedDocument> {
    let xml = fetcher
        .fetch(feed_uri)
        .await
        .map_err(|source| ScrapeError::Fetch {
            uri: feed_uri.to_owned(),
            source,
        })?;
    parse_feed(&xml)
}

pub async fn list_seasons(fetcher: &dyn Fetcher, feed_uri: &str) -> Result<Vec<SeasonCandidate>> {
    tracing::info!(uri = %feed_uri, "parsing episode feed");
    let document = fetch_feed(fetcher, feed_uri).await?;
    let candidates = season_candidates(&document, feed_uri);
    tracing::info!(count = candidates.len(), "found seasons");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_uri_appends_show_id() {
        let base = Url::parse("http://services.tvrage.com/feeds/episode_list.php").unwrap();
        assert_eq!(
            feed_uri(&base, &ShowId("42".into())),
            "http://services.tvrage.com/feeds/episode_list.php?sid=42"
        );

        let base = Url::parse("https://feeds.test/list?fmt=xml").unwrap();
        assert_eq!(
            feed_uri(&base, &ShowId("7".into())),
            "https://feeds.test/list?fmt=xml&sid=7"
        );
    }

    #[test]
    fn every_numbered_season_becomes_a_candidate() {
        let xml = r#"<Show><Episodelist>
            <Season no="1"/><Season no="2"/><Season/><Season no="3"><episode/></Season>
        </Episodelist></Show>"#;
        let document = parse_feed(xml).unwrap();
        let candidates = season_candidates(&document, "http://feeds.test/list?sid=9");

        let numbers: Vec<&str> = candidates.iter().map(|c| c.n.as_str()).collect();
        assert_eq!(numbers, ["1", "2", "3"]);
        assert!(
            candidates
                .iter()
                .all(|c| c.uri == "http://feeds.test/list?sid=9")
        );
    }
}
