use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::formats::ShowId;

const EDIT_LINK_SELECTOR: &str = r#"a[href^="/edit/shows/"]"#;

static EDIT_LINK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/edit/shows/([0-9]+)").expect("valid edit link pattern"));

/// How a single id is chosen from the tally of edit links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// The id referenced the most times; ties go to the id seen first.
    #[default]
    MostReferenced,
    /// The last distinct id encountered on the page.
    LastSeen,
}

impl IdPolicy {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" | "most_referenced" => Ok(Self::MostReferenced),
            "last_seen" => Ok(Self::LastSeen),
            other => anyhow::bail!("unsupported id policy: {other}"),
        }
    }
}

/// Occurrence counts per id, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdTally {
    entries: Vec<(ShowId, u32)>,
}

impl IdTally {
    pub fn record(&mut self, id: &str) {
        match self.entries.iter_mut().find(|(seen, _)| seen.as_str() == id) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((ShowId(id.to_owned()), 1)),
        }
    }

    pub fn entries(&self) -> &[(ShowId, u32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn select(&self, policy: IdPolicy) -> Option<&ShowId> {
        match policy {
            IdPolicy::MostReferenced => {
                let mut best: Option<&(ShowId, u32)> = None;
                for entry in &self.entries {
                    if best.is_none_or(|(_, count)| entry.1 > *count) {
                        best = Some(entry);
                    }
                }
                best.map(|(id, _)| id)
            }
            IdPolicy::LastSeen => self
                .entries
                .iter()
                .rev()
                .find(|(_, count)| *count > 0)
                .map(|(id, _)| id),
        }
    }
}

/// Tallies the ids of every `/edit/shows/<id>` link in `html`.
pub fn tally_show_ids(html: &str) -> Result<IdTally> {
    if html.trim().is_empty() {
        return Err(ScrapeError::html("listing page is empty"));
    }

    let document = Html::parse_document(html);
    let selector = Selector::parse(EDIT_LINK_SELECTOR)
        .map_err(|err| ScrapeError::QueryEngine(err.to_string()))?;

    let mut tally = IdTally::default();
    for link in document.select(&selector) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if let Some(id) = EDIT_LINK_ID.captures(href).and_then(|caps| caps.get(1)) {
            tally.record(id.as_str());
        }
    }

    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(links: &[&str]) -> String {
        let anchors = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">edit</a>"#))
            .collect::<Vec<_>>()
            .join("\n");
        format!("<!doctype html><html><body>{anchors}</body></html>")
    }

    #[test]
    fn tally_counts_in_first_seen_order() {
        let html = page(&[
            "/edit/shows/42",
            "/edit/shows/99/episodes",
            "/edit/shows/42",
            "/edit/shows/42?step=2",
        ]);
        let tally = tally_show_ids(&html).unwrap();
        assert_eq!(
            tally.entries(),
            &[(ShowId("42".into()), 3), (ShowId("99".into()), 1)]
        );
    }

    #[test]
    fn tally_ignores_other_links() {
        let html = page(&[
            "/shows/42",
            "http://example.com/edit/shows/7",
            "/edit/shows/",
            "/edit/shows/abc",
            "/edit/shows/8",
        ]);
        let tally = tally_show_ids(&html).unwrap();
        assert_eq!(tally.entries(), &[(ShowId("8".into()), 1)]);
    }

    #[test]
    fn tally_only_counts_ascii_digit_ids() {
        let html = page(&["/edit/shows/\u{664}\u{662}", "/edit/shows/42\u{663}"]);
        let tally = tally_show_ids(&html).unwrap();
        assert_eq!(tally.entries(), &[(ShowId("42".into()), 1)]);

        let html = page(&["/edit/shows/\u{664}\u{662}"]);
        assert!(tally_show_ids(&html).unwrap().is_empty());
    }

    #[test]
    fn empty_page_is_a_parse_error() {
        let err = tally_show_ids("  \n").unwrap_err();
        assert!(matches!(err, ScrapeError::DocumentParse { .. }));
    }

    #[test]
    fn most_referenced_picks_highest_count() {
        let html = page(&[
            "/edit/shows/42",
            "/edit/shows/42",
            "/edit/shows/99",
            "/edit/shows/42",
        ]);
        let tally = tally_show_ids(&html).unwrap();
        assert_eq!(
            tally.select(IdPolicy::MostReferenced).map(ShowId::as_str),
            Some("42")
        );
    }

    #[test]
    fn most_referenced_breaks_ties_by_first_seen() {
        let mut tally = IdTally::default();
        for id in ["5", "6", "6", "5"] {
            tally.record(id);
        }
        assert_eq!(
            tally.select(IdPolicy::MostReferenced).map(ShowId::as_str),
            Some("5")
        );
    }

    #[test]
    fn last_seen_picks_last_distinct_id_regardless_of_count() {
        let html = page(&[
            "/edit/shows/42",
            "/edit/shows/42",
            "/edit/shows/99",
            "/edit/shows/42",
        ]);
        let tally = tally_show_ids(&html).unwrap();
        assert_eq!(
            tally.select(IdPolicy::LastSeen).map(ShowId::as_str),
            Some("99")
        );
    }

    #[test]
    fn empty_tally_selects_nothing() {
        let tally = IdTally::default();
        assert!(tally.select(IdPolicy::MostReferenced).is_none());
        assert!(tally.select(IdPolicy::LastSeen).is_none());
    }

    #[test]
    fn parse_id_policy() {
        assert_eq!(IdPolicy::parse("").unwrap(), IdPolicy::MostReferenced);
        assert_eq!(IdPolicy::parse("Last-Seen").unwrap(), IdPolicy::LastSeen);
        let err = IdPolicy::parse("random").unwrap_err().to_string();
        assert!(err.contains("unsupported id policy"));
    }
}
