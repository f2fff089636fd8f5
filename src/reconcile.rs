use crate::episode::{parse_air_date, parse_episode_number};
use crate::error::{Result, ScrapeError};
use crate::feed::FeedEpisode;
use crate::formats::{EpisodeUpdate, NewEpisode, ReconciledEpisode, ScrapeMode};
use crate::seasons::fetch_feed;
use crate::source::ScrapeContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeState {
    New,
    Unchanged,
    Updated,
}

/// A feed entry whose episode number and air date both parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidEntry {
    pub n: u32,
    pub air_date: i64,
}

impl ValidEntry {
    pub fn from_feed(episode: &FeedEpisode) -> Option<Self> {
        let n = parse_episode_number(episode.seasonnum.as_deref()?)?;
        let air_date = parse_air_date(episode.airdate.as_deref()?)?;
        Some(Self { n, air_date })
    }
}

/// Whether an entry belongs in the result list.
pub fn is_recorded(mode: ScrapeMode, state: EpisodeState, changed: bool) -> bool {
    !mode.discover_new_only || state == EpisodeState::New || changed
}

pub async fn reconcile_season(
    ctx: &ScrapeContext<'_>,
    season_id: &str,
    feed_uri: &str,
    mode: ScrapeMode,
) -> Result<Vec<ReconciledEpisode>> {
    let season = ctx
        .store
        .get_season(season_id)
        .await
        .map_err(|err| ScrapeError::store("get season", err))?;
    tracing::info!(
        season = season.n,
        show_id = %season.show_id,
        uri = %feed_uri,
        "reconciling season"
    );

    let document = fetch_feed(ctx.fetcher, feed_uri).await?;
    let season_no = season.n.to_string();

    let mut recorded = Vec::new();
    for episode in document.episodes_of(&season_no) {
        let Some(entry) = ValidEntry::from_feed(episode) else {
            continue;
        };

        let existing = ctx
            .store
            .get_episode_from_index(&season.show_id, season.n, entry.n)
            .await
            .map_err(|err| ScrapeError::store("get episode from index", err))?;

        let mut changed = false;
        let (record, mut state) = match existing {
            Some(record) => (Some(record), EpisodeState::Unchanged),
            None if mode.persist => {
                tracing::info!(episode = entry.n, "creating episode");
                let id = ctx
                    .store
                    .add_episode(&season.id, NewEpisode { n: entry.n })
                    .await
                    .map_err(|err| ScrapeError::store("add episode", err))?;
                let record = ctx
                    .store
                    .get_episode(&id)
                    .await
                    .map_err(|err| ScrapeError::store("get episode", err))?;
                changed = true;
                (Some(record), EpisodeState::New)
            }
            None => (None, EpisodeState::New),
        };

        if let Some(record) = record
            && record.air_date != Some(entry.air_date)
        {
            if state == EpisodeState::Unchanged {
                state = EpisodeState::Updated;
            }
            if mode.persist {
                ctx.store
                    .set_episode(
                        &record.id,
                        EpisodeUpdate {
                            air_date: Some(entry.air_date),
                        },
                    )
                    .await
                    .map_err(|err| ScrapeError::store("set episode", err))?;
                changed = true;
            }
        }

        let keep = is_recorded(mode, state, changed);
        tracing::debug!(episode = entry.n, ?state, changed, keep, "episode reconciled");
        if keep {
            recorded.push(ReconciledEpisode {
                n: entry.n,
                air_date: entry.air_date,
            });
        }
    }

    tracing::info!(count = recorded.len(), "season reconciled");
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_episode(seasonnum: Option<&str>, airdate: Option<&str>) -> FeedEpisode {
        FeedEpisode {
            seasonnum: seasonnum.map(str::to_owned),
            airdate: airdate.map(str::to_owned),
        }
    }

    #[test]
    fn entries_need_both_children() {
        assert_eq!(
            ValidEntry::from_feed(&feed_episode(Some("03"), Some("2020-1-15"))),
            Some(ValidEntry {
                n: 3,
                air_date: 1_579_046_400,
            })
        );
        assert_eq!(
            ValidEntry::from_feed(&feed_episode(None, Some("2020-1-15"))),
            None
        );
        assert_eq!(ValidEntry::from_feed(&feed_episode(Some("3"), None)), None);
        assert_eq!(
            ValidEntry::from_feed(&feed_episode(Some("3"), Some(""))),
            None
        );
        assert_eq!(
            ValidEntry::from_feed(&feed_episode(Some(""), Some("2020-1-15"))),
            None
        );
    }

    #[test]
    fn everything_is_recorded_outside_discovery_mode() {
        let mode = ScrapeMode::new(false, false);
        for state in [
            EpisodeState::New,
            EpisodeState::Unchanged,
            EpisodeState::Updated,
        ] {
            assert!(is_recorded(mode, state, false));
        }
    }

    #[test]
    fn discovery_mode_records_new_or_changed_only() {
        let mode = ScrapeMode::new(true, false);
        assert!(is_recorded(mode, EpisodeState::New, false));
        assert!(is_recorded(mode, EpisodeState::Updated, true));
        assert!(!is_recorded(mode, EpisodeState::Updated, false));
        assert!(!is_recorded(mode, EpisodeState::Unchanged, false));
    }
}
