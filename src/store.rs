mod local_fs;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::formats::{
    EpisodeRecord, EpisodeUpdate, NewEpisode, ScrapeMode, SeasonCandidate, SeasonInfo,
};

pub use local_fs::LocalFsEpisodeStore;
pub use memory::{MemoryEpisodeStore, StoreWrite};

#[async_trait]
pub trait EpisodeStore: Send + Sync {
    async fn get_season(&self, season_id: &str) -> anyhow::Result<SeasonInfo>;
    async fn get_episode_from_index(
        &self,
        show_id: &str,
        season_n: u32,
        episode_n: u32,
    ) -> anyhow::Result<Option<EpisodeRecord>>;
    async fn add_episode(&self, season_id: &str, episode: NewEpisode) -> anyhow::Result<String>;
    async fn get_episode(&self, episode_id: &str) -> anyhow::Result<EpisodeRecord>;
    async fn set_episode(&self, episode_id: &str, update: EpisodeUpdate) -> anyhow::Result<()>;
}

/// Receives the seasons discovered for a show and merges them into
/// whatever tracks seasons. Returns the candidates the merge reports back
/// to the caller.
#[async_trait]
pub trait SeasonCandidateSink: Send + Sync {
    async fn submit_season_candidates(
        &self,
        show_id: &str,
        candidates: Vec<SeasonCandidate>,
        mode: ScrapeMode,
    ) -> anyhow::Result<Vec<SeasonCandidate>>;
}

/// Shows, seasons and episodes held by the bundled stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Catalog {
    #[serde(default)]
    seasons: Vec<SeasonInfo>,
    #[serde(default)]
    episodes: Vec<EpisodeRecord>,
}

impl Catalog {
    fn season(&self, season_id: &str) -> anyhow::Result<&SeasonInfo> {
        self.seasons
            .iter()
            .find(|season| season.id == season_id)
            .ok_or_else(|| anyhow::anyhow!("unknown season: {season_id}"))
    }

    fn add_season(&mut self, show_id: &str, n: u32) -> String {
        let id = new_id();
        self.seasons.push(SeasonInfo {
            id: id.clone(),
            show_id: show_id.to_owned(),
            n,
        });
        id
    }

    fn episode_from_index(
        &self,
        show_id: &str,
        season_n: u32,
        episode_n: u32,
    ) -> Option<&EpisodeRecord> {
        self.seasons
            .iter()
            .filter(|season| season.show_id == show_id && season.n == season_n)
            .find_map(|season| {
                self.episodes
                    .iter()
                    .find(|episode| episode.season_id == season.id && episode.n == episode_n)
            })
    }

    fn add_episode(&mut self, season_id: &str, episode: NewEpisode) -> anyhow::Result<String> {
        self.season(season_id)?;
        let id = new_id();
        self.episodes.push(EpisodeRecord {
            id: id.clone(),
            season_id: season_id.to_owned(),
            n: episode.n,
            air_date: None,
        });
        Ok(id)
    }

    fn episode(&self, episode_id: &str) -> anyhow::Result<&EpisodeRecord> {
        self.episodes
            .iter()
            .find(|episode| episode.id == episode_id)
            .ok_or_else(|| anyhow::anyhow!("unknown episode: {episode_id}"))
    }

    fn set_episode(&mut self, episode_id: &str, update: EpisodeUpdate) -> anyhow::Result<()> {
        let episode = self
            .episodes
            .iter_mut()
            .find(|episode| episode.id == episode_id)
            .ok_or_else(|| anyhow::anyhow!("unknown episode: {episode_id}"))?;
        if let Some(air_date) = update.air_date {
            episode.air_date = Some(air_date);
        }
        Ok(())
    }

    /// Adds unknown seasons when `mode.persist` is set. Reports new seasons,
    /// plus known ones unless `mode.discover_new_only` is set.
    fn merge_season_candidates(
        &mut self,
        show_id: &str,
        candidates: Vec<SeasonCandidate>,
        mode: ScrapeMode,
    ) -> Vec<SeasonCandidate> {
        let mut reported = Vec::new();
        for candidate in candidates {
            let Ok(n) = candidate.n.trim().parse::<u32>() else {
                tracing::debug!(n = %candidate.n, "skipping season candidate with non-numeric number");
                continue;
            };
            let known = self
                .seasons
                .iter()
                .any(|season| season.show_id == show_id && season.n == n);
            if !known && mode.persist {
                tracing::info!(show_id, season = n, "creating season");
                self.add_season(show_id, n);
            }
            if !known || !mode.discover_new_only {
                reported.push(candidate);
            }
        }
        reported
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
