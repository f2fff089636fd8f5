use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Catalog, EpisodeStore, SeasonCandidateSink};
use crate::formats::{
    EpisodeRecord, EpisodeUpdate, NewEpisode, ScrapeMode, SeasonCandidate, SeasonInfo,
};

/// A mutation issued through [`EpisodeStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    AddEpisode { season_id: String, n: u32 },
    SetEpisode { episode_id: String, air_date: Option<i64> },
}

#[derive(Debug, Default)]
struct State {
    catalog: Catalog,
    writes: Vec<StoreWrite>,
}

/// In-process episode store. Keeps a log of every write it receives.
#[derive(Debug, Default)]
pub struct MemoryEpisodeStore {
    state: Mutex<State>,
}

impl MemoryEpisodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_season(&self, show_id: &str, n: u32) -> String {
        self.state.lock().await.catalog.add_season(show_id, n)
    }

    /// Inserts an episode directly, bypassing the write log.
    pub async fn insert_episode(
        &self,
        season_id: &str,
        n: u32,
        air_date: Option<i64>,
    ) -> anyhow::Result<String> {
        let mut state = self.state.lock().await;
        let id = state.catalog.add_episode(season_id, NewEpisode { n })?;
        state.catalog.set_episode(&id, EpisodeUpdate { air_date })?;
        Ok(id)
    }

    pub async fn seasons(&self) -> Vec<SeasonInfo> {
        self.state.lock().await.catalog.seasons.clone()
    }

    pub async fn episodes(&self) -> Vec<EpisodeRecord> {
        self.state.lock().await.catalog.episodes.clone()
    }

    pub async fn writes(&self) -> Vec<StoreWrite> {
        self.state.lock().await.writes.clone()
    }

    pub async fn clear_writes(&self) {
        self.state.lock().await.writes.clear();
    }
}

#[async_trait]
impl EpisodeStore for MemoryEpisodeStore {
    async fn get_season(&self, season_id: &str) -> anyhow::Result<SeasonInfo> {
        self.state.lock().await.catalog.season(season_id).cloned()
    }

    async fn get_episode_from_index(
        &self,
        show_id: &str,
        season_n: u32,
        episode_n: u32,
    ) -> anyhow::Result<Option<EpisodeRecord>> {
        Ok(self
            .state
            .lock()
            .await
            .catalog
            .episode_from_index(show_id, season_n, episode_n)
            .cloned())
    }

    async fn add_episode(&self, season_id: &str, episode: NewEpisode) -> anyhow::Result<String> {
        let mut state = self.state.lock().await;
        let id = state.catalog.add_episode(season_id, episode)?;
        state.writes.push(StoreWrite::AddEpisode {
            season_id: season_id.to_owned(),
            n: episode.n,
        });
        Ok(id)
    }

    async fn get_episode(&self, episode_id: &str) -> anyhow::Result<EpisodeRecord> {
        self.state.lock().await.catalog.episode(episode_id).cloned()
    }

    async fn set_episode(&self, episode_id: &str, update: EpisodeUpdate) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        state.catalog.set_episode(episode_id, update)?;
        state.writes.push(StoreWrite::SetEpisode {
            episode_id: episode_id.to_owned(),
            air_date: update.air_date,
        });
        Ok(())
    }
}

#[async_trait]
impl SeasonCandidateSink for MemoryEpisodeStore {
    async fn submit_season_candidates(
        &self,
        show_id: &str,
        candidates: Vec<SeasonCandidate>,
        mode: ScrapeMode,
    ) -> anyhow::Result<Vec<SeasonCandidate>> {
        Ok(self
            .state
            .lock()
            .await
            .catalog
            .merge_season_candidates(show_id, candidates, mode))
    }
}
