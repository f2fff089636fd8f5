use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::{Catalog, EpisodeStore, SeasonCandidateSink};
use crate::formats::{
    EpisodeRecord, EpisodeUpdate, NewEpisode, ScrapeMode, SeasonCandidate, SeasonInfo,
};

/// Episode store backed by a single `catalog.json` file. Every write
/// rewrites the file atomically, so each call commits on its own.
#[derive(Debug)]
pub struct LocalFsEpisodeStore {
    base_dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalFsEpisodeStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn catalog_path(&self) -> PathBuf {
        self.base_dir.join("catalog.json")
    }

    pub async fn add_season(&self, show_id: &str, n: u32) -> anyhow::Result<String> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.load().await?;
        let id = catalog.add_season(show_id, n);
        self.save(&catalog).await?;
        Ok(id)
    }

    pub async fn seasons(&self) -> anyhow::Result<Vec<SeasonInfo>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.seasons)
    }

    async fn load(&self) -> anyhow::Result<Catalog> {
        let path = self.catalog_path();
        let catalog = read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))?;
        Ok(catalog.unwrap_or_default())
    }

    async fn save(&self, catalog: &Catalog) -> anyhow::Result<()> {
        write_json_atomic(&self.catalog_path(), catalog)
            .await
            .context("write catalog.json")
    }
}

#[async_trait]
impl EpisodeStore for LocalFsEpisodeStore {
    async fn get_season(&self, season_id: &str) -> anyhow::Result<SeasonInfo> {
        let _guard = self.lock.lock().await;
        self.load().await?.season(season_id).cloned()
    }

    async fn get_episode_from_index(
        &self,
        show_id: &str,
        season_n: u32,
        episode_n: u32,
    ) -> anyhow::Result<Option<EpisodeRecord>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load()
            .await?
            .episode_from_index(show_id, season_n, episode_n)
            .cloned())
    }

    async fn add_episode(&self, season_id: &str, episode: NewEpisode) -> anyhow::Result<String> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.load().await?;
        let id = catalog.add_episode(season_id, episode)?;
        self.save(&catalog).await?;
        Ok(id)
    }

    async fn get_episode(&self, episode_id: &str) -> anyhow::Result<EpisodeRecord> {
        let _guard = self.lock.lock().await;
        self.load().await?.episode(episode_id).cloned()
    }

    async fn set_episode(&self, episode_id: &str, update: EpisodeUpdate) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.load().await?;
        catalog.set_episode(episode_id, update)?;
        self.save(&catalog).await
    }
}

#[async_trait]
impl SeasonCandidateSink for LocalFsEpisodeStore {
    async fn submit_season_candidates(
        &self,
        show_id: &str,
        candidates: Vec<SeasonCandidate>,
        mode: ScrapeMode,
    ) -> anyhow::Result<Vec<SeasonCandidate>> {
        let _guard = self.lock.lock().await;
        let mut catalog = self.load().await?;
        let reported = catalog.merge_season_candidates(show_id, candidates, mode);
        if mode.persist {
            self.save(&catalog).await?;
        }
        Ok(reported)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn catalog_survives_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsEpisodeStore::new(dir.path());
        let season = store.add_season("show", 2).await?;
        let id = store.add_episode(&season, NewEpisode { n: 4 }).await?;
        store
            .set_episode(&id, EpisodeUpdate { air_date: Some(1_000) })
            .await?;

        let reopened = LocalFsEpisodeStore::new(dir.path());
        let episode = reopened
            .get_episode_from_index("show", 2, 4)
            .await?
            .expect("episode persisted");
        assert_eq!(episode.id, id);
        assert_eq!(episode.air_date, Some(1_000));
        assert_eq!(reopened.get_season(&season).await?.n, 2);
        Ok(())
    }

    #[tokio::test]
    async fn missing_catalog_reads_as_empty() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = LocalFsEpisodeStore::new(dir.path().join("nested"));
        assert!(store.get_episode_from_index("show", 1, 1).await?.is_none());
        assert!(store.seasons().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_catalog_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("catalog.json"), "{not json")?;
        let store = LocalFsEpisodeStore::new(dir.path());
        let err = store.get_season("any").await.unwrap_err();
        assert!(format!("{err:#}").contains("parse json"));
        Ok(())
    }
}
