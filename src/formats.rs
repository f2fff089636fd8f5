use serde::{Deserialize, Serialize};

/// Numeric show id as it appears in the listing page's edit links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowId(pub String);

impl ShowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCandidate {
    /// Raw value of the season's `no` attribute.
    pub n: String,
    pub uri: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeMode {
    pub discover_new_only: bool,
    pub persist: bool,
}

impl ScrapeMode {
    pub fn new(discover_new_only: bool, persist: bool) -> Self {
        Self {
            discover_new_only,
            persist,
        }
    }
}

/// Season metadata as known to the episode store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonInfo {
    pub id: String,
    pub show_id: String,
    pub n: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: String,
    pub season_id: String,
    pub n: u32,
    /// Air date in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEpisode {
    pub n: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_date: Option<i64>,
}

/// One entry of a reconciliation result. `air_date` is always the value
/// parsed from the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledEpisode {
    pub n: u32,
    pub air_date: i64,
}
