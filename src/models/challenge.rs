use crate::engine::catalog::AlienType;
use crate::engine::scenario::{Alien, Challenge};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AlienPageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AlienPageQuery {
    pub fn is_requested(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct WaveView {
    /// One-based wave number.
    pub wave: usize,
    pub aliens: Vec<Alien>,
}

/// One alien of the flattened, paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlienEntry {
    pub wave: usize,
    /// Index within its wave, as used in gun queues.
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: AlienType,
    pub hp: i64,
    pub atk: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeView {
    pub waves: Vec<WaveView>,
    pub budget: i64,
    pub wall_durability: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliens: Option<Vec<AlienEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl From<&Challenge> for ChallengeView {
    fn from(challenge: &Challenge) -> Self {
        ChallengeView {
            waves: challenge
                .waves
                .iter()
                .enumerate()
                .map(|(i, wave)| WaveView {
                    wave: i + 1,
                    aliens: wave.aliens.clone(),
                })
                .collect(),
            budget: challenge.budget,
            wall_durability: challenge.wall_durability,
            aliens: None,
            total: None,
        }
    }
}
