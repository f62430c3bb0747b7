// Deterministic scenario generation, seeded from the challenge id.

use crate::engine::catalog::AlienType;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const BUDGET: i64 = 100;
const WALL_DURABILITY_RANGE: (i64, i64) = (50, 100);
const SEED_SALT: &[u8] = b"alien-invasion-scenario";

/// Inclusive (lower, upper) counts of (regular, swift, boss) aliens per wave.
const WAVE_COMPOSITION: &[[(usize, usize); 3]] = &[
    [(3, 5), (0, 1), (0, 0)],
    [(3, 5), (3, 5), (0, 1)],
    [(5, 10), (5, 9), (1, 3)],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alien {
    #[serde(rename = "type")]
    pub kind: AlienType,
    pub hp: i64,
    pub atk: i64,
}

impl Alien {
    pub fn new(kind: AlienType) -> Self {
        Alien {
            kind,
            hp: kind.hp(),
            atk: kind.atk(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub aliens: Vec<Alien>,
}

impl Wave {
    pub fn of(kinds: &[AlienType]) -> Self {
        Wave {
            aliens: kinds.iter().copied().map(Alien::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.aliens.len()
    }
}

/// An immutable battle scenario bound to one challenge id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: Uuid,
    pub budget: i64,
    pub wall_durability: i64,
    pub waves: Vec<Wave>,
}

impl Challenge {
    pub fn total_aliens(&self) -> usize {
        self.waves.iter().map(Wave::len).sum()
    }
}

pub fn seed_for(id: &Uuid) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(SEED_SALT);
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(head)
}

pub fn generate(id: &Uuid) -> Challenge {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_for(id));
    let wall_durability = rng.gen_range(WALL_DURABILITY_RANGE.0..=WALL_DURABILITY_RANGE.1);

    let waves = WAVE_COMPOSITION
        .iter()
        .map(|bounds| {
            let mut kinds = Vec::new();
            for (kind, (lower, upper)) in [AlienType::Regular, AlienType::Swift, AlienType::Boss]
                .into_iter()
                .zip(bounds.iter().copied())
            {
                let count = rng.gen_range(lower..=upper);
                kinds.extend(std::iter::repeat(kind).take(count));
            }
            kinds.shuffle(&mut rng);
            Wave::of(&kinds)
        })
        .collect();

    Challenge {
        id: *id,
        budget: BUDGET,
        wall_durability,
        waves,
    }
}
