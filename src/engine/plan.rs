// Purchase plans, gun-queue assignments and the checks that run before replay.

use crate::engine::catalog::WeaponType;
use crate::engine::scenario::Challenge;
use thiserror::Error;

/// Why a submission was rejected. The `Display` text is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("total cost exceeds budget")]
    OverBudget,
    #[error("total cost does not match purchased guns")]
    CostMismatch,
    #[error("wave out of range")]
    WaveOutOfRange,
    #[error("duplicate wave assignment")]
    DuplicateWave,
    #[error("gun queue count does not match guns purchased")]
    QueueCountMismatch,
    #[error("index out of range")]
    IndexOutOfRange,
    #[error("alien targeted more than once")]
    DoubleTargeted,
    #[error("command trace diverges from replay at step {0}")]
    TraceDiverges(usize),
    #[error("remainingHP does not match replay")]
    RemainingHpMismatch,
    #[error("remainingAliens does not match replay")]
    RemainingAliensMismatch,
    #[error("wallDurabilityRemaining does not match replay for wave {0}")]
    WallDurabilityMismatch(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePlan {
    pub guns_purchased: Vec<WeaponType>,
    pub total_cost: i64,
}

impl PurchasePlan {
    pub fn new(guns_purchased: Vec<WeaponType>) -> Self {
        let total_cost = guns_purchased.iter().map(|g| g.cost()).sum();
        PurchasePlan {
            guns_purchased,
            total_cost,
        }
    }

    pub fn cost_of_guns(&self) -> i64 {
        self.guns_purchased.iter().map(|g| g.cost()).sum()
    }

    /// Budget is checked first so an overspend is reported as such even when
    /// the declared total is also wrong.
    pub fn check(&self, budget: i64) -> Result<(), Rejection> {
        if self.total_cost > budget || self.cost_of_guns() > budget {
            return Err(Rejection::OverBudget);
        }
        if self.total_cost != self.cost_of_guns() {
            return Err(Rejection::CostMismatch);
        }
        Ok(())
    }
}

/// Gun queues for one wave as submitted: `queues[gun]` lists alien indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveQueues {
    /// Zero-based wave index.
    pub wave: usize,
    pub queues: Vec<Vec<i64>>,
}

/// A checked assignment: `waves[w][g]` is the target queue of gun `g` in wave `w`.
///
/// Only constructible through [`Assignment::check`], so the replay engine can
/// index aliens without bounds failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    waves: Vec<Vec<Vec<usize>>>,
}

impl Assignment {
    pub fn check(
        challenge: &Challenge,
        gun_count: usize,
        submitted: &[WaveQueues],
    ) -> Result<Self, Rejection> {
        let mut waves: Vec<Option<Vec<Vec<usize>>>> = vec![None; challenge.waves.len()];

        for entry in submitted {
            let wave = challenge
                .waves
                .get(entry.wave)
                .ok_or(Rejection::WaveOutOfRange)?;
            if waves[entry.wave].is_some() {
                return Err(Rejection::DuplicateWave);
            }
            if entry.queues.len() != gun_count {
                return Err(Rejection::QueueCountMismatch);
            }

            let mut targeted = vec![false; wave.len()];
            let mut queues = Vec::with_capacity(gun_count);
            for queue in &entry.queues {
                let mut checked = Vec::with_capacity(queue.len());
                for &index in queue {
                    let index = usize::try_from(index)
                        .ok()
                        .filter(|&i| i < wave.len())
                        .ok_or(Rejection::IndexOutOfRange)?;
                    if std::mem::replace(&mut targeted[index], true) {
                        return Err(Rejection::DoubleTargeted);
                    }
                    checked.push(index);
                }
                queues.push(checked);
            }
            waves[entry.wave] = Some(queues);
        }

        Ok(Assignment {
            waves: waves
                .into_iter()
                .map(|w| w.unwrap_or_else(|| vec![Vec::new(); gun_count]))
                .collect(),
        })
    }

    /// Alien `i` of every wave goes to gun `i mod gun_count`, in FIFO order.
    pub fn round_robin(challenge: &Challenge, gun_count: usize) -> Self {
        let waves = challenge
            .waves
            .iter()
            .map(|wave| {
                let mut queues = vec![Vec::new(); gun_count];
                if gun_count > 0 {
                    for index in 0..wave.len() {
                        queues[index % gun_count].push(index);
                    }
                }
                queues
            })
            .collect();
        Assignment { waves }
    }

    pub fn queues(&self, wave: usize) -> &[Vec<usize>] {
        &self.waves[wave]
    }
}
