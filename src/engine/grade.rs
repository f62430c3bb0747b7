// Certifies a submission against the oracle and scores it.

use crate::engine::plan::{Assignment, PurchasePlan, Rejection, WaveQueues};
use crate::engine::replay::{replay, Command, Replay};
use crate::engine::scenario::Challenge;
use crate::engine::scorer;

/// How the participant's gun queues were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Explicit per-wave gun queues.
    Queues(Vec<WaveQueues>),
    /// No queues given; aliens are dealt to guns round-robin.
    RoundRobin,
}

/// What the participant claims the replay produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub commands: Vec<Command>,
    pub remaining_hp: i64,
    pub remaining_aliens: i64,
    /// (zero-based wave, wall durability after it)
    pub wall_after_wave: Vec<(usize, i64)>,
}

/// A submission after normalization, independent of its wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub plan: PurchasePlan,
    pub strategy: Strategy,
    pub claim: Claim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graded {
    pub score: i64,
    pub replay: Replay,
}

/// Runs the validity checks in order: plan and assignment before replay,
/// then the claim against the canonical replay.
pub fn grade(challenge: &Challenge, submission: &Submission) -> Result<Graded, Rejection> {
    let plan = &submission.plan;
    plan.check(challenge.budget)?;

    let gun_count = plan.guns_purchased.len();
    let assignment = match &submission.strategy {
        Strategy::Queues(waves) => Assignment::check(challenge, gun_count, waves)?,
        Strategy::RoundRobin => Assignment::round_robin(challenge, gun_count),
    };

    let replay = replay(challenge, plan, &assignment);
    verify_claim(&replay, &submission.claim)?;

    Ok(Graded {
        score: scorer::score(&replay, plan.total_cost),
        replay,
    })
}

fn verify_claim(replay: &Replay, claim: &Claim) -> Result<(), Rejection> {
    let diverges = replay
        .commands
        .iter()
        .zip(&claim.commands)
        .position(|(expected, claimed)| expected != claimed)
        .or_else(|| {
            (replay.commands.len() != claim.commands.len())
                .then(|| replay.commands.len().min(claim.commands.len()))
        });
    if let Some(index) = diverges {
        return Err(Rejection::TraceDiverges(index + 1));
    }

    if claim.remaining_hp != replay.remaining_hp {
        return Err(Rejection::RemainingHpMismatch);
    }
    if usize::try_from(claim.remaining_aliens).ok() != Some(replay.remaining_aliens) {
        return Err(Rejection::RemainingAliensMismatch);
    }
    for &(wave, wall) in &claim.wall_after_wave {
        if replay.wall_after_wave.get(wave) != Some(&wall) {
            return Err(Rejection::WallDurabilityMismatch(wave.saturating_add(1)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::AlienType::Regular;
    use crate::engine::catalog::WeaponType::{self, Turret};
    use crate::engine::scenario::Wave;
    use uuid::Uuid;
    use Command::*;

    fn two_regulars() -> Challenge {
        Challenge {
            id: Uuid::nil(),
            budget: 100,
            wall_durability: 100,
            waves: vec![Wave::of(&[Regular, Regular])],
        }
    }

    fn turret_submission(queue: Vec<i64>, claim: Claim) -> Submission {
        Submission {
            plan: PurchasePlan::new(vec![Turret]),
            strategy: Strategy::Queues(vec![WaveQueues {
                wave: 0,
                queues: vec![queue],
            }]),
            claim,
        }
    }

    fn honest_claim() -> Claim {
        Claim {
            commands: vec![Volley, AlienAttack, Volley],
            remaining_hp: 97,
            remaining_aliens: 0,
            wall_after_wave: vec![(0, 97)],
        }
    }

    #[test]
    fn test_honest_submission_is_certified() {
        let graded = grade(&two_regulars(), &turret_submission(vec![0, 1], honest_claim())).unwrap();
        assert_eq!(graded.replay.remaining_hp, 97);
        assert_eq!(graded.score, scorer::score(&graded.replay, 10));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let err = grade(&two_regulars(), &turret_submission(vec![5], honest_claim())).unwrap_err();
        assert_eq!(err.to_string(), "index out of range");
    }

    #[test]
    fn test_over_budget_rejected_before_replay() {
        let mut submission = turret_submission(vec![0, 1], honest_claim());
        submission.plan = PurchasePlan {
            guns_purchased: vec![WeaponType::RayGun, WeaponType::RayGun, WeaponType::RayGun],
            total_cost: 150,
        };
        // a queue that would be out of range shows the plan check runs first
        submission.strategy = Strategy::Queues(vec![WaveQueues {
            wave: 0,
            queues: vec![vec![9], vec![], vec![]],
        }]);
        assert_eq!(grade(&two_regulars(), &submission), Err(Rejection::OverBudget));
    }

    #[test]
    fn test_trace_divergence_reports_first_bad_step() {
        let mut claim = honest_claim();
        claim.commands = vec![Volley, Volley, AlienAttack];
        let err = grade(&two_regulars(), &turret_submission(vec![0, 1], claim)).unwrap_err();
        assert_eq!(err, Rejection::TraceDiverges(2));

        let mut truncated = honest_claim();
        truncated.commands.pop();
        let err = grade(&two_regulars(), &turret_submission(vec![0, 1], truncated)).unwrap_err();
        assert_eq!(err.to_string(), "command trace diverges from replay at step 3");
    }

    #[test]
    fn test_final_state_mismatches() {
        let mut hp = honest_claim();
        hp.remaining_hp = 100;
        assert_eq!(
            grade(&two_regulars(), &turret_submission(vec![0, 1], hp)),
            Err(Rejection::RemainingHpMismatch)
        );

        let mut aliens = honest_claim();
        aliens.remaining_aliens = -1;
        assert_eq!(
            grade(&two_regulars(), &turret_submission(vec![0, 1], aliens)),
            Err(Rejection::RemainingAliensMismatch)
        );

        let mut walls = honest_claim();
        walls.wall_after_wave = vec![(0, 94)];
        assert_eq!(
            grade(&two_regulars(), &turret_submission(vec![0, 1], walls)),
            Err(Rejection::WallDurabilityMismatch(1))
        );
    }

    #[test]
    fn test_round_robin_strategy_matches_explicit_queues() {
        let explicit = grade(&two_regulars(), &turret_submission(vec![0, 1], honest_claim())).unwrap();
        let implicit = grade(
            &two_regulars(),
            &Submission {
                strategy: Strategy::RoundRobin,
                ..turret_submission(vec![], honest_claim())
            },
        )
        .unwrap();
        assert_eq!(explicit, implicit);
    }
}
