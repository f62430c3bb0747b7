use crate::engine::catalog::WeaponType;
use crate::engine::grade::{Claim, Strategy, Submission};
use crate::engine::plan::{PurchasePlan, WaveQueues};
use crate::engine::replay::Command;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GunPurchase {
    #[serde(rename = "type")]
    pub kind: WeaponType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WaveAssignment {
    /// One-based wave number.
    pub wave: i64,
    pub gun_queues: Vec<Vec<i64>>,
    #[serde(default)]
    pub wall_durability_remaining: Option<i64>,
}

/// Gun queues for every wave plus the claimed outcome.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignmentSubmission {
    pub guns_purchased: Vec<GunPurchase>,
    pub total_cost: i64,
    pub assignments: Vec<WaveAssignment>,
    pub commands: Vec<Command>,
    #[serde(rename = "remainingHP")]
    pub remaining_hp: i64,
    pub remaining_aliens: i64,
}

/// Only the claimed outcome; gun queues are implied round-robin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TraceSubmission {
    pub guns_purchased: Vec<GunPurchase>,
    pub total_cost: i64,
    pub commands: Vec<Command>,
    #[serde(rename = "remainingHP")]
    pub remaining_hp: i64,
    pub remaining_aliens: i64,
}

/// Accepted request bodies, selected by their declared `version`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "version", rename_all = "camelCase")]
pub enum SubmissionBody {
    Assignment(AssignmentSubmission),
    Trace(TraceSubmission),
}

fn plan_of(guns: &[GunPurchase], total_cost: i64) -> PurchasePlan {
    PurchasePlan {
        guns_purchased: guns.iter().map(|g| g.kind).collect(),
        total_cost,
    }
}

impl From<SubmissionBody> for Submission {
    fn from(body: SubmissionBody) -> Self {
        match body {
            SubmissionBody::Assignment(s) => {
                // wave numbers below 1 map to an index no scenario has
                let zero_based = |wave: i64| {
                    wave.checked_sub(1)
                        .and_then(|w| usize::try_from(w).ok())
                        .unwrap_or(usize::MAX)
                };
                let wall_after_wave = s
                    .assignments
                    .iter()
                    .filter_map(|a| {
                        a.wall_durability_remaining
                            .map(|wall| (zero_based(a.wave), wall))
                    })
                    .collect();
                let queues = s
                    .assignments
                    .into_iter()
                    .map(|a| WaveQueues {
                        wave: zero_based(a.wave),
                        queues: a.gun_queues,
                    })
                    .collect();
                Submission {
                    plan: plan_of(&s.guns_purchased, s.total_cost),
                    strategy: Strategy::Queues(queues),
                    claim: Claim {
                        commands: s.commands,
                        remaining_hp: s.remaining_hp,
                        remaining_aliens: s.remaining_aliens,
                        wall_after_wave,
                    },
                }
            }
            SubmissionBody::Trace(s) => Submission {
                plan: plan_of(&s.guns_purchased, s.total_cost),
                strategy: Strategy::RoundRobin,
                claim: Claim {
                    commands: s.commands,
                    remaining_hp: s.remaining_hp,
                    remaining_aliens: s.remaining_aliens,
                    wall_after_wave: Vec::new(),
                },
            },
        }
    }
}

/// The one authoritative grading result of a challenge id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradingResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GradingResult {
    pub fn accepted(score: i64) -> Self {
        GradingResult {
            valid: true,
            score: Some(score),
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        GradingResult {
            valid: false,
            score: None,
            reason: Some(reason.into()),
        }
    }
}
