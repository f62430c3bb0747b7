// The oracle: replays a purchase plan and gun assignment against a scenario.
//
// Each wave runs as a sequence of discrete steps. A step is a gun phase
// (volley, focusedShot or focusedVolley) followed by a counter phase in which
// at most one unpinned alien reaches the wall. Guns always resolve before the
// counter phase of the same step. When no gun has a live target left, every
// surviving alien reaches the wall in FIFO order under a single alienAttack.

use crate::engine::catalog::WeaponType;
use crate::engine::plan::{Assignment, PurchasePlan};
use crate::engine::scenario::Challenge;
use serde::{Deserialize, Serialize};

/// One token of the canonical command trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Volley,
    FocusedShot,
    FocusedVolley,
    AlienAttack,
}

impl Command {
    pub fn is_gun_phase(self) -> bool {
        !matches!(self, Command::AlienAttack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Survived,
    /// The wall fell while engaging this zero-based wave.
    Defeated { wave: usize },
}

/// The canonical result of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    pub commands: Vec<Command>,
    pub remaining_hp: i64,
    pub remaining_aliens: usize,
    /// Wall durability after each wave. Waves never engaged report 0.
    pub wall_after_wave: Vec<i64>,
    pub outcome: Outcome,
}

impl Replay {
    pub fn waves_survived(&self) -> usize {
        self.wall_after_wave.iter().filter(|&&wall| wall > 0).count()
    }

    /// Number of gun-phase steps taken.
    pub fn steps(&self) -> usize {
        self.commands.iter().filter(|c| c.is_gun_phase()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaveStart(usize),
    Engaging(usize),
    WaveResolved(usize),
    Defeated(usize),
    Survived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Alive,
    Killed,
    Breached,
}

struct Battle<'a> {
    challenge: &'a Challenge,
    guns: &'a [WeaponType],
    assignment: &'a Assignment,
    wall: i64,
    wave: Option<usize>,
    hp: Vec<i64>,
    status: Vec<Status>,
    cursors: Vec<usize>,
    commands: Vec<Command>,
    wall_after_wave: Vec<i64>,
}

impl<'a> Battle<'a> {
    fn new(challenge: &'a Challenge, guns: &'a [WeaponType], assignment: &'a Assignment) -> Self {
        Battle {
            challenge,
            guns,
            assignment,
            wall: challenge.wall_durability.max(0),
            wave: None,
            hp: Vec::new(),
            status: Vec::new(),
            cursors: Vec::new(),
            commands: Vec::new(),
            wall_after_wave: Vec::with_capacity(challenge.waves.len()),
        }
    }

    fn load_wave(&mut self, k: usize) {
        let aliens = &self.challenge.waves[k].aliens;
        self.wave = Some(k);
        self.hp = aliens.iter().map(|a| a.hp).collect();
        self.status = vec![Status::Alive; aliens.len()];
        self.cursors = vec![0; self.guns.len()];
    }

    /// Current target of `gun`, skipping queue entries that are no longer alive.
    fn target(&mut self, k: usize, gun: usize) -> Option<usize> {
        let assignment = self.assignment;
        let queue = &assignment.queues(k)[gun];
        while let Some(&alien) = queue.get(self.cursors[gun]) {
            if self.status[alien] == Status::Alive {
                return Some(alien);
            }
            self.cursors[gun] += 1;
        }
        None
    }

    fn targets(&mut self, k: usize) -> Vec<Option<usize>> {
        (0..self.guns.len()).map(|gun| self.target(k, gun)).collect()
    }

    fn hit(&mut self, alien: usize, atk: i64) {
        if self.status[alien] != Status::Alive {
            return;
        }
        self.hp[alien] -= atk;
        if self.hp[alien] <= 0 {
            self.status[alien] = Status::Killed;
        }
    }

    /// An alien reaches the wall: it deals its atk once and is spent.
    fn breach(&mut self, k: usize, alien: usize) {
        let atk = self.challenge.waves[k].aliens[alien].atk;
        self.wall = (self.wall - atk).max(0);
        self.status[alien] = Status::Breached;
    }

    /// Picks the gun command for this step and the (gun, alien) hits it makes.
    fn gun_phase(&self, targets: &[Option<usize>]) -> (Command, Vec<(usize, usize)>) {
        let active: Vec<(usize, usize)> = targets
            .iter()
            .enumerate()
            .filter_map(|(gun, target)| target.map(|alien| (gun, alien)))
            .collect();

        if active.len() > 1 || self.guns.len() == 1 {
            return (Command::Volley, active);
        }

        let (gun, alien) = active[0];
        let needed = self.hp[alien];
        let mut dealt = self.guns[gun].atk();
        if dealt >= needed {
            return (Command::FocusedShot, active);
        }

        let mut hits = active;
        for idle in (0..self.guns.len()).filter(|&g| g != gun) {
            if dealt >= needed {
                break;
            }
            hits.push((idle, alien));
            dealt += self.guns[idle].atk();
        }
        (Command::FocusedVolley, hits)
    }

    fn step(&mut self, k: usize) -> Phase {
        let targets = self.targets(k);
        if targets.iter().all(Option::is_none) {
            return self.overrun(k);
        }

        let (command, hits) = self.gun_phase(&targets);
        self.commands.push(command);
        for (gun, alien) in hits {
            let atk = self.guns[gun].atk();
            self.hit(alien, atk);
        }

        let pinned = self.targets(k);
        let runner = (0..self.status.len())
            .find(|&i| self.status[i] == Status::Alive && !pinned.contains(&Some(i)));
        if let Some(alien) = runner {
            self.breach(k, alien);
            self.commands.push(Command::AlienAttack);
            if self.wall == 0 {
                return Phase::Defeated(k);
            }
        }
        Phase::Engaging(k)
    }

    /// End of the engagement phase: every surviving alien reaches the wall.
    fn overrun(&mut self, k: usize) -> Phase {
        let alive: Vec<usize> = (0..self.status.len())
            .filter(|&i| self.status[i] == Status::Alive)
            .collect();
        if alive.is_empty() {
            return Phase::WaveResolved(k);
        }

        self.commands.push(Command::AlienAttack);
        for alien in alive {
            self.breach(k, alien);
            if self.wall == 0 {
                return Phase::Defeated(k);
            }
        }
        Phase::WaveResolved(k)
    }

    fn finish(mut self, phase: Phase) -> Replay {
        let (outcome, remaining_aliens) = match phase {
            Phase::Defeated(k) => {
                let in_current = if self.wave == Some(k) {
                    self.status.iter().filter(|&&s| s == Status::Alive).count()
                } else {
                    self.challenge.waves[k].len()
                };
                let later: usize = self.challenge.waves[k + 1..].iter().map(|w| w.len()).sum();
                (Outcome::Defeated { wave: k }, in_current + later)
            }
            _ => (Outcome::Survived, 0),
        };
        self.wall_after_wave.resize(self.challenge.waves.len(), 0);

        Replay {
            commands: self.commands,
            remaining_hp: self.wall,
            remaining_aliens,
            wall_after_wave: self.wall_after_wave,
            outcome,
        }
    }
}

/// Replays `plan` and `assignment` against `challenge`.
///
/// Pure and deterministic: the same inputs always yield the same trace and
/// final state. Every gun-phase step deals damage, so the loop is bounded by
/// the total alien hp of the scenario.
pub fn replay(challenge: &Challenge, plan: &PurchasePlan, assignment: &Assignment) -> Replay {
    let mut battle = Battle::new(challenge, &plan.guns_purchased, assignment);
    let mut phase = Phase::WaveStart(0);

    loop {
        phase = match phase {
            Phase::WaveStart(k) if k == challenge.waves.len() => Phase::Survived,
            Phase::WaveStart(k) if battle.wall == 0 => Phase::Defeated(k),
            Phase::WaveStart(k) => {
                battle.load_wave(k);
                Phase::Engaging(k)
            }
            Phase::Engaging(k) => battle.step(k),
            Phase::WaveResolved(k) => {
                battle.wall_after_wave.push(battle.wall);
                Phase::WaveStart(k + 1)
            }
            Phase::Defeated(_) | Phase::Survived => break,
        };
    }

    battle.finish(phase)
}
