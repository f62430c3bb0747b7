// Maps a certified replay to a single integer score.
//
// Fields are packed lexicographically: waves survived, then wall durability,
// then unspent money, then unused steps. Each field is clamped to its slot so a
// lower-priority field can never outweigh a higher one.

use crate::engine::replay::Replay;

const WALL_SLOTS: i64 = 1_000;
const SPEND_SLOTS: i64 = 1_000;
const STEP_SLOTS: i64 = 10_000;

fn clamp_slot(value: i64, slots: i64) -> i64 {
    value.clamp(0, slots - 1)
}

pub fn score(replay: &Replay, total_cost: i64) -> i64 {
    let waves = replay.waves_survived() as i64;
    let wall = clamp_slot(replay.remaining_hp, WALL_SLOTS);
    let savings = SPEND_SLOTS - 1 - clamp_slot(total_cost, SPEND_SLOTS);
    let steps = i64::try_from(replay.steps()).unwrap_or(i64::MAX);
    let speed = STEP_SLOTS - 1 - clamp_slot(steps, STEP_SLOTS);

    ((waves * WALL_SLOTS + wall) * SPEND_SLOTS + savings) * STEP_SLOTS + speed
}
