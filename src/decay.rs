use crate::model::{clamp_gauge, GameState, Pet, Rules};
use chrono::{DateTime, Utc};

// Share of the hunger/thirst loss applied to the slower gauges.
const TICK_AFFECTION_RATIO: f64 = 0.3;
const TICK_BLADDER_RATIO: f64 = 0.6;
const CATCHUP_AFFECTION_RATIO: f64 = 0.5;
const CATCHUP_BLADDER_RATIO: f64 = 0.7;

/// Loss per second for this pet at the given base rate. Only the stage
/// matters; every species decays alike.
pub fn decay_rate(pet: &Pet, base_rate: f64) -> f64 {
    base_rate * pet.stage.decay_multiplier()
}

fn drain(pet: &mut Pet, amount: f64, affection_ratio: f64, bladder_ratio: f64) {
    pet.hunger = clamp_gauge(pet.hunger - amount);
    pet.thirst = clamp_gauge(pet.thirst - amount);
    pet.affection = clamp_gauge(pet.affection - amount * affection_ratio);
    pet.bladder = clamp_gauge(pet.bladder - amount * bladder_ratio);
}

impl GameState {
    /// One fixed-period decay step. Returns false when there is no pet.
    pub fn tick_decay(&mut self, rules: &Rules) -> bool {
        let Some(pet) = self.pet.as_mut() else {
            return false;
        };
        let rate = decay_rate(pet, rules.base_decay_rate);
        drain(pet, rate, TICK_AFFECTION_RATIO, TICK_BLADDER_RATIO);
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CatchupReport {
    pub elapsed_secs: f64,
    pub hunger_lost: f64,
    pub thirst_lost: f64,
    pub affection_lost: f64,
    pub bladder_lost: f64,
}

impl CatchupReport {
    pub fn has_anything(&self) -> bool {
        self.hunger_lost > 0.0
            || self.thirst_lost > 0.0
            || self.affection_lost > 0.0
            || self.bladder_lost > 0.0
    }
}

/// Bulk decay for the time the game was closed.
///
/// Elapsed time is measured from `state.last_saved_at`; a save stamped in the
/// future counts as zero elapsed time.
pub fn catch_up(state: &mut GameState, now: DateTime<Utc>, rules: &Rules) -> CatchupReport {
    let elapsed_ms = (now - state.last_saved_at).num_milliseconds().max(0);
    let elapsed_secs = elapsed_ms as f64 / 1000.0;

    let Some(pet) = state.pet.as_mut() else {
        return CatchupReport {
            elapsed_secs,
            ..CatchupReport::default()
        };
    };

    let before = pet.gauges();
    let amount = elapsed_secs * decay_rate(pet, rules.base_decay_rate);
    drain(pet, amount, CATCHUP_AFFECTION_RATIO, CATCHUP_BLADDER_RATIO);
    let after = pet.gauges();

    CatchupReport {
        elapsed_secs,
        hunger_lost: before.hunger - after.hunger,
        thirst_lost: before.thirst - after.thirst,
        affection_lost: before.affection - after.affection,
        bladder_lost: before.bladder - after.bladder,
    }
}
