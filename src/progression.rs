//! XP to level-ups, level-ups to evolution.
//!
//! Levels are checked in a loop so one large award can cross several
//! thresholds; evolution is re-checked after every level so a stage is never
//! skipped past its own required level.

use crate::model::{EvolutionStage, Pet};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Progress {
    LevelUp { level: u32 },
    Evolved { stage: EvolutionStage },
}

/// Adds `amount` XP and resolves every resulting transition in order.
pub fn award_xp(pet: &mut Pet, amount: u32) -> Vec<Progress> {
    pet.xp = pet.xp.saturating_add(amount);
    resolve(pet)
}

pub(crate) fn resolve(pet: &mut Pet) -> Vec<Progress> {
    let mut events = Vec::new();
    loop {
        let needed = pet.xp_for_next_level();
        if pet.xp < needed {
            break;
        }
        pet.xp -= needed;
        pet.level = pet.level.saturating_add(1);
        events.push(Progress::LevelUp { level: pet.level });

        if let Some(stage) = evolve_once(pet) {
            events.push(Progress::Evolved { stage });
        }
    }
    events
}

// One stage per check; the next level-up gets another chance.
fn evolve_once(pet: &mut Pet) -> Option<EvolutionStage> {
    if !pet.can_evolve() {
        return None;
    }
    let next = pet.stage.next()?;
    pet.stage = next;
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Species;
    use chrono::Utc;

    fn pet() -> Pet {
        Pet::new("Mochi", Species::Dog, Utc::now())
    }

    #[test]
    fn small_award_just_accumulates() {
        let mut p = pet();
        assert!(award_xp(&mut p, 99).is_empty());
        assert_eq!(p.xp, 99);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn exact_threshold_levels_up() {
        let mut p = pet();
        let events = award_xp(&mut p, 100);
        assert_eq!(events, vec![Progress::LevelUp { level: 2 }]);
        assert_eq!(p.xp, 0);
    }

    #[test]
    fn one_award_can_cross_two_levels() {
        let mut p = pet();
        let events = award_xp(&mut p, 250);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 0);
        assert_eq!(
            events,
            vec![Progress::LevelUp { level: 2 }, Progress::LevelUp { level: 3 }]
        );
    }

    #[test]
    fn remainder_is_kept() {
        let mut p = pet();
        award_xp(&mut p, 130);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 30);
    }

    #[test]
    fn evolves_to_child_at_level_five() {
        let mut p = pet();
        p.level = 4;
        let need = p.xp_for_next_level();
        let events = award_xp(&mut p, need);
        assert_eq!(p.level, 5);
        assert_eq!(p.stage, EvolutionStage::Child);
        assert_eq!(
            events,
            vec![
                Progress::LevelUp { level: 5 },
                Progress::Evolved {
                    stage: EvolutionStage::Child
                }
            ]
        );
    }

    #[test]
    fn late_baby_moves_one_stage_per_level() {
        // A baby that somehow reached level 14 without evolving.
        let mut p = pet();
        p.level = 14;
        let need = p.xp_for_next_level();
        let events = award_xp(&mut p, need);
        assert_eq!(p.level, 15);
        assert_eq!(p.stage, EvolutionStage::Child);
        assert_eq!(events.len(), 2);

        // The next level-up re-evaluates and reaches adult.
        let need = p.xp_for_next_level();
        let events = award_xp(&mut p, need);
        assert_eq!(p.level, 16);
        assert_eq!(p.stage, EvolutionStage::Adult);
        assert!(events.contains(&Progress::Evolved {
            stage: EvolutionStage::Adult
        }));
    }

    #[test]
    fn senior_is_terminal() {
        let mut p = pet();
        p.level = 30;
        p.stage = EvolutionStage::Senior;
        let events = award_xp(&mut p, 10_000);
        assert!(events
            .iter()
            .all(|e| matches!(e, Progress::LevelUp { .. })));
        assert_eq!(p.stage, EvolutionStage::Senior);
    }

    #[test]
    fn stage_never_regresses_across_many_awards() {
        let mut p = pet();
        let mut last = p.stage;
        for _ in 0..200 {
            award_xp(&mut p, 333);
            assert!(p.stage >= last);
            assert!(p.level >= p.stage.required_level());
            assert!(p.xp < p.xp_for_next_level());
            last = p.stage;
        }
        assert_eq!(p.stage, EvolutionStage::Senior);
    }
}
