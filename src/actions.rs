use crate::events::Animation;
use crate::model::{clamp_gauge, ActionKind, GameState, Pet};
use crate::progression::{award_xp, Progress};
use crate::stats::same_local_day;
use chrono::{DateTime, Utc};

/// Gauge gain of feed / drink / pet before the stage multiplier.
pub const CARE_AMOUNT: f64 = 25.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    DailyLimitReached,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Rejection::DailyLimitReached => "Already played 3 games today! 🎮",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Applied {
    pub kind: ActionKind,
    pub xp_awarded: u32,
    pub message: String,
    pub animation: Animation,
    pub progress: Vec<Progress>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Applied(Applied),
    /// The caller should run a walk and report back with `complete_walk`.
    WalkRequested,
    /// The caller should run a mini-game and report back with `complete_mini_game`.
    MiniGameRequested,
    Rejected(Rejection),
    NoPet,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

pub fn walk_bladder_bonus(duration_secs: f64) -> f64 {
    (30.0 + (duration_secs / 60.0) * 10.0).min(100.0)
}

pub fn walk_affection_bonus(duration_secs: f64) -> f64 {
    10.0 + (duration_secs / 60.0) * 5.0
}

pub fn walk_xp(relief_count: u32) -> u32 {
    ActionKind::Walk
        .xp_reward()
        .saturating_add(relief_count.saturating_mul(5))
}

pub fn mini_game_xp(score: u32) -> u32 {
    ActionKind::Play.xp_reward().saturating_add(score / 5)
}

fn sanitize_duration(secs: f64) -> f64 {
    if secs.is_finite() && secs > 0.0 {
        secs
    } else {
        0.0
    }
}

impl GameState {
    /// Applies a player action. Walk and play only open their session here;
    /// nothing about the pet changes until the matching completion call.
    pub fn perform(&mut self, kind: ActionKind, now: DateTime<Utc>) -> Outcome {
        let Some(current) = self.pet.as_ref() else {
            return Outcome::NoPet;
        };

        let (message, animation) = match kind {
            ActionKind::Feed => ("Yum yum! 🍎", Animation::Eating),
            ActionKind::Drink => ("Glug glug! 💧", Animation::Drinking),
            ActionKind::Pet => ("Purr... ❤️", Animation::Loved),
            ActionKind::Walk => return Outcome::WalkRequested,
            ActionKind::Play => {
                return if current.can_play_mini_game(now) {
                    Outcome::MiniGameRequested
                } else {
                    Outcome::Rejected(Rejection::DailyLimitReached)
                };
            }
        };

        let mut pet = current.clone();
        let amount = CARE_AMOUNT * pet.stage.action_multiplier();
        match kind {
            ActionKind::Feed => pet.hunger = clamp_gauge(pet.hunger + amount),
            ActionKind::Drink => pet.thirst = clamp_gauge(pet.thirst + amount),
            _ => pet.affection = clamp_gauge(pet.affection + amount),
        }

        let xp = kind.xp_reward();
        Outcome::Applied(self.commit(pet, kind, xp, message.to_string(), animation, now))
    }

    pub fn complete_walk(
        &mut self,
        duration_secs: f64,
        relief_count: u32,
        now: DateTime<Utc>,
    ) -> Outcome {
        let Some(current) = self.pet.as_ref() else {
            return Outcome::NoPet;
        };
        let duration = sanitize_duration(duration_secs);

        let mut pet = current.clone();
        pet.bladder = clamp_gauge(pet.bladder + walk_bladder_bonus(duration));
        pet.affection = clamp_gauge(pet.affection + walk_affection_bonus(duration));
        pet.total_walks = pet.total_walks.saturating_add(1);
        pet.last_walk_at = Some(now);

        let xp = walk_xp(relief_count);
        let message = format!("Great walk! 🌳 (+{xp} XP)");
        Outcome::Applied(self.commit(pet, ActionKind::Walk, xp, message, Animation::Walking, now))
    }

    pub fn complete_mini_game(&mut self, score: u32, now: DateTime<Utc>) -> Outcome {
        let Some(current) = self.pet.as_ref() else {
            return Outcome::NoPet;
        };

        let mut pet = current.clone();
        pet.affection = clamp_gauge(pet.affection + f64::from(score) / 10.0);
        pet.mini_games_today = pet.mini_games_today(now).saturating_add(1);
        pet.total_mini_games = pet.total_mini_games.saturating_add(1);
        pet.last_mini_game_at = Some(now);

        let message = if score > pet.high_score {
            pet.high_score = score;
            format!("New record: {score}! 🏆")
        } else {
            format!("Well played! Score: {score} 🎮")
        };

        let xp = mini_game_xp(score);
        Outcome::Applied(self.commit(pet, ActionKind::Play, xp, message, Animation::Celebrate, now))
    }

    /// Resets a plays-today counter left over from an earlier day.
    pub fn roll_over_day(&mut self, now: DateTime<Utc>) -> bool {
        let Some(pet) = self.pet.as_mut() else {
            return false;
        };
        match pet.last_mini_game_at {
            Some(last) if !same_local_day(last, now) && pet.mini_games_today != 0 => {
                pet.mini_games_today = 0;
                true
            }
            _ => false,
        }
    }

    fn commit(
        &mut self,
        mut pet: Pet,
        kind: ActionKind,
        xp: u32,
        message: String,
        animation: Animation,
        now: DateTime<Utc>,
    ) -> Applied {
        let progress = award_xp(&mut pet, xp);
        pet.last_interaction_at = now;
        self.pet = Some(pet);
        self.counters.record(kind);
        Applied {
            kind,
            xp_awarded: xp,
            message,
            animation,
            progress,
        }
    }
}
