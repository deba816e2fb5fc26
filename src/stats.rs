//! Derived values over a pet snapshot. Nothing in here mutates.

use crate::model::{Gauges, Mood, Pet, MAX_DAILY_MINI_GAMES};
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Below this, a single need overrides every other mood.
pub const LOW_NEED: f64 = 20.0;

pub(crate) fn local_date(t: DateTime<Utc>) -> NaiveDate {
    t.with_timezone(&Local).date_naive()
}

pub(crate) fn same_local_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    local_date(a) == local_date(b)
}

pub fn xp_for_next_level(level: u32) -> u32 {
    level.saturating_mul(50).saturating_add(50)
}

pub fn average(g: &Gauges) -> f64 {
    (g.hunger + g.thirst + g.affection + g.bladder) / 4.0
}

/// First match wins; individual needs beat the average, the average beats
/// the affection-driven moods.
pub fn mood_for(g: &Gauges, can_play: bool) -> Mood {
    if g.bladder < LOW_NEED {
        return Mood::NeedsWalk;
    }
    if g.hunger < LOW_NEED {
        return Mood::Hungry;
    }
    if g.thirst < LOW_NEED {
        return Mood::Thirsty;
    }
    if g.affection < LOW_NEED {
        return Mood::Sad;
    }

    let avg = average(g);
    if avg < 30.0 {
        return Mood::Tired;
    }
    if avg < 50.0 {
        return Mood::Neutral;
    }
    if can_play && g.affection > 60.0 {
        return Mood::Playful;
    }
    if g.affection > 80.0 {
        return Mood::Loving;
    }
    Mood::Happy
}

impl Pet {
    pub fn mood(&self, now: DateTime<Utc>) -> Mood {
        mood_for(&self.gauges(), self.can_play_mini_game(now))
    }

    pub fn happiness(&self) -> f64 {
        average(&self.gauges())
    }

    /// Day 1 is the adoption day.
    pub fn days_since_creation(&self, now: DateTime<Utc>) -> i64 {
        let days = (now - self.created_at).num_days();
        (days + 1).max(1)
    }

    pub fn xp_for_next_level(&self) -> u32 {
        xp_for_next_level(self.level)
    }

    pub fn level_progress(&self) -> f64 {
        f64::from(self.xp) / f64::from(self.xp_for_next_level())
    }

    /// Plays counted against today's cap.
    pub fn mini_games_today(&self, now: DateTime<Utc>) -> u32 {
        match self.last_mini_game_at {
            Some(last) if same_local_day(last, now) => self.mini_games_today,
            _ => 0,
        }
    }

    pub fn can_play_mini_game(&self, now: DateTime<Utc>) -> bool {
        self.mini_games_today(now) < MAX_DAILY_MINI_GAMES
    }

    pub fn can_evolve(&self) -> bool {
        self.stage
            .next()
            .is_some_and(|next| self.level >= next.required_level())
    }
}
