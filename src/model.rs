use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SAVE_VERSION: u32 = 1;

pub const GAUGE_MIN: f64 = 0.0;
pub const GAUGE_MAX: f64 = 100.0;
pub const STARTING_GAUGE: f64 = 80.0;

/// Maximum number of mini-games per calendar day.
pub const MAX_DAILY_MINI_GAMES: u32 = 3;

pub(crate) fn clamp_gauge(v: f64) -> f64 {
    if v.is_nan() {
        return GAUGE_MIN;
    }
    v.clamp(GAUGE_MIN, GAUGE_MAX)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Pig,
    Dog,
    Frog,
}

impl Species {
    pub const ALL: [Species; 3] = [Species::Pig, Species::Dog, Species::Frog];

    pub fn display_name(self) -> &'static str {
        match self {
            Species::Pig => "Pig",
            Species::Dog => "Dog",
            Species::Frog => "Frog",
        }
    }

    pub fn mini_game_name(self) -> &'static str {
        match self {
            Species::Pig => "Truffle Hunt",
            Species::Dog => "Fetch",
            Species::Frog => "Mosquito Chase",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionStage {
    Baby,
    Child,
    Adult,
    Senior,
}

impl EvolutionStage {
    pub fn required_level(self) -> u32 {
        match self {
            EvolutionStage::Baby => 1,
            EvolutionStage::Child => 5,
            EvolutionStage::Adult => 15,
            EvolutionStage::Senior => 30,
        }
    }

    pub fn next(self) -> Option<EvolutionStage> {
        match self {
            EvolutionStage::Baby => Some(EvolutionStage::Child),
            EvolutionStage::Child => Some(EvolutionStage::Adult),
            EvolutionStage::Adult => Some(EvolutionStage::Senior),
            EvolutionStage::Senior => None,
        }
    }

    /// Young pets get hungry faster.
    pub fn decay_multiplier(self) -> f64 {
        match self {
            EvolutionStage::Baby => 1.3,
            EvolutionStage::Child => 1.1,
            EvolutionStage::Adult => 1.0,
            EvolutionStage::Senior => 0.8,
        }
    }

    /// Scales the gauge gain of feed / drink / pet.
    pub fn action_multiplier(self) -> f64 {
        match self {
            EvolutionStage::Baby => 0.8,
            EvolutionStage::Child => 0.9,
            EvolutionStage::Adult => 1.0,
            EvolutionStage::Senior => 1.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EvolutionStage::Baby => "baby",
            EvolutionStage::Child => "child",
            EvolutionStage::Adult => "adult",
            EvolutionStage::Senior => "senior",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            EvolutionStage::Baby => "🐣",
            EvolutionStage::Child => "🌱",
            EvolutionStage::Adult => "⭐",
            EvolutionStage::Senior => "👑",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    NeedsWalk,
    Hungry,
    Thirsty,
    Sad,
    Tired,
    Neutral,
    Playful,
    Loving,
    Happy,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::NeedsWalk => "needs walk",
            Mood::Hungry => "hungry",
            Mood::Thirsty => "thirsty",
            Mood::Sad => "sad",
            Mood::Tired => "tired",
            Mood::Neutral => "neutral",
            Mood::Playful => "playful",
            Mood::Loving => "loving",
            Mood::Happy => "happy",
        }
    }

    pub fn status_message(self) -> &'static str {
        match self {
            Mood::NeedsWalk => "I need to go outside! 🌳",
            Mood::Hungry => "I'm hungry! 🍎",
            Mood::Thirsty => "I'm thirsty! 💧",
            Mood::Sad => "I feel a little sad...",
            Mood::Tired => "I'm so tired... Zzz",
            Mood::Neutral => "All good.",
            Mood::Playful => "Wanna play? 🎮",
            Mood::Loving => "I love you! ❤️",
            Mood::Happy => "I'm so happy!",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Feed,
    Drink,
    Pet,
    Walk,
    Play,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Feed,
        ActionKind::Drink,
        ActionKind::Pet,
        ActionKind::Walk,
        ActionKind::Play,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ActionKind::Feed => "Feed",
            ActionKind::Drink => "Drink",
            ActionKind::Pet => "Cuddle",
            ActionKind::Walk => "Walk",
            ActionKind::Play => "Play",
        }
    }

    /// Base XP; walk and play add bonuses on completion.
    pub fn xp_reward(self) -> u32 {
        match self {
            ActionKind::Feed => 5,
            ActionKind::Drink => 5,
            ActionKind::Pet => 8,
            ActionKind::Walk => 15,
            ActionKind::Play => 20,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: Species,

    pub hunger: f64,
    pub thirst: f64,
    pub affection: f64,
    pub bladder: f64,

    pub created_at: DateTime<Utc>,
    pub last_interaction_at: DateTime<Utc>,

    pub xp: u32,
    pub level: u32,
    pub stage: EvolutionStage,

    pub last_mini_game_at: Option<DateTime<Utc>>,
    pub mini_games_today: u32,
    pub total_mini_games: u32,
    pub high_score: u32,

    pub total_walks: u32,
    pub last_walk_at: Option<DateTime<Utc>>,
}

impl Pet {
    pub fn new(name: impl Into<String>, species: Species, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            species,
            hunger: STARTING_GAUGE,
            thirst: STARTING_GAUGE,
            affection: STARTING_GAUGE,
            bladder: STARTING_GAUGE,
            created_at: now,
            last_interaction_at: now,
            xp: 0,
            level: 1,
            stage: EvolutionStage::Baby,
            last_mini_game_at: None,
            mini_games_today: 0,
            total_mini_games: 0,
            high_score: 0,
            total_walks: 0,
            last_walk_at: None,
        }
    }

    pub fn gauges(&self) -> Gauges {
        Gauges {
            hunger: self.hunger,
            thirst: self.thirst,
            affection: self.affection,
            bladder: self.bladder,
        }
    }
}

/// The four need values of a pet, copied out for pure computations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gauges {
    pub hunger: f64,
    pub thirst: f64,
    pub affection: f64,
    pub bladder: f64,
}

impl Gauges {
    pub fn uniform(v: f64) -> Self {
        Self {
            hunger: v,
            thirst: v,
            affection: v,
            bladder: v,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    pub total_actions: u32,
    pub feed: u32,
    pub drink: u32,
    pub pet: u32,
    pub walk: u32,
    pub play: u32,
}

impl Counters {
    pub(crate) fn record(&mut self, kind: ActionKind) {
        let slot = match kind {
            ActionKind::Feed => &mut self.feed,
            ActionKind::Drink => &mut self.drink,
            ActionKind::Pet => &mut self.pet,
            ActionKind::Walk => &mut self.walk,
            ActionKind::Play => &mut self.play,
        };
        *slot = slot.saturating_add(1);
        self.total_actions = self.total_actions.saturating_add(1);
    }

    pub fn for_kind(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Feed => self.feed,
            ActionKind::Drink => self.drink,
            ActionKind::Pet => self.pet,
            ActionKind::Walk => self.walk,
            ActionKind::Play => self.play,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameState {
    pub pet: Option<Pet>,
    pub onboarding_complete: bool,
    pub counters: Counters,
    pub last_saved_at: DateTime<Utc>,
}

impl GameState {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            pet: None,
            onboarding_complete: false,
            counters: Counters::default(),
            last_saved_at: now,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rules {
    pub base_decay_rate: f64, // gauge points per second at multiplier 1.0
    pub decay_tick_ms: u64,   // 1000ms typical
    pub autosave_secs: u64,   // 30s typical
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            base_decay_rate: 0.05,
            decay_tick_ms: 1000,
            autosave_secs: 30,
        }
    }
}

impl Rules {
    /// Replaces unusable values with their defaults.
    pub fn sanitized(self) -> Self {
        let d = Rules::default();
        Self {
            base_decay_rate: if self.base_decay_rate.is_finite() && self.base_decay_rate >= 0.0 {
                self.base_decay_rate
            } else {
                d.base_decay_rate
            },
            decay_tick_ms: if self.decay_tick_ms > 0 {
                self.decay_tick_ms
            } else {
                d.decay_tick_ms
            },
            autosave_secs: if self.autosave_secs > 0 {
                self.autosave_secs
            } else {
                d.autosave_secs
            },
        }
    }

    pub fn decay_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.decay_tick_ms)
    }

    pub fn autosave_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.autosave_secs)
    }
}

/// On-disk envelope around [`GameState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub state: GameState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_and_chain_to_senior() {
        let mut stage = EvolutionStage::Baby;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            assert!(next.required_level() > stage.required_level());
            stage = next;
            seen.push(stage);
        }
        assert_eq!(stage, EvolutionStage::Senior);
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn new_pet_starts_at_eighty() {
        let pet = Pet::new("Mochi", Species::Dog, Utc::now());
        assert_eq!(pet.gauges(), Gauges::uniform(80.0));
        assert_eq!(pet.level, 1);
        assert_eq!(pet.xp, 0);
        assert_eq!(pet.stage, EvolutionStage::Baby);
        assert!(pet.last_mini_game_at.is_none());
    }

    #[test]
    fn counters_track_kind_and_total() {
        let mut c = Counters::default();
        c.record(ActionKind::Feed);
        c.record(ActionKind::Feed);
        c.record(ActionKind::Walk);
        assert_eq!(c.for_kind(ActionKind::Feed), 2);
        assert_eq!(c.for_kind(ActionKind::Walk), 1);
        assert_eq!(c.total_actions, 3);
    }

    #[test]
    fn clamp_gauge_handles_nan_and_bounds() {
        assert_eq!(clamp_gauge(f64::NAN), 0.0);
        assert_eq!(clamp_gauge(-3.0), 0.0);
        assert_eq!(clamp_gauge(140.0), 100.0);
        assert_eq!(clamp_gauge(42.5), 42.5);
    }

    #[test]
    fn rules_sanitize_bad_values() {
        let r = Rules {
            base_decay_rate: f64::NAN,
            decay_tick_ms: 0,
            autosave_secs: 5,
        }
        .sanitized();
        assert_eq!(r.base_decay_rate, 0.05);
        assert_eq!(r.decay_tick_ms, 1000);
        assert_eq!(r.autosave_secs, 5);
    }

    #[test]
    fn save_file_json_round_trips() {
        let now = Utc::now();
        let mut state = GameState::empty(now);
        state.pet = Some(Pet::new("Mochi", Species::Frog, now));
        let json = serde_json::to_string(&SaveFile {
            version: SAVE_VERSION,
            state: state.clone(),
        })
        .unwrap();
        let back: SaveFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state, state);
    }
}
