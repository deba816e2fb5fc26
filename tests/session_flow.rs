use chrono::{Duration, Utc};
use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration as StdDuration, Instant};
use termipet::{
    ActionKind, Activity, EvolutionStage, GameState, ManualClock, MemoryStore, Mood, Outcome,
    Rejection, Rules, SaveStore, Session, SessionEvent, Species, StorageError,
};

fn fresh() -> (Session<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc::now());
    let session = Session::new(store.clone(), clock.clone(), Rules::default());
    (session, store, clock)
}

fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    rx.try_iter().collect()
}

struct BrokenStore;

impl SaveStore for BrokenStore {
    fn load(&self) -> Result<Option<GameState>, StorageError> {
        Ok(None)
    }

    fn save(&mut self, _state: &GameState) -> Result<(), StorageError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only disk").into())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only disk").into())
    }
}

#[test]
fn empty_store_loads_a_blank_game() {
    let (mut s, store, _) = fresh();
    let report = s.load_game();
    assert!(s.pet().is_none());
    assert!(!s.state().onboarding_complete);
    assert!(!report.has_anything());
    assert!(store.is_empty());
}

#[test]
fn reload_without_time_passing_changes_nothing() {
    let (mut s, store, clock) = fresh();
    s.create_pet(Species::Dog, "Rex");
    let before = s.pet().cloned();

    let mut again = Session::new(store.clone(), clock.clone(), Rules::default());
    let report = again.load_game();
    assert_eq!(report.elapsed_secs, 0.0);
    assert_eq!(again.pet().cloned(), before);
}

#[test]
fn reload_applies_offline_decay_once() {
    let (mut s, store, clock) = fresh();
    s.create_pet(Species::Pig, "Truffle");

    clock.advance(Duration::seconds(1000));
    let mut later = Session::new(store.clone(), clock.clone(), Rules::default());
    let report = later.load_game();

    // Baby pig: 0.05 * 1.3 per second.
    assert!((report.hunger_lost - 65.0).abs() < 1e-6);
    assert!((later.pet().unwrap().hunger - 15.0).abs() < 1e-6);
    assert!((report.affection_lost - 32.5).abs() < 1e-6);

    // The caught-up state was written back, so loading again at the same
    // instant decays nothing.
    let second = later.load_game();
    assert_eq!(second.elapsed_secs, 0.0);
    assert!(!second.has_anything());
    assert!((later.pet().unwrap().hunger - 15.0).abs() < 1e-6);
    let mut third = Session::new(store, clock, Rules::default());
    third.load_game();
    assert!((third.pet().unwrap().hunger - 15.0).abs() < 1e-6);
}

#[test]
fn corrupt_save_starts_over() {
    let (mut s, store, _) = fresh();
    store.set_raw(b"{ not json".to_vec());
    s.load_game();
    assert!(s.pet().is_none());
    assert!(!s.state().onboarding_complete);
}

#[test]
fn future_version_is_not_loaded() {
    let (mut s, store, _) = fresh();
    s.create_pet(Species::Frog, "Ribbit");
    let raw = String::from_utf8(store.raw().unwrap()).unwrap();
    store.set_raw(raw.replacen("\"version\": 1", "\"version\": 99", 1));

    s.load_game();
    assert!(s.pet().is_none());
}

#[test]
fn reset_wipes_the_slot() {
    let (mut s, store, clock) = fresh();
    s.create_pet(Species::Dog, "Rex");
    s.perform(ActionKind::Feed);
    assert!(!store.is_empty());

    let t0 = Instant::now();
    s.start(t0);
    s.reset_game(t0);
    assert!(store.is_empty());
    assert!(s.pet().is_none());
    assert_eq!(s.state().counters.total_actions, 0);
    assert!(s.is_running());

    let mut after = Session::new(store, clock, Rules::default());
    after.load_game();
    assert!(after.pet().is_none());
}

#[test]
fn write_failures_are_swallowed() {
    let clock = ManualClock::new(Utc::now());
    let mut s = Session::new(BrokenStore, clock, Rules::default());
    s.load_game();
    s.create_pet(Species::Pig, "Truffle");
    assert!(!s.save_game());

    let out = s.perform(ActionKind::Feed);
    assert!(out.is_applied());
    assert_eq!(s.state().counters.feed, 1);

    s.reset_game(Instant::now());
    assert!(s.pet().is_none());
}

#[test]
fn pump_runs_due_ticks_and_autosave() {
    let (mut s, store, _) = fresh();
    s.create_pet(Species::Pig, "Truffle");
    store.set_raw(Vec::new());

    let t0 = Instant::now();
    s.start(t0);
    assert_eq!(s.pump(t0 + StdDuration::from_millis(500)), 0);
    assert_eq!(s.pump(t0 + StdDuration::from_secs(5)), 5);
    let hunger = s.pet().unwrap().hunger;
    assert!((hunger - (80.0 - 5.0 * 0.065)).abs() < 1e-9);
    assert_eq!(store.raw(), Some(Vec::new()));

    s.pump(t0 + StdDuration::from_secs(30));
    assert_ne!(store.raw(), Some(Vec::new()));

    s.stop();
    assert_eq!(s.pump(t0 + StdDuration::from_secs(60)), 0);
}

#[test]
fn pump_without_pet_does_nothing() {
    let (mut s, _, _) = fresh();
    let rx = s.subscribe();
    let t0 = Instant::now();
    s.start(t0);
    assert_eq!(s.pump(t0 + StdDuration::from_secs(3)), 0);
    assert!(!drain(&rx).contains(&SessionEvent::Decayed));
}

#[test]
fn subscribers_hear_what_happens() {
    let (mut s, _, _) = fresh();
    let rx = s.subscribe();
    s.load_game();
    s.create_pet(Species::Dog, "Rex");
    s.perform(ActionKind::Pet);
    s.perform(ActionKind::Walk);
    s.abandon_activity();

    let events = drain(&rx);
    assert!(matches!(events[0], SessionEvent::Loaded { had_pet: false, .. }));
    assert!(events.contains(&SessionEvent::PetCreated {
        name: "Rex".to_string(),
        species: Species::Dog
    }));
    assert!(events.contains(&SessionEvent::ActionApplied {
        kind: ActionKind::Pet,
        xp: 8
    }));
    assert!(events.contains(&SessionEvent::WalkRequested));
    assert!(events.contains(&SessionEvent::ActivityAbandoned));
}

#[test]
fn dropped_receivers_are_pruned() {
    let (mut s, _, _) = fresh();
    let keep = s.subscribe();
    drop(s.subscribe());
    s.create_pet(Species::Frog, "Ribbit");
    assert!(!drain(&keep).is_empty());
}

#[test]
fn three_games_a_day() {
    let (mut s, _, clock) = fresh();
    s.create_pet(Species::Pig, "Truffle");
    for _ in 0..3 {
        assert_eq!(s.perform(ActionKind::Play), Outcome::MiniGameRequested);
        assert!(s.complete_mini_game(30).unwrap().is_applied());
    }
    assert_eq!(
        s.perform(ActionKind::Play),
        Outcome::Rejected(Rejection::DailyLimitReached)
    );
    assert_eq!(s.pending(), None);
    assert_eq!(s.status(), Rejection::DailyLimitReached.message());

    clock.advance(Duration::days(2));
    assert_eq!(s.perform(ActionKind::Play), Outcome::MiniGameRequested);
    assert_eq!(s.pending(), Some(Activity::MiniGame));
}

#[test]
fn big_score_raises_level_and_evolves() {
    let (mut s, _, _) = fresh();
    let rx = s.subscribe();
    s.create_pet(Species::Dog, "Rex");
    s.perform(ActionKind::Play);
    s.complete_mini_game(10_000);

    let pet = s.pet().unwrap();
    assert!(pet.level >= 5);
    assert_eq!(pet.stage, EvolutionStage::Child);
    assert_eq!(pet.high_score, 10_000);

    let signals = s.take_signals();
    assert!(signals.show_level_up);
    assert!(signals.show_evolution);

    let events = drain(&rx);
    assert!(events.contains(&SessionEvent::LeveledUp { level: 2 }));
    assert!(events.contains(&SessionEvent::Evolved {
        stage: EvolutionStage::Child
    }));
}

#[test]
fn actions_without_a_pet_are_no_ops() {
    let (mut s, store, _) = fresh();
    for kind in ActionKind::ALL {
        assert_eq!(s.perform(kind), Outcome::NoPet);
    }
    assert_eq!(s.state().counters.total_actions, 0);
    assert!(store.is_empty());
    assert_eq!(s.mood(), None);
}

#[test]
fn neglect_shows_in_the_mood() {
    let (mut s, store, clock) = fresh();
    s.create_pet(Species::Pig, "Truffle");
    assert_eq!(s.mood(), Some(Mood::Playful));

    clock.advance(Duration::hours(2));
    let mut later = Session::new(store, clock, Rules::default());
    later.load_game();
    assert_eq!(later.mood(), Some(Mood::NeedsWalk));
    assert_eq!(later.status(), Mood::NeedsWalk.status_message());
}
