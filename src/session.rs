//! The session controller: sole owner of the game state.
//!
//! Everything that mutates the pet goes through `&mut Session`, so a decay
//! tick, an action and an autosave can never interleave. The owner's loop
//! calls [`Session::pump`] to run whatever periodic work is due.

use crate::actions::Outcome;
use crate::clock::Clock;
use crate::decay::{catch_up, CatchupReport};
use crate::events::{Animation, SessionEvent, Signals, Subscribers};
use crate::model::{ActionKind, Counters, GameState, Mood, Pet, Rules, Species};
use crate::progression::Progress;
use crate::scheduler::RepeatingTask;
use crate::storage::SaveStore;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const NAME_MAX: usize = 18;

/// A two-phase action waiting for its completion call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Walk,
    MiniGame,
}

/// Read-only view handed to the UI.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub pet: Option<Pet>,
    pub mood: Option<Mood>,
    pub status: String,
    pub onboarding_complete: bool,
    pub counters: Counters,
    pub signals: Signals,
    pub pending: Option<Activity>,
}

pub struct Session<S: SaveStore, C: Clock> {
    state: GameState,
    store: S,
    clock: C,
    rules: Rules,
    decay: RepeatingTask,
    autosave: RepeatingTask,
    pending: Option<Activity>,
    status: String,
    signals: Signals,
    subscribers: Subscribers,
}

fn clean_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(NAME_MAX).collect())
}

impl<S: SaveStore, C: Clock> Session<S, C> {
    /// Starts with an empty game; call [`Session::load_game`] to resume.
    pub fn new(store: S, clock: C, rules: Rules) -> Self {
        let rules = rules.sanitized();
        let state = GameState::empty(clock.now());
        Self {
            state,
            store,
            clock,
            decay: RepeatingTask::new("decay", rules.decay_period()),
            autosave: RepeatingTask::new("autosave", rules.autosave_period()),
            rules,
            pending: None,
            status: String::new(),
            signals: Signals::default(),
            subscribers: Subscribers::default(),
        }
    }

    // ---- lifecycle -------------------------------------------------------

    pub fn start(&mut self, now: Instant) {
        for task in [&mut self.decay, &mut self.autosave] {
            task.start(now);
            debug!(
                task = task.label(),
                period_ms = task.period().as_millis() as u64,
                "timer started"
            );
        }
    }

    pub fn stop(&mut self) {
        self.decay.stop();
        self.autosave.stop();
    }

    pub fn is_running(&self) -> bool {
        self.decay.is_running() || self.autosave.is_running()
    }

    /// Stops the timers, drops any unfinished walk or game, and saves.
    pub fn teardown(&mut self) {
        self.stop();
        if let Some(activity) = self.pending.take() {
            info!(?activity, "activity abandoned at shutdown");
        }
        self.save_game();
    }

    /// Runs every decay tick that is due, then the autosave if due.
    /// Returns the number of decay ticks applied.
    pub fn pump(&mut self, now: Instant) -> u32 {
        let mut ticks = 0u32;
        while self.decay.poll(now) {
            if self.state.tick_decay(&self.rules) {
                ticks = ticks.saturating_add(1);
            }
        }
        if ticks > 0 {
            if let Some(pet) = &self.state.pet {
                debug!(
                    ticks,
                    hunger = pet.hunger,
                    thirst = pet.thirst,
                    affection = pet.affection,
                    bladder = pet.bladder,
                    "decayed"
                );
            }
            self.subscribers.emit(SessionEvent::Decayed);
        }

        let mut autosave_due = false;
        while self.autosave.poll(now) {
            autosave_due = true;
        }
        if autosave_due {
            self.save_game();
        }
        ticks
    }

    // ---- persistence -----------------------------------------------------

    /// Replaces the in-memory game with the saved one, applies the decay for
    /// the time the game was closed and writes the result back. Unreadable
    /// saves start a new game.
    pub fn load_game(&mut self) -> CatchupReport {
        let now = self.clock.now();
        let loaded = match self.store.load() {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                info!("no saved game, starting fresh");
                None
            }
            Err(e) => {
                warn!(error = %e, "saved game unreadable, starting fresh");
                None
            }
        };
        let resumed = loaded.is_some();
        self.state = loaded.unwrap_or_else(|| GameState::empty(now));
        self.pending = None;
        self.signals = Signals::default();

        let report = catch_up(&mut self.state, now, &self.rules);
        // Decay is now accounted for up to `now`.
        self.state.last_saved_at = now;
        info!(
            had_pet = self.state.pet.is_some(),
            elapsed_secs = report.elapsed_secs,
            hunger_lost = report.hunger_lost,
            "game loaded"
        );

        if self.state.roll_over_day(now) {
            debug!("daily mini-game counter reset");
        }
        self.refresh_status();
        self.subscribers.emit(SessionEvent::Loaded {
            had_pet: self.state.pet.is_some(),
            elapsed_secs: report.elapsed_secs,
        });
        // Persist the caught-up state so a later load can't decay it again.
        if resumed {
            self.save_game();
        }
        report
    }

    /// Writes the current game. Failures are logged and otherwise ignored;
    /// the next autosave will try again.
    pub fn save_game(&mut self) -> bool {
        let now = self.clock.now();
        self.state.last_saved_at = now;
        match self.store.save(&self.state) {
            Ok(()) => {
                debug!(at = %now, "game saved");
                self.subscribers.emit(SessionEvent::Saved { at: now });
                true
            }
            Err(e) => {
                warn!(error = %e, "could not save game");
                false
            }
        }
    }

    /// Back to the first-run state, including the save slot.
    pub fn reset_game(&mut self, now: Instant) {
        let was_running = self.is_running();
        self.stop();

        self.state = GameState::empty(self.clock.now());
        self.pending = None;
        self.signals = Signals::default();
        self.status.clear();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not clear saved game");
        }
        info!("game reset");
        self.subscribers.emit(SessionEvent::Reset);

        if was_running {
            self.start(now);
        }
    }

    // ---- pet management --------------------------------------------------

    /// A blank name falls back to the species name.
    pub fn create_pet(&mut self, species: Species, name: &str) {
        let now = self.clock.now();
        let name = clean_name(name).unwrap_or_else(|| species.display_name().to_string());
        if self.state.pet.is_some() {
            info!("replacing existing pet");
        }

        self.state.pet = Some(Pet::new(name.clone(), species, now));
        self.state.onboarding_complete = true;
        self.pending = None;
        self.signals.animation = Animation::Celebrate;
        self.status = format!("Welcome {name}! 🎉");
        info!(%name, ?species, "pet adopted");
        self.subscribers
            .emit(SessionEvent::PetCreated { name, species });
        self.save_game();
    }

    /// Returns false when there is no pet or the name is blank.
    pub fn rename_pet(&mut self, name: &str) -> bool {
        let Some(name) = clean_name(name) else {
            return false;
        };
        let Some(pet) = self.state.pet.as_mut() else {
            return false;
        };
        pet.name = name.clone();
        self.status = format!("Your pet is now called {name}!");
        info!(%name, "pet renamed");
        self.subscribers.emit(SessionEvent::PetRenamed { name });
        self.save_game();
        true
    }

    // ---- actions ---------------------------------------------------------

    pub fn perform(&mut self, kind: ActionKind) -> Outcome {
        let now = self.clock.now();
        let outcome = self.state.perform(kind, now);
        match &outcome {
            Outcome::Applied(_) => self.after_applied(&outcome),
            Outcome::WalkRequested => {
                self.pending = Some(Activity::Walk);
                self.signals.show_walk = true;
                self.subscribers.emit(SessionEvent::WalkRequested);
            }
            Outcome::MiniGameRequested => {
                self.pending = Some(Activity::MiniGame);
                self.signals.show_mini_game = true;
                self.signals.animation = Animation::Playing;
                self.subscribers.emit(SessionEvent::MiniGameRequested);
            }
            Outcome::Rejected(r) => {
                self.status = r.message().to_string();
                self.signals.animation = Animation::Sad;
                self.subscribers.emit(SessionEvent::PlayRejected);
            }
            Outcome::NoPet => debug!(?kind, "action ignored, no pet"),
        }
        outcome
    }

    /// `None` when no walk was started.
    pub fn complete_walk(&mut self, duration_secs: f64, relief_count: u32) -> Option<Outcome> {
        if self.pending != Some(Activity::Walk) {
            warn!("walk completed without a walk in progress; ignored");
            return None;
        }
        self.pending = None;
        self.signals.show_walk = false;

        let outcome = self
            .state
            .complete_walk(duration_secs, relief_count, self.clock.now());
        self.after_applied(&outcome);
        Some(outcome)
    }

    /// `None` when no mini-game was started.
    pub fn complete_mini_game(&mut self, score: u32) -> Option<Outcome> {
        if self.pending != Some(Activity::MiniGame) {
            warn!("mini-game completed without a game in progress; ignored");
            return None;
        }
        self.pending = None;
        self.signals.show_mini_game = false;

        let outcome = self.state.complete_mini_game(score, self.clock.now());
        self.after_applied(&outcome);
        Some(outcome)
    }

    /// Cancels the pending walk or mini-game without touching the pet.
    pub fn abandon_activity(&mut self) -> bool {
        let Some(activity) = self.pending.take() else {
            return false;
        };
        self.signals.show_walk = false;
        self.signals.show_mini_game = false;
        info!(?activity, "activity abandoned");
        self.subscribers.emit(SessionEvent::ActivityAbandoned);
        true
    }

    fn after_applied(&mut self, outcome: &Outcome) {
        let Outcome::Applied(applied) = outcome else {
            return;
        };
        self.status = applied.message.clone();
        self.signals.animation = applied.animation;
        info!(kind = ?applied.kind, xp = applied.xp_awarded, "action applied");
        self.subscribers.emit(SessionEvent::ActionApplied {
            kind: applied.kind,
            xp: applied.xp_awarded,
        });

        for progress in &applied.progress {
            match *progress {
                Progress::LevelUp { level } => {
                    self.signals.show_level_up = true;
                    self.status = format!("Level {level} reached! 🎉");
                    info!(level, "level up");
                    self.subscribers.emit(SessionEvent::LeveledUp { level });
                }
                Progress::Evolved { stage } => {
                    let name = self
                        .state
                        .pet
                        .as_ref()
                        .map(|p| p.name.as_str())
                        .unwrap_or_default();
                    self.signals.show_evolution = true;
                    self.signals.animation = Animation::Evolving;
                    self.status = format!("{name} evolved into {}! {}", stage.label(), stage.emoji());
                    info!(stage = stage.label(), "evolved");
                    self.subscribers.emit(SessionEvent::Evolved { stage });
                }
            }
        }
        self.save_game();
    }

    // ---- read side -------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn pet(&self) -> Option<&Pet> {
        self.state.pet.as_ref()
    }

    pub fn mood(&self) -> Option<Mood> {
        let now = self.clock.now();
        self.state.pet.as_ref().map(|p| p.mood(now))
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn pending(&self) -> Option<Activity> {
        self.pending
    }

    pub fn signals(&self) -> Signals {
        self.signals
    }

    /// Returns the current signals and clears them back to idle.
    pub fn take_signals(&mut self) -> Signals {
        std::mem::take(&mut self.signals)
    }

    /// Replaces the status line with the mood message.
    pub fn refresh_status(&mut self) {
        self.status = self
            .mood()
            .map(|m| m.status_message().to_string())
            .unwrap_or_default();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            pet: self.state.pet.clone(),
            mood: self.mood(),
            status: self.status.clone(),
            onboarding_complete: self.state.onboarding_complete,
            counters: self.state.counters,
            signals: self.signals,
            pending: self.pending,
        }
    }

    /// The receiver buffers a bounded number of events; drain it regularly.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.subscribers.subscribe()
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
