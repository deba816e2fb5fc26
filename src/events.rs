//! What the session publishes to its UI.
//!
//! Two channels exist side by side: [`SessionEvent`]s are pushed to every
//! subscriber as they happen, while [`Signals`] are sticky flags that the UI
//! reads from a snapshot and clears with `take_signals`.

use crate::model::{ActionKind, EvolutionStage, Species};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

/// Which animation the avatar should play. Reverting to idle is up to the UI.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Animation {
    #[default]
    Idle,
    Eating,
    Drinking,
    Loved,
    Sad,
    Celebrate,
    Walking,
    Playing,
    Evolving,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Signals {
    pub show_walk: bool,
    pub show_mini_game: bool,
    pub show_level_up: bool,
    pub show_evolution: bool,
    pub animation: Animation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Loaded { had_pet: bool, elapsed_secs: f64 },
    PetCreated { name: String, species: Species },
    PetRenamed { name: String },
    ActionApplied { kind: ActionKind, xp: u32 },
    WalkRequested,
    MiniGameRequested,
    PlayRejected,
    ActivityAbandoned,
    LeveledUp { level: u32 },
    Evolved { stage: EvolutionStage },
    Decayed,
    Saved { at: DateTime<Utc> },
    Reset,
}

/// Events buffered per subscriber before new ones are dropped for it.
pub const EVENT_BUFFER: usize = 256;

/// Fan-out list of event receivers. Hung-up receivers are pruned on send.
///
/// Each receiver holds at most [`EVENT_BUFFER`] undelivered events; a
/// subscriber that stops draining misses later events instead of growing
/// without bound.
#[derive(Default)]
pub struct Subscribers {
    senders: Vec<SyncSender<SessionEvent>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = sync_channel(EVENT_BUFFER);
        self.senders.push(tx);
        rx
    }

    pub fn emit(&mut self, event: SessionEvent) {
        self.senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }
}
