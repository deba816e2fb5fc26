//! Virtual pet simulation core.
//!
//! A [`Session`] owns one [`GameState`]: it decays the pet's needs on a
//! fixed tick, applies player actions, turns XP into levels and evolution
//! stages, and keeps a save slot up to date through an injected
//! [`SaveStore`]. Rendering and input live outside this crate's library.

pub mod actions;
pub mod clock;
pub mod config;
pub mod decay;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod progression;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;

pub use actions::{Applied, Outcome, Rejection};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decay::CatchupReport;
pub use error::StorageError;
pub use events::{Animation, SessionEvent, Signals};
pub use model::{ActionKind, Counters, EvolutionStage, GameState, Mood, Pet, Rules, Species};
pub use progression::Progress;
pub use session::{Activity, Session, SessionSnapshot};
pub use storage::{JsonFileStore, MemoryStore, SaveStore};
