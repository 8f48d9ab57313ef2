//! # Matchpad
//!
//! A concurrent memory-match game engine for a 16-button RGB pad.
//!
//! ## Design Principles
//!
//! - **Single-Consumer**: One game thread owns the hardware and drains the queue
//! - **Events In, Effects Out**: Button events go in, LED and audio effects come out
//! - **Trait Boundaries**: Pad and speaker are traits, so tests run on in-memory fakes
//! - **Reproducible**: A seeded RNG replays the same pairing sequence every run
//!
//! ## Architecture
//!
//! ```text
//! [Driver Threads] --> [Event Queue (MPSC)] --> [Game Thread]
//!                                                    |
//!                                            [LEDs + Speaker]
//! ```

pub mod color;
pub mod config;
pub mod event;
pub mod game;
pub mod hardware;
pub mod matching;
pub mod pairing;
pub mod queue;
pub mod sim;

// Re-exports for convenience
pub use color::{Color, PAIR_COLORS};
pub use config::{ConfigError, GameConfig};
pub use event::{PadEvent, Slot, SLOT_COUNT};
pub use game::{Game, GameError};
pub use hardware::{ButtonPad, HardwareError, PadCallbacks, Speaker};
pub use matching::{
    sweep_color, MatchEngine, StepOutcome, CORRECT_SOUND, END_OF_GAME_SOUND, INCORRECT_SOUND,
    START_SOUND,
};
pub use pairing::{Pair, PairIndex, Pairing, PairingError, PAIR_COUNT, PAIR_SOUNDS};
pub use queue::{event_queue, EventReceiver, EventSender};
pub use sim::{PadHandle, SimPad, SimSpeaker, SpeakerHandle};
