//! Match Engine - Core memory-game press handling.
//!
//! Implements the select/resolve algorithm:
//! 1. SELECT: Light and sound the pressed slot, then buffer it
//! 2. RESOLVE: With two buffered slots, judge match/mismatch and react
//!
//! The engine owns the pad and speaker for the duration of a session;
//! every transition drives hardware effects before touching game state,
//! so the player always gets feedback for the press itself.

use std::thread;
use std::time::Duration;

use arrayvec::ArrayVec;
use tracing::{debug, info, warn};

use crate::color::{Color, PAIR_COLORS};
use crate::config::GameConfig;
use crate::event::Slot;
use crate::hardware::{ButtonPad, HardwareError, Speaker};
use crate::pairing::{Pair, PairIndex, Pairing, PAIR_COUNT};

/// Clip played when two selected slots hold the same pair.
pub const CORRECT_SOUND: &str = "correct_answer";
/// Clip played when two selected slots hold different pairs.
pub const INCORRECT_SOUND: &str = "incorrect";
/// Clip played after the winning sweep.
pub const END_OF_GAME_SOUND: &str = "end_of_game";
/// Clip played at session start and on a hold-1 board reset.
pub const START_SOUND: &str = "boxing_bell";

// ============================================================================
// Game state
// ============================================================================

/// Mutable state of one round: the hidden pairing plus selection progress.
#[derive(Debug)]
pub struct GameState {
    /// The hidden slot-to-pair assignment for this round.
    pub pairing: Pairing,
    /// Slots selected so far, at most two.
    selection: ArrayVec<(Slot, PairIndex), 2>,
    /// Pairs matched so far.
    matches: u8,
    /// Whether the round has been won.
    over: bool,
}

impl GameState {
    pub fn new(pairing: Pairing) -> Self {
        Self {
            pairing,
            selection: ArrayVec::new(),
            matches: 0,
            over: false,
        }
    }
}

/// What a selection of two resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Same physical slot twice; drop it without judging.
    SelfPress,
    /// Two slots of one pair.
    Match,
    /// Two slots of different pairs.
    Mismatch,
}

/// Judge a completed selection. Pure; effects are the caller's job.
fn resolve(first: (Slot, PairIndex), second: (Slot, PairIndex)) -> Resolution {
    if first.0 == second.0 {
        Resolution::SelfPress
    } else if first.1 == second.1 {
        Resolution::Match
    } else {
        Resolution::Mismatch
    }
}

/// Result of feeding one press to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Press dropped: round already over, or slot outside the pairing.
    Ignored,
    /// Press buffered as the first slot of a selection.
    Selected,
    /// Second press landed on the same slot; selection rolled back.
    SelfDiscarded,
    /// Selection held one pair; it stays lit.
    Matched,
    /// Selection held two pairs; both slots went dark.
    Mismatched,
    /// The match that just resolved was the eighth; the round is won.
    Completed,
}

// ============================================================================
// Engine
// ============================================================================

/// The match engine core.
///
/// Generic over the pad and speaker so tests and the terminal demo can
/// run against the in-memory hardware in [`crate::sim`].
pub struct MatchEngine<P: ButtonPad, S: Speaker> {
    pad: P,
    speaker: S,
    state: GameState,
    mismatch_delay: Duration,
    sweep_step: Duration,
}

impl<P: ButtonPad, S: Speaker> MatchEngine<P, S> {
    /// Create an engine over the given hardware and pairing.
    pub fn new(pad: P, speaker: S, pairing: Pairing, config: &GameConfig) -> Self {
        Self {
            pad,
            speaker,
            state: GameState::new(pairing),
            mismatch_delay: config.mismatch_delay(),
            sweep_step: config.sweep_step(),
        }
    }

    /// Announce a fresh round: dark board, start cue.
    pub fn begin(&mut self) -> Result<(), HardwareError> {
        self.pad.clear_all()?;
        self.speaker.play(START_SOUND, true)
    }

    /// Process one button press.
    ///
    /// # Algorithm
    /// 1. Drop the press if the round is over or the slot is unknown
    /// 2. Reveal: light the slot in its pair color, play its pair sound
    /// 3. Buffer the slot; with two buffered, resolve the selection
    ///
    /// Reveal happens before buffering, so even a slot that cannot
    /// advance the round (already matched, say) still lights and sounds.
    pub fn handle_press(&mut self, slot: Slot) -> Result<StepOutcome, HardwareError> {
        if self.state.over {
            return Ok(StepOutcome::Ignored);
        }
        let Some(pair) = self.state.pairing.pair_of(slot) else {
            warn!(%slot, "press on a slot outside the pairing");
            return Ok(StepOutcome::Ignored);
        };
        let (index, color, sound) = (pair.index, pair.color(), pair.sound());

        // Phase 1: REVEAL (always, before any judgement)
        self.pad.set_led(slot, color)?;
        self.speaker.play(sound, true)?;

        // Phase 2: SELECT
        self.state.selection.push((slot, index));
        if !self.state.selection.is_full() {
            return Ok(StepOutcome::Selected);
        }
        self.resolve_selection()
    }

    /// Judge a full selection buffer and apply the consequences.
    fn resolve_selection(&mut self) -> Result<StepOutcome, HardwareError> {
        let second = self.state.selection.pop().unwrap();
        let first = self.state.selection.pop().unwrap();

        match resolve(first, second) {
            Resolution::SelfPress => {
                debug!(slot = %first.0, "same slot pressed twice, selection reset");
                Ok(StepOutcome::SelfDiscarded)
            }
            Resolution::Match => {
                self.speaker.play(CORRECT_SOUND, true)?;
                self.state.matches += 1;
                info!(
                    pair = first.1,
                    matched = self.state.matches,
                    total = PAIR_COUNT,
                    "pair matched"
                );
                if self.state.matches as usize == PAIR_COUNT {
                    self.finish_game()?;
                    return Ok(StepOutcome::Completed);
                }
                Ok(StepOutcome::Matched)
            }
            Resolution::Mismatch => {
                self.speaker.play(INCORRECT_SOUND, true)?;
                thread::sleep(self.mismatch_delay);
                self.pad.set_led(first.0, Color::OFF)?;
                self.pad.set_led(second.0, Color::OFF)?;
                debug!(first = %first.0, second = %second.0, "mismatch, slots went dark");
                Ok(StepOutcome::Mismatched)
            }
        }
    }

    /// Winning celebration: sweep the board, play the end cue, lock up.
    fn finish_game(&mut self) -> Result<(), HardwareError> {
        for (i, slot) in Slot::all().enumerate() {
            self.pad.set_led(slot, sweep_color(i))?;
            thread::sleep(self.sweep_step);
        }
        self.speaker.play(END_OF_GAME_SOUND, true)?;
        self.state.over = true;
        info!("all pairs matched, round over");
        Ok(())
    }

    /// Process a long-press command.
    ///
    /// Slot 1 resets the board to dark and replays the start cue; slot 2
    /// replays every pair (both LEDs plus the pair sound) in pair order.
    /// Holds on any other slot do nothing.
    pub fn handle_hold(&mut self, slot: Slot) -> Result<(), HardwareError> {
        match slot.get() {
            1 => {
                self.pad.clear_all()?;
                self.speaker.play(START_SOUND, true)?;
                info!("board reset by hold");
            }
            2 => {
                let pairs: [Pair; PAIR_COUNT] = *self.state.pairing.pairs();
                for pair in pairs {
                    self.pad.set_led(pair.low, pair.color())?;
                    self.pad.set_led(pair.high, pair.color())?;
                    self.speaker.play(pair.sound(), true)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Pairs matched so far.
    #[inline]
    pub fn match_count(&self) -> u8 {
        self.state.matches
    }

    /// Whether the round has been won.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.state.over
    }

    /// The hidden pairing of this round.
    #[inline]
    pub fn pairing(&self) -> &Pairing {
        &self.state.pairing
    }

    /// Tear the engine apart, handing the hardware back.
    pub fn into_hardware(self) -> (P, S) {
        (self.pad, self.speaker)
    }
}

/// Color of position `i` in the winning sweep: the pair palette, cycled.
#[inline]
pub fn sweep_color(i: usize) -> Color {
    PAIR_COLORS[i % PAIR_COUNT]
}
