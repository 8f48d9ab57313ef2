//! In-memory pad and speaker.
//!
//! Stand-ins for the physical drivers, used by the integration tests and
//! the terminal demo. [`SimPad`] keeps LED state behind a shared handle
//! so a UI or a test can watch it while the game thread owns the pad
//! itself; pressing through the handle dispatches the registered
//! callbacks exactly the way a driver's notifier thread would.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashSet;

use crate::color::Color;
use crate::event::{Slot, SLOT_COUNT};
use crate::hardware::{ButtonPad, HardwareError, PadCallbacks, Speaker};
use crate::matching::{CORRECT_SOUND, END_OF_GAME_SOUND, INCORRECT_SOUND, START_SOUND};
use crate::pairing::PAIR_SOUNDS;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Pad
// ============================================================================

#[derive(Debug)]
struct PadState {
    leds: [Color; SLOT_COUNT as usize],
    /// Every `set_led` call in order, for assertions on exact sequences.
    led_writes: Vec<(Slot, Color)>,
    cleaned: bool,
}

impl PadState {
    fn new() -> Self {
        Self {
            leds: [Color::OFF; SLOT_COUNT as usize],
            led_writes: Vec::new(),
            cleaned: false,
        }
    }
}

/// In-memory LED/button matrix.
///
/// Owned by the game thread during a session; observation and event
/// injection go through [`PadHandle`] clones.
pub struct SimPad {
    state: Arc<Mutex<PadState>>,
    callbacks: Arc<Mutex<Option<PadCallbacks>>>,
}

impl SimPad {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PadState::new())),
            callbacks: Arc::new(Mutex::new(None)),
        }
    }

    /// A shared view of this pad, cloneable across threads.
    pub fn handle(&self) -> PadHandle {
        PadHandle {
            state: Arc::clone(&self.state),
            callbacks: Arc::clone(&self.callbacks),
        }
    }
}

impl Default for SimPad {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonPad for SimPad {
    fn assign_button_events(&mut self, callbacks: PadCallbacks) {
        *lock(&self.callbacks) = Some(callbacks);
    }

    fn set_led(&mut self, slot: Slot, color: Color) -> Result<(), HardwareError> {
        let mut state = lock(&self.state);
        if state.cleaned {
            return Err(HardwareError::Device("pad used after cleanup".into()));
        }
        state.leds[slot.index()] = color;
        state.led_writes.push((slot, color));
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), HardwareError> {
        let mut state = lock(&self.state);
        if state.cleaned {
            return Err(HardwareError::Device("pad used after cleanup".into()));
        }
        state.leds = [Color::OFF; SLOT_COUNT as usize];
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), HardwareError> {
        let mut state = lock(&self.state);
        state.leds = [Color::OFF; SLOT_COUNT as usize];
        state.cleaned = true;
        Ok(())
    }
}

/// Shared view of a [`SimPad`]: reads LED state and injects button
/// events through the registered callbacks.
#[derive(Clone)]
pub struct PadHandle {
    state: Arc<Mutex<PadState>>,
    callbacks: Arc<Mutex<Option<PadCallbacks>>>,
}

impl PadHandle {
    /// Current color of one slot's LED.
    pub fn led(&self, slot: Slot) -> Color {
        lock(&self.state).leds[slot.index()]
    }

    /// Snapshot of all 16 LEDs in slot order.
    pub fn leds(&self) -> [Color; SLOT_COUNT as usize] {
        lock(&self.state).leds
    }

    /// Every `set_led` call so far, oldest first.
    pub fn led_writes(&self) -> Vec<(Slot, Color)> {
        lock(&self.state).led_writes.clone()
    }

    /// Forget recorded writes; LED state is untouched.
    pub fn clear_writes(&self) {
        lock(&self.state).led_writes.clear();
    }

    /// Whether `cleanup` has run.
    pub fn cleaned(&self) -> bool {
        lock(&self.state).cleaned
    }

    /// Dispatch a press notification, as a driver thread would.
    pub fn press(&self, slot: Slot) {
        if let Some(callbacks) = lock(&self.callbacks).as_ref() {
            (callbacks.on_press)(slot);
        }
    }

    /// Dispatch a hold notification.
    pub fn hold(&self, slot: Slot) {
        if let Some(callbacks) = lock(&self.callbacks).as_ref() {
            (callbacks.on_held)(slot);
        }
    }

    /// Dispatch a release notification.
    pub fn release(&self, slot: Slot) {
        if let Some(callbacks) = lock(&self.callbacks).as_ref() {
            (callbacks.on_released)(slot);
        }
    }
}

// ============================================================================
// Speaker
// ============================================================================

/// In-memory speaker with a preloaded clip bank.
///
/// Playing a name outside the bank fails the way the physical speaker
/// fails on a clip it never loaded.
pub struct SimSpeaker {
    bank: FxHashSet<String>,
    log: Arc<Mutex<Vec<(String, bool)>>>,
}

impl SimSpeaker {
    /// A speaker preloaded with every clip the engine can ask for.
    pub fn new() -> Self {
        let cues = [CORRECT_SOUND, INCORRECT_SOUND, END_OF_GAME_SOUND, START_SOUND];
        Self::with_clips(PAIR_SOUNDS.iter().chain(cues.iter()).copied())
    }

    /// A speaker preloaded with exactly the given clip names.
    pub fn with_clips<I>(clips: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            bank: clips.into_iter().map(Into::into).collect(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A speaker with nothing loaded; every `play` fails.
    pub fn empty() -> Self {
        Self::with_clips(std::iter::empty::<String>())
    }

    /// A shared view of the play log, cloneable across threads.
    pub fn handle(&self) -> SpeakerHandle {
        SpeakerHandle {
            log: Arc::clone(&self.log),
        }
    }
}

impl Default for SimSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Speaker for SimSpeaker {
    fn play(&mut self, sound: &str, wait_until_done: bool) -> Result<(), HardwareError> {
        if !self.bank.contains(sound) {
            return Err(HardwareError::UnknownSound(sound.to_string()));
        }
        lock(&self.log).push((sound.to_string(), wait_until_done));
        Ok(())
    }
}

/// Shared view of a [`SimSpeaker`]'s play log.
#[derive(Clone)]
pub struct SpeakerHandle {
    log: Arc<Mutex<Vec<(String, bool)>>>,
}

impl SpeakerHandle {
    /// Clip names played so far, oldest first.
    pub fn played(&self) -> Vec<String> {
        lock(&self.log).iter().map(|(name, _)| name.clone()).collect()
    }

    /// Full play log including the wait flag of each call.
    pub fn plays(&self) -> Vec<(String, bool)> {
        lock(&self.log).clone()
    }

    /// Number of clips played so far.
    pub fn count(&self) -> usize {
        lock(&self.log).len()
    }

    /// Forget the play log.
    pub fn clear(&self) {
        lock(&self.log).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn slot(n: u8) -> Slot {
        Slot::new(n).unwrap()
    }

    #[test]
    fn test_pad_records_led_writes() {
        let mut pad = SimPad::new();
        let handle = pad.handle();

        pad.set_led(slot(2), Color::RED).unwrap();
        pad.set_led(slot(2), Color::OFF).unwrap();

        assert_eq!(handle.led(slot(2)), Color::OFF);
        assert_eq!(
            handle.led_writes(),
            vec![(slot(2), Color::RED), (slot(2), Color::OFF)]
        );
    }

    #[test]
    fn test_pad_clear_all_turns_everything_off() {
        let mut pad = SimPad::new();
        let handle = pad.handle();
        pad.set_led(slot(1), Color::BLUE).unwrap();
        pad.set_led(slot(16), Color::GREEN).unwrap();

        pad.clear_all().unwrap();
        assert!(handle.leds().iter().all(|c| c.is_off()));
    }

    #[test]
    fn test_pad_rejects_use_after_cleanup() {
        let mut pad = SimPad::new();
        pad.cleanup().unwrap();
        assert!(pad.set_led(slot(1), Color::RED).is_err());
        assert!(pad.clear_all().is_err());
        assert!(pad.handle().cleaned());
    }

    #[test]
    fn test_handle_dispatches_registered_callbacks() {
        let mut pad = SimPad::new();
        let handle = pad.handle();

        let presses = Arc::new(AtomicUsize::new(0));
        let holds = Arc::new(AtomicUsize::new(0));
        let p = Arc::clone(&presses);
        let h = Arc::clone(&holds);
        pad.assign_button_events(PadCallbacks {
            on_press: Box::new(move |_| {
                p.fetch_add(1, Ordering::SeqCst);
            }),
            on_held: Box::new(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
            on_released: Box::new(|_| {}),
        });

        handle.press(slot(4));
        handle.press(slot(4));
        handle.hold(slot(1));
        handle.release(slot(4));

        assert_eq!(presses.load(Ordering::SeqCst), 2);
        assert_eq!(holds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_events_before_registration_are_lost() {
        let pad = SimPad::new();
        // No callbacks registered; must not panic.
        pad.handle().press(slot(1));
    }

    #[test]
    fn test_speaker_logs_known_clips() {
        let mut speaker = SimSpeaker::new();
        let handle = speaker.handle();

        speaker.play("thunder2", true).unwrap();
        speaker.play(CORRECT_SOUND, true).unwrap();

        assert_eq!(handle.played(), vec!["thunder2", CORRECT_SOUND]);
        assert!(handle.plays().iter().all(|(_, waited)| *waited));
    }

    #[test]
    fn test_speaker_rejects_unknown_clip() {
        let mut speaker = SimSpeaker::new();
        let err = speaker.play("kazoo", true).unwrap_err();
        assert!(matches!(err, HardwareError::UnknownSound(name) if name == "kazoo"));
        assert_eq!(speaker.handle().count(), 0);
    }

    #[test]
    fn test_empty_speaker_rejects_everything() {
        let mut speaker = SimSpeaker::empty();
        assert!(speaker.play(START_SOUND, true).is_err());
    }
}
