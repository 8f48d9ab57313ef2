//! Hardware boundary contracts for the LED/button driver and the speaker.
//!
//! The engine never touches pins or audio devices directly; it drives
//! these traits. Physical drivers implement them against real hardware,
//! [`crate::sim`] implements them in memory for tests and the terminal
//! demo.

use crate::color::Color;
use crate::event::Slot;

/// Callback invoked with the slot a physical event landed on.
pub type SlotCallback = Box<dyn Fn(Slot) + Send + Sync>;

/// The notification callbacks a driver dispatches from its own threads.
pub struct PadCallbacks {
    pub on_press: SlotCallback,
    pub on_held: SlotCallback,
    pub on_released: SlotCallback,
}

/// Failure of a hardware boundary call.
///
/// Any of these ends the running game session; the engine does not
/// retry against a device in an unknown state.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The speaker has no clip preloaded under this name.
    #[error("no sound clip named {0:?} is loaded")]
    UnknownSound(String),
    /// An LED write was rejected by the driver.
    #[error("led write for slot {slot} failed: {reason}")]
    Led { slot: Slot, reason: String },
    /// The device rejected a call outright.
    #[error("device failure: {0}")]
    Device(String),
}

/// The LED/button matrix driver as seen by the engine.
pub trait ButtonPad {
    /// Register the event callbacks, replacing any previous set. The
    /// driver invokes them from its own notifier threads.
    fn assign_button_events(&mut self, callbacks: PadCallbacks);

    /// Set one slot's LED. Not guaranteed synchronous with photons.
    fn set_led(&mut self, slot: Slot, color: Color) -> Result<(), HardwareError>;

    /// Set every LED to the off color.
    fn clear_all(&mut self) -> Result<(), HardwareError>;

    /// Release driver resources. Must be the last call made, after the
    /// game thread has fully stopped.
    fn cleanup(&mut self) -> Result<(), HardwareError>;
}

/// The audio driver as seen by the engine.
pub trait Speaker {
    /// Play a preloaded clip by name. With `wait_until_done` the call
    /// blocks until playback is complete; the engine always waits, which
    /// serializes audio inside each event's processing.
    fn play(&mut self, sound: &str, wait_until_done: bool) -> Result<(), HardwareError>;
}
