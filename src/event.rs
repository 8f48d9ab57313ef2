//! Slot identity and the events carried by the queue.
//!
//! Events are inputs from the driver's notifier threads; everything else
//! in the engine keys off the slot they name.

use std::fmt;

/// Number of physical button/LED positions on the pad.
pub const SLOT_COUNT: u8 = 16;

/// A physical button/LED position, numbered 1 through 16.
///
/// Slots 1..=8 form the low half of the pad and 9..=16 the high half; a
/// matched pair always takes one slot from each half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    /// Create a slot from its 1-based position number.
    ///
    /// Returns `None` outside 1..=16.
    #[inline]
    pub const fn new(n: u8) -> Option<Self> {
        if n >= 1 && n <= SLOT_COUNT {
            Some(Slot(n))
        } else {
            None
        }
    }

    /// The 1-based position number.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index for table lookups.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Whether this slot belongs to the low half (1..=8).
    #[inline]
    pub const fn is_low_half(self) -> bool {
        self.0 <= 8
    }

    /// Iterate every slot in position order, 1 through 16.
    pub fn all() -> impl Iterator<Item = Slot> {
        (1..=SLOT_COUNT).map(Slot)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A button event delivered from the driver to the game thread.
///
/// Release notifications carry no game meaning and are dropped at the
/// boundary, so they never appear here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadEvent {
    /// A button was pressed.
    Pressed(Slot),
    /// A button was held past the driver's hold threshold.
    Held(Slot),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_pad_range_only() {
        assert!(Slot::new(0).is_none());
        assert!(Slot::new(17).is_none());
        assert_eq!(Slot::new(1).map(Slot::get), Some(1));
        assert_eq!(Slot::new(16).map(Slot::get), Some(16));
    }

    #[test]
    fn test_index_is_zero_based() {
        let s = Slot::new(1).unwrap();
        assert_eq!(s.index(), 0);
        let s = Slot::new(16).unwrap();
        assert_eq!(s.index(), 15);
    }

    #[test]
    fn test_halves() {
        assert!(Slot::new(8).unwrap().is_low_half());
        assert!(!Slot::new(9).unwrap().is_low_half());
    }

    #[test]
    fn test_all_covers_pad_in_order() {
        let slots: Vec<u8> = Slot::all().map(Slot::get).collect();
        assert_eq!(slots, (1..=16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_display_is_position_number() {
        assert_eq!(Slot::new(7).unwrap().to_string(), "7");
    }
}
