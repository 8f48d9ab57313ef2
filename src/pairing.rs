//! Pairing generator - randomized cross-half pairing of the 16 slots.
//!
//! Every game starts by drawing 8 pairs, one slot from the low half and
//! one from the high half, without replacement until both halves are
//! exhausted. Draw order is the pair index, which selects the pair's
//! color and sound from the fixed palettes.

use rand::Rng;

use crate::color::{Color, PAIR_COLORS};
use crate::event::Slot;

/// Number of matched pairs on the pad.
pub const PAIR_COUNT: usize = 8;

/// Ordinal of a pair in draw order, 0..=7. Indexes the color and sound
/// palettes.
pub type PairIndex = u8;

/// The fixed 8-entry sound palette, index-aligned to pair indices.
pub const PAIR_SOUNDS: [&str; PAIR_COUNT] = [
    "thunder2",
    "fart_z",
    "baby_x",
    "slide_whistle_x",
    "arrow2",
    "phone_pay",
    "bloop_x",
    "car_horn_x",
];

/// One matched pair: a low-half slot, a high-half slot, and the palette
/// ordinal they share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pair {
    /// Slot from the low half (1..=8).
    pub low: Slot,
    /// Slot from the high half (9..=16).
    pub high: Slot,
    /// Draw-order ordinal; selects color and sound.
    pub index: PairIndex,
}

impl Pair {
    /// The pair's assigned color.
    #[inline]
    pub fn color(&self) -> Color {
        PAIR_COLORS[self.index as usize]
    }

    /// The pair's assigned sound clip name.
    #[inline]
    pub fn sound(&self) -> &'static str {
        PAIR_SOUNDS[self.index as usize]
    }

    /// Whether the pair contains the slot.
    #[inline]
    pub fn contains(&self, slot: Slot) -> bool {
        self.low == slot || self.high == slot
    }
}

/// Invalid explicit pairing handed to [`Pairing::from_slot_pairs`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PairingError {
    /// A slot appears in more than one pair.
    #[error("slot {0} appears in more than one pair")]
    DuplicateSlot(Slot),
    /// A pair does not take one slot from each half of the pad.
    #[error("pair ({0}, {1}) does not span both halves of the pad")]
    NotCrossHalf(Slot, Slot),
}

/// A full pairing of the pad: 8 pairs covering all 16 slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub(crate) pairs: [Pair; PAIR_COUNT],
    /// Pair index for each slot, by slot table index.
    pub(crate) by_slot: [Option<PairIndex>; 16],
}

impl Pairing {
    /// Draw a fresh random pairing.
    ///
    /// Each pair takes one uniformly-random remaining slot from each
    /// half, so the result always covers the full pad. Successive calls
    /// advance the RNG and are independent draws.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let mut low: Vec<Slot> = Slot::all().filter(|s| s.is_low_half()).collect();
        let mut high: Vec<Slot> = Slot::all().filter(|s| !s.is_low_half()).collect();

        let pairs: [Pair; PAIR_COUNT] = std::array::from_fn(|i| Pair {
            low: low.swap_remove(rng.gen_range(0..low.len())),
            high: high.swap_remove(rng.gen_range(0..high.len())),
            index: i as PairIndex,
        });

        Self::from_parts(pairs)
    }

    /// Build a pairing from explicit slot pairs, assigning pair indices
    /// by position. Slot order within a pair does not matter.
    ///
    /// Validates the cross-half rule and slot uniqueness; together with
    /// the fixed count those guarantee the pairs partition the pad.
    pub fn from_slot_pairs(slot_pairs: [(Slot, Slot); PAIR_COUNT]) -> Result<Self, PairingError> {
        let mut seen = [false; 16];
        let mut pairs = Vec::with_capacity(PAIR_COUNT);

        for (i, &(a, b)) in slot_pairs.iter().enumerate() {
            let (low, high) = match (a.is_low_half(), b.is_low_half()) {
                (true, false) => (a, b),
                (false, true) => (b, a),
                _ => return Err(PairingError::NotCrossHalf(a, b)),
            };
            for slot in [low, high] {
                if seen[slot.index()] {
                    return Err(PairingError::DuplicateSlot(slot));
                }
                seen[slot.index()] = true;
            }
            pairs.push(Pair {
                low,
                high,
                index: i as PairIndex,
            });
        }

        let pairs: [Pair; PAIR_COUNT] = match pairs.try_into() {
            Ok(pairs) => pairs,
            Err(_) => unreachable!("exactly PAIR_COUNT pairs were collected"),
        };
        Ok(Self::from_parts(pairs))
    }

    fn from_parts(pairs: [Pair; PAIR_COUNT]) -> Self {
        let mut by_slot = [None; 16];
        for pair in &pairs {
            by_slot[pair.low.index()] = Some(pair.index);
            by_slot[pair.high.index()] = Some(pair.index);
        }
        Self { pairs, by_slot }
    }

    /// The pairs in draw (pair-index) order.
    #[inline]
    pub fn pairs(&self) -> &[Pair; PAIR_COUNT] {
        &self.pairs
    }

    /// Look up the pair containing a slot.
    ///
    /// Every slot resolves in a well-formed pairing; `None` is the
    /// defensive answer for a slot the pairing does not know.
    #[inline]
    pub fn pair_of(&self, slot: Slot) -> Option<&Pair> {
        self.by_slot[slot.index()].map(|i| &self.pairs[i as usize])
    }
}
