//! Capability bitmap parsing and the keyboard test
//!
//! sysfs exposes each capability set of an input device as a bitmap printed
//! in hex `unsigned long` words, most significant word first, separated by
//! spaces (`/sys/class/input/eventN/device/capabilities/ev`).

/// Synchronization events
pub const EV_SYN: u32 = 0x00;
/// Key and button events
pub const EV_KEY: u32 = 0x01;
/// Relative axes (mice)
pub const EV_REL: u32 = 0x02;
/// Absolute axes (touchpads, tablets)
pub const EV_ABS: u32 = 0x03;
/// Miscellaneous events (scancodes)
pub const EV_MSC: u32 = 0x04;
/// Keyboard LEDs
pub const EV_LED: u32 = 0x11;
/// Hardware autorepeat
pub const EV_REP: u32 = 0x14;

const WORD_BITS: u32 = u64::BITS;

/// A parsed capability bitmap, stored least significant word first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapabilityBits {
    words: Vec<u64>,
}

impl CapabilityBits {
    /// Parse sysfs bitmap text. Returns `None` if any word is not valid hex.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text
            .split_whitespace()
            .map(|hex| u64::from_str_radix(hex, 16).ok())
            .collect::<Option<Vec<_>>>()?;
        if words.is_empty() {
            return None;
        }
        words.reverse();
        Some(Self { words })
    }

    pub fn from_bits(bits: &[u32]) -> Self {
        let mut caps = Self::default();
        for &bit in bits {
            let word = (bit / WORD_BITS) as usize;
            if caps.words.len() <= word {
                caps.words.resize(word + 1, 0);
            }
            caps.words[word] |= 1u64 << (bit % WORD_BITS);
        }
        caps
    }

    pub fn has(&self, bit: u32) -> bool {
        self.words
            .get((bit / WORD_BITS) as usize)
            .is_some_and(|w| w & (1u64 << (bit % WORD_BITS)) != 0)
    }

    /// Number of set bits across all words
    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// A device is a keyboard when it reports key events and autorepeat.
///
/// Mice and touchpads report `EV_KEY` for their buttons but never `EV_REP`.
pub fn is_keyboard_caps(ev: &CapabilityBits) -> bool {
    ev.has(EV_KEY) && ev.has(EV_REP)
}
