//! One's-complement checksum for mcast packet builders
//!
//! Implements the 16-bit Internet checksum used by UDP and IGMP headers:
//! - Big-endian 16-bit words, odd trailing byte zero-padded
//! - End-around carry folding
//! - A computed zero is sent as `0xFFFF` (RFC 768)
//!
//! # Examples
//!
//! ```
//! use mcast_checksum::{compute_checksum, compute_checksum_bytes};
//!
//! let csum = compute_checksum(&[0x45, 0x00, 0x00, 0x1c]);
//! assert_eq!(csum, 0xBAE3);
//! assert_eq!(compute_checksum_bytes(&[0x45, 0x00, 0x00, 0x1c]), (0xBA, 0xE3));
//! ```

/// Checksum value transmitted in place of a computed zero
pub const ZERO_CHECKSUM: u16 = 0xFFFF;

/// Compute the 16-bit one's-complement checksum of `buf`
///
/// Never returns `0x0000`; a zero result is replaced with `0xFFFF`.
pub fn compute_checksum(buf: &[u8]) -> u16 {
    Accumulator::new().update(buf).finish()
}

/// Compute the checksum of `buf` split into `(high, low)` bytes
pub fn compute_checksum_bytes(buf: &[u8]) -> (u8, u8) {
    let [high, low] = compute_checksum(buf).to_be_bytes();
    (high, low)
}

/// Check a buffer that already carries its checksum field
///
/// A buffer is valid when its one's-complement sum folds to all ones.
pub fn verify_checksum(buf: &[u8]) -> bool {
    Accumulator::new().update(buf).folded() == 0xFFFF
}

/// Incremental checksum over multiple slices
///
/// Feeding slices one after another yields the same result as feeding their
/// concatenation, so a pseudo-header and a payload can be summed without
/// copying them into one buffer.
///
/// ```
/// use mcast_checksum::{compute_checksum, Accumulator};
///
/// let whole = [1u8, 2, 3, 4, 5];
/// let csum = Accumulator::new().update(&whole[..3]).update(&whole[3..]).finish();
/// assert_eq!(csum, compute_checksum(&whole));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    sum: u64,
    tail: Option<u8>,
}

impl Accumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slice to the running sum
    pub fn update(&mut self, mut data: &[u8]) -> &mut Self {
        // Complete a word left open by the previous slice.
        if let Some(high) = self.tail.take() {
            match data.split_first() {
                Some((&low, rest)) => {
                    self.sum += u64::from(u16::from_be_bytes([high, low]));
                    data = rest;
                }
                None => {
                    self.tail = Some(high);
                    return self;
                }
            }
        }

        let mut words = data.chunks_exact(2);
        for word in &mut words {
            self.sum += u64::from(u16::from_be_bytes([word[0], word[1]]));
        }
        self.tail = words.remainder().first().copied();
        self
    }

    /// Sum folded to 16 bits, before complementing
    fn folded(&self) -> u16 {
        let mut sum = self.sum;
        if let Some(high) = self.tail {
            sum += u64::from(high) << 8;
        }
        while sum > 0xFFFF {
            sum = (sum >> 16) + (sum & 0xFFFF);
        }
        sum as u16
    }

    /// Finish the computation and return the checksum
    pub fn finish(&self) -> u16 {
        match !self.folded() {
            0 => ZERO_CHECKSUM,
            csum => csum,
        }
    }
}
