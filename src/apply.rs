//! Producing candidate buffers from bit-flip combinations.
//!
//! Bit position `p` addresses byte `p / 8`, bit `p % 8` counted from the least
//! significant bit. Flipping bit 24 of `[0, 0, 0, 0]` therefore yields
//! `[0, 0, 0, 1]`.

use crate::error::BruteForceError;

/// Word granularity used when applying flips.
///
/// Positions are grouped per unit and each unit is patched with a single XOR.
/// The choice never changes which bits are reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitWidth {
    #[default]
    U8,
    U16,
    U32,
    U64,
}

impl UnitWidth {
    pub fn bits(self) -> usize {
        self.bytes() * 8
    }

    pub fn bytes(self) -> usize {
        match self {
            UnitWidth::U8 => 1,
            UnitWidth::U16 => 2,
            UnitWidth::U32 => 4,
            UnitWidth::U64 => 8,
        }
    }
}

impl TryFrom<u32> for UnitWidth {
    type Error = BruteForceError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(UnitWidth::U8),
            16 => Ok(UnitWidth::U16),
            32 => Ok(UnitWidth::U32),
            64 => Ok(UnitWidth::U64),
            other => Err(BruteForceError::Config(format!(
                "unsupported unit width {other}, expected 8, 16, 32 or 64"
            ))),
        }
    }
}

/// Turns an original buffer plus a set of bit positions into a candidate.
///
/// Implementations must not mutate `original` and must return a buffer of
/// the same length with exactly the listed bits inverted.
pub trait Applicator: Sync {
    fn apply(&self, original: &[u8], positions: &[usize]) -> Vec<u8>;

    /// Write the candidate into `out`, reusing its allocation where possible.
    fn apply_into(&self, original: &[u8], positions: &[usize], out: &mut Vec<u8>) {
        *out = self.apply(original, positions);
    }
}

impl<F> Applicator for F
where
    F: Fn(&[u8], &[usize]) -> Vec<u8> + Sync,
{
    fn apply(&self, original: &[u8], positions: &[usize]) -> Vec<u8> {
        self(original, positions)
    }
}

/// Default applicator: XORs one mask per touched unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitFlipApplicator {
    pub unit: UnitWidth,
}

impl BitFlipApplicator {
    pub fn new(unit: UnitWidth) -> Self {
        Self { unit }
    }

    /// Flip `positions` (increasing) in `buf` in place.
    pub fn flip_in_place(&self, buf: &mut [u8], positions: &[usize]) {
        let unit_bits = self.unit.bits();
        let mut iter = positions.iter().peekable();
        while let Some(&first) = iter.next() {
            let unit = first / unit_bits;
            let mut mask = 1u64 << (first % unit_bits);
            while let Some(&&p) = iter.peek() {
                if p / unit_bits != unit {
                    break;
                }
                mask |= 1u64 << (p % unit_bits);
                iter.next();
            }
            xor_unit(buf, unit * self.unit.bytes(), self.unit, mask);
        }
    }
}

impl Applicator for BitFlipApplicator {
    fn apply(&self, original: &[u8], positions: &[usize]) -> Vec<u8> {
        let mut out = original.to_vec();
        self.flip_in_place(&mut out, positions);
        out
    }

    fn apply_into(&self, original: &[u8], positions: &[usize], out: &mut Vec<u8>) {
        out.clear();
        out.extend_from_slice(original);
        self.flip_in_place(out, positions);
    }
}

fn xor_unit(buf: &mut [u8], start: usize, unit: UnitWidth, mask: u64) {
    let end = (start + unit.bytes()).min(buf.len());
    let chunk = &mut buf[start..end];
    match (unit, chunk.len()) {
        (UnitWidth::U8, 1) => chunk[0] ^= mask as u8,
        (UnitWidth::U16, 2) => {
            let v = u16::from_le_bytes([chunk[0], chunk[1]]) ^ mask as u16;
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        (UnitWidth::U32, 4) => {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            let v = u32::from_le_bytes(raw) ^ mask as u32;
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        (UnitWidth::U64, 8) => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            let v = u64::from_le_bytes(raw) ^ mask;
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        // trailing partial unit
        _ => {
            for (b, m) in chunk.iter_mut().zip(mask.to_le_bytes()) {
                *b ^= m;
            }
        }
    }
}

/// Copy `original` with every bit in `positions` inverted.
pub fn apply_bit_flips(original: &[u8], positions: &[usize], unit: UnitWidth) -> Vec<u8> {
    BitFlipApplicator::new(unit).apply(original, positions)
}

/// Number of differing bits between two equal-length buffers.
///
/// Bytes past the end of the shorter buffer are ignored.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x ^ y).count_ones() as usize)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_24_is_low_bit_of_fourth_byte() {
        for unit in [UnitWidth::U8, UnitWidth::U16, UnitWidth::U32, UnitWidth::U64] {
            assert_eq!(apply_bit_flips(&[0; 4], &[24], unit), vec![0, 0, 0, 1]);
        }
    }

    #[test]
    fn original_untouched() {
        let original = vec![0xAAu8; 5];
        let out = apply_bit_flips(&original, &[0, 7, 39], UnitWidth::U32);
        assert_eq!(original, vec![0xAA; 5]);
        assert_eq!(out, vec![0x2B, 0xAA, 0xAA, 0xAA, 0x2A]);
    }

    #[test]
    fn partial_tail_unit() {
        let out = apply_bit_flips(&[0; 3], &[1, 17, 23], UnitWidth::U64);
        assert_eq!(out, vec![0x02, 0x00, 0x82]);
    }

    #[test]
    fn apply_into_reuses_buffer() {
        let applicator = BitFlipApplicator::new(UnitWidth::U16);
        let mut out = vec![0xFF; 16];
        applicator.apply_into(&[0, 0], &[8, 15], &mut out);
        assert_eq!(out, vec![0x00, 0x81]);
    }

    #[test]
    fn unsupported_width() {
        assert!(UnitWidth::try_from(12).is_err());
        assert_eq!(UnitWidth::try_from(32).unwrap(), UnitWidth::U32);
    }

    #[test]
    fn hamming() {
        assert_eq!(hamming_distance(&[0xFF, 0x00], &[0x0F, 0x01]), 5);
    }
}
