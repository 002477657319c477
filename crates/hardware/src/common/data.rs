//! Fixed-Width Datapath Signals.
//!
//! This module defines [`Data`], the value carried by every port and wire. It provides:
//! 1. **Width Discipline:** Values are masked to their width on every write.
//! 2. **Interpretation:** Unsigned and two's-complement reads, sign and zero extension.
//! 3. **Formatting:** Binary, decimal, and hexadecimal renderings for the host.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::MAX_SIGNAL_SIZE;

/// Display format for signal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Zero-padded binary, one digit per bit.
    Binary,
    /// Decimal. 32-bit values are shown signed, narrower values unsigned.
    #[default]
    Decimal,
    /// `0x`-prefixed, zero-padded hexadecimal.
    Hexadecimal,
}

/// A signal of 1 to 32 bits.
///
/// The stored value always fits in `size` bits; writes wider than the signal are
/// truncated.
///
/// # Examples
///
/// ```
/// use mipsflow_core::common::Data;
///
/// let mut d = Data::new(4);
/// d.set_value(0x1F);
/// assert_eq!(d.value(), 0xF);
/// assert_eq!(d.signed_value(), -1);
/// assert_eq!(d.to_binary(), "1111");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawData")]
pub struct Data {
    size: u8,
    value: u32,
}

/// Serialized form of [`Data`], clamped and masked on the way in.
#[derive(Deserialize)]
struct RawData {
    size: u8,
    value: u32,
}

impl From<RawData> for Data {
    fn from(raw: RawData) -> Self {
        Self::with_value(raw.size, raw.value)
    }
}

impl Data {
    /// Creates a zero-valued signal of the given width.
    ///
    /// Widths outside `1..=32` are clamped; builders validate widths before
    /// creating ports, so the clamp only guards direct callers.
    pub fn new(size: u8) -> Self {
        Self {
            size: size.clamp(1, MAX_SIGNAL_SIZE),
            value: 0,
        }
    }

    /// Creates a signal of the given width holding `value` (masked).
    pub fn with_value(size: u8, value: u32) -> Self {
        let mut data = Self::new(size);
        data.set_value(value);
        data
    }

    /// Returns `true` if `size` is a legal signal width.
    pub const fn is_valid_size(size: u8) -> bool {
        size >= 1 && size <= MAX_SIGNAL_SIZE
    }

    /// Mask with the low `size` bits set.
    pub const fn mask(size: u8) -> u32 {
        if size >= 32 {
            u32::MAX
        } else {
            (1u32 << size) - 1
        }
    }

    /// Returns `true` if `value` fits in `size` bits without truncation.
    pub const fn fits(size: u8, value: u32) -> bool {
        value & !Self::mask(size) == 0
    }

    /// Number of bits needed to index `count` distinct items (at least 1).
    pub const fn bits_for(count: u32) -> u8 {
        if count <= 2 {
            1
        } else {
            (32 - (count - 1).leading_zeros()) as u8
        }
    }

    /// Width of the signal in bits.
    #[inline]
    pub const fn size(&self) -> u8 {
        self.size
    }

    /// Unsigned value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Value interpreted as a two's-complement number of `size` bits.
    pub const fn signed_value(&self) -> i32 {
        let shift = 32 - self.size as u32;
        ((self.value << shift) as i32) >> shift
    }

    /// Replaces the value, truncating it to the signal width.
    #[inline]
    pub fn set_value(&mut self, value: u32) {
        self.value = value & Self::mask(self.size);
    }

    /// Returns bit `index` (0 = least significant).
    pub const fn bit(&self, index: u8) -> bool {
        index < self.size && (self.value >> index) & 1 == 1
    }

    /// Returns `true` if the value is non-zero.
    #[inline]
    pub const fn is_set(&self) -> bool {
        self.value != 0
    }

    /// Sign-extends (or truncates) to a new width.
    pub fn sign_extend(&self, size: u8) -> Self {
        Self::with_value(size, self.signed_value() as u32)
    }

    /// Zero-extends (or truncates) to a new width.
    pub fn zero_extend(&self, size: u8) -> Self {
        Self::with_value(size, self.value)
    }

    /// Zero-padded binary string with one digit per bit.
    pub fn to_binary(&self) -> String {
        format!("{:0width$b}", self.value, width = self.size as usize)
    }

    /// Zero-padded hexadecimal string with a `0x` prefix.
    pub fn to_hexadecimal(&self) -> String {
        let digits = (self.size as usize).div_ceil(4);
        format!("0x{:0width$X}", self.value, width = digits)
    }

    /// Decimal string; full data words are shown signed.
    pub fn to_decimal(&self) -> String {
        if self.size >= MAX_SIGNAL_SIZE {
            self.signed_value().to_string()
        } else {
            self.value.to_string()
        }
    }

    /// Renders the value in the requested format.
    pub fn format(&self, format: DataFormat) -> String {
        match format {
            DataFormat::Binary => self.to_binary(),
            DataFormat::Decimal => self.to_decimal(),
            DataFormat::Hexadecimal => self.to_hexadecimal(),
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Self::new(super::constants::DATA_SIZE)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}
