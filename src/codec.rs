//! Byte order of multi-byte values stored in FRAM.
//!
//! Words and longs are stored least significant byte first, the layout the
//! Arduino FM24Cxx library produced on AVR targets. Using these helpers keeps
//! memory images portable between hosts of either endianness.

/// Serializes a 16-bit value into its stored byte sequence.
#[inline]
pub const fn pack_u16(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Deserializes a 16-bit value from its stored byte sequence.
#[inline]
pub const fn unpack_u16(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Serializes a 32-bit value into its stored byte sequence.
#[inline]
pub const fn pack_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// Deserializes a 32-bit value from its stored byte sequence.
#[inline]
pub const fn unpack_u32(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}
