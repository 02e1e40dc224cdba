//! Memory address framing for the FM24Cxx family.
//!
//! Small densities fold the upper memory address bits into the low bits of the
//! 7-bit device address (page select) and send a single offset byte. Larger
//! densities keep the device address fixed and send a two byte offset.
//! [`AddressFraming`] lets a caller substitute another rule without touching the driver.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

/// Number of page-select bits available in the device select byte.
pub const MAX_PAGE_BITS: u8 = 3;

/// Bitfield representation of the 7-bit device select address.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSelect {
    // A2..A0 pins or page-select bits (bits 2:0).
    pub select: B3,
    // Device type identifier, `0b1010` for FM24Cxx parts (bits 6:3).
    pub device_type: B4,
    #[skip]
    __: B1,
}

impl From<u8> for DeviceSelect {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<DeviceSelect> for u8 {
    fn from(value: DeviceSelect) -> Self {
        value.into_bytes()[0]
    }
}

/// Bus-level target of one transfer: device address plus in-chip offset bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramedAddress {
    /// 7-bit device address the transaction is sent to.
    pub device_address: u8,
    offset: [u8; 2],
    offset_len: u8,
}

impl FramedAddress {
    /// Target with a single offset byte.
    pub const fn short(device_address: u8, offset: u8) -> Self {
        Self {
            device_address,
            offset: [offset, 0],
            offset_len: 1,
        }
    }

    /// Target with a big-endian two byte offset.
    pub const fn wide(device_address: u8, offset: u16) -> Self {
        Self {
            device_address,
            offset: offset.to_be_bytes(),
            offset_len: 2,
        }
    }

    /// Offset bytes sent right after the device address.
    pub fn offset(&self) -> &[u8] {
        &self.offset[..self.offset_len as usize]
    }
}

/// Rule translating a memory address into a [`FramedAddress`].
pub trait AddressFraming {
    /// Frames `address` for a chip whose configured base address is `base_address`.
    fn frame(&self, base_address: u8, address: u16) -> FramedAddress;

    /// Number of bytes this rule can address.
    fn addressable(&self) -> u32;

    /// Device address bits owned by the rule; the base address must leave them clear.
    fn page_mask(&self) -> u8;
}

/// Address framing rules of the FM24Cxx family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Framing {
    /// Upper `page_bits` address bits land in the device address, one offset byte follows.
    PageSelect {
        /// Number of folded bits, at most [`MAX_PAGE_BITS`].
        page_bits: u8,
    },
    /// Fixed device address followed by a big-endian 16-bit offset.
    WordAddress,
}

impl Default for Framing {
    fn default() -> Self {
        Self::PageSelect { page_bits: 1 }
    }
}

impl AddressFraming for Framing {
    fn frame(&self, base_address: u8, address: u16) -> FramedAddress {
        match *self {
            Self::PageSelect { .. } => {
                let page = ((address >> 8) as u8) & self.page_mask();
                let select = DeviceSelect::from(base_address);
                let device = select.with_select(select.select() | page);
                FramedAddress::short(u8::from(device), (address & 0xFF) as u8)
            }
            Self::WordAddress => FramedAddress::wide(base_address, address),
        }
    }

    fn addressable(&self) -> u32 {
        match *self {
            Self::PageSelect { page_bits } if page_bits <= MAX_PAGE_BITS => 256 << page_bits,
            Self::PageSelect { .. } => 0,
            Self::WordAddress => 1 << 16,
        }
    }

    fn page_mask(&self) -> u8 {
        match *self {
            Self::PageSelect { page_bits } => (1u8 << page_bits.min(MAX_PAGE_BITS)) - 1,
            Self::WordAddress => 0,
        }
    }
}
