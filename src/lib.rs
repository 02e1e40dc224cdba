//! `#![no_std]` driver for FM24Cxx I2C FRAM memories.
//!
//! The driver turns byte, bit, word and array accesses into two-wire bus
//! transactions, checks every access against the configured capacity before
//! touching the bus and optionally drives the chip's write-protect pin.
#![no_std]

#[cfg(test)]
extern crate std;

mod error;

pub mod addressing;
pub mod codec;
pub mod config;
pub mod device;
pub mod interface;
mod log;
pub mod observer;

pub use crate::config::{Config, Density};
pub use crate::device::Fm24cxx;
pub use crate::error::{Error, Result};
