//! Bus interface abstraction for the FM24Cxx driver.

pub mod i2c;

/// Abstraction over the two-wire transfers required by the driver.
pub trait FramInterface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Sends one write transaction: device address, `offset`, then `data`.
    ///
    /// An empty `data` only positions the chip's internal address pointer.
    fn write(
        &mut self,
        device_address: u8,
        offset: &[u8],
        data: &[u8],
    ) -> core::result::Result<(), Self::Error>;

    /// Requests `buf.len()` bytes from the chip's current address pointer.
    fn read(&mut self, device_address: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;
}
