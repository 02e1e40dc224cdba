//! I2C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::{I2c, Operation};

use super::FramInterface;

/// I2C-based interface implementation for the FM24Cxx driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface from the provided I2C bus abstraction.
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> FramInterface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write(
        &mut self,
        device_address: u8,
        offset: &[u8],
        data: &[u8],
    ) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return self.i2c.write(device_address, offset);
        }

        // Adjacent writes share one START/STOP pair on the wire.
        let mut operations = [Operation::Write(offset), Operation::Write(data)];
        self.i2c.transaction(device_address, &mut operations)
    }

    fn read(&mut self, device_address: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        self.i2c.read(device_address, buf)
    }
}
