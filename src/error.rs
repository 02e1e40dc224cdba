//! Error handling primitives for the FM24Cxx driver.

use core::convert::Infallible;

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Crate-wide result type alias.
///
/// `E` is the bus interface error, `P` the write-protect pin error.
pub type Result<T, E, P = Infallible> = core::result::Result<T, Error<E, P>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E, P = Infallible> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The write-protect pin could not be driven.
    Pin(P),
    /// The requested address range does not fit inside the device capacity.
    OutOfRange,
    /// A read of zero bytes was requested.
    EmptyRequest,
    /// Bit position outside `0..=7`.
    BitIndexOutOfRange,
    /// Write-protect control requested but no pin is managed by this driver.
    NotManaged,
    /// The provided configuration parameters are invalid.
    InvalidConfig,
    /// Device erase stopped on a bus error.
    Erase {
        /// Number of bytes cleared before the failure, which is also the failing address.
        erased: u32,
        /// Bus error reported for the failing address.
        source: E,
    },
}

impl<E, P> From<E> for Error<E, P> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

impl<E, P> Error<E, P>
where
    E: embedded_hal::i2c::Error,
{
    /// Returns the numeric status code used by the Arduino FM24Cxx library.
    ///
    /// | code | meaning                                   |
    /// |-----:|-------------------------------------------|
    /// |    1 | payload too long for the transport buffer |
    /// |    2 | NACK on the address byte                  |
    /// |    3 | NACK on a data byte                       |
    /// |    4 | bus unavailable or other transport error  |
    /// |    8 | zero-length read                          |
    /// |    9 | bit position out of range                 |
    /// |   10 | operation not permitted                   |
    /// |   11 | memory address out of range               |
    pub fn code(&self) -> u8 {
        match self {
            Self::Interface(err) | Self::Erase { source: err, .. } => bus_code(err.kind()),
            Self::Pin(_) => 4,
            Self::EmptyRequest => 8,
            Self::BitIndexOutOfRange => 9,
            Self::NotManaged | Self::InvalidConfig => 10,
            Self::OutOfRange => 11,
        }
    }
}

fn bus_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Overrun => 1,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => 3,
        ErrorKind::NoAcknowledge(_) => 2,
        _ => 4,
    }
}
