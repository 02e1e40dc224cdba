//! High-level FM24Cxx FRAM driver implementation.

use core::convert::Infallible;

use crate::addressing::{AddressFraming, FramedAddress, Framing};
use crate::codec::{pack_u16, pack_u32, unpack_u16, unpack_u32};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::i2c::I2cInterface;
use crate::interface::FramInterface;
use crate::log::{debug, log_warn};
use crate::observer::{Event, NoObserver, Observer};
use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal::i2c::I2c;

// Value written to every cell by `erase_device`.
const ERASED_BYTE: u8 = 0x00;
// Highest valid bit position inside a byte.
const MAX_BIT_INDEX: u8 = 7;

/// Placeholder pin type for devices whose write-protect line is not driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoWriteProtect;

impl ErrorType for NoWriteProtect {
    type Error = Infallible;
}

impl OutputPin for NoWriteProtect {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// High-level synchronous driver for one FM24Cxx FRAM chip.
///
/// Every operation is one or more blocking bus transactions. Bit operations and
/// [`copy_byte`](Self::copy_byte) are read-modify-write sequences; callers sharing
/// the bus between contexts must serialize access themselves.
pub struct Fm24cxx<IFACE, WP = NoWriteProtect, F = Framing, O = NoObserver> {
    interface: IFACE,
    write_protect: Option<WP>,
    write_protect_enabled: bool,
    config: Config<F>,
    observer: O,
}

impl<IFACE, WP, F, O> Fm24cxx<IFACE, WP, F, O> {
    // ==================================================================
    // == Driver Ownership ===============================================
    // ==================================================================
    /// Consumes the driver and returns the owned interface, pin and configuration.
    pub fn release(self) -> (IFACE, Option<WP>, Config<F>) {
        (self.interface, self.write_protect, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config<F> {
        &self.config
    }

    /// Addressable bytes of the chip.
    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    /// Returns `true` when the write-protect line is asserted.
    ///
    /// Always `false` when no pin is managed.
    pub fn is_write_protected(&self) -> bool {
        self.write_protect_enabled
    }

    /// Replaces the event observer.
    pub fn with_observer<O2>(self, observer: O2) -> Fm24cxx<IFACE, WP, F, O2>
    where
        O2: Observer,
    {
        Fm24cxx {
            interface: self.interface,
            write_protect: self.write_protect,
            write_protect_enabled: self.write_protect_enabled,
            config: self.config,
            observer,
        }
    }
}

impl<IFACE, F> Fm24cxx<IFACE, NoWriteProtect, F>
where
    IFACE: FramInterface,
    F: AddressFraming,
{
    // ==================================================================
    // == Construction ===================================================
    // ==================================================================
    /// Creates a driver without write-protect management.
    pub fn new(interface: IFACE, config: Config<F>) -> Result<Self, IFACE::Error> {
        Self::build(interface, None, config)
    }
}

impl<IFACE, WP, F> Fm24cxx<IFACE, WP, F>
where
    IFACE: FramInterface,
    WP: OutputPin,
    F: AddressFraming,
{
    /// Creates a driver that owns the write-protect pin.
    ///
    /// The pin is driven to `config.write_protect` before the driver is returned.
    pub fn new_with_write_protect(
        interface: IFACE,
        pin: WP,
        config: Config<F>,
    ) -> Result<Self, IFACE::Error, WP::Error> {
        Self::build(interface, Some(pin), config)
    }

    fn build(
        interface: IFACE,
        write_protect: Option<WP>,
        config: Config<F>,
    ) -> Result<Self, IFACE::Error, WP::Error> {
        if config.validate().is_err() {
            return Err(Error::InvalidConfig);
        }

        let mut device = Self {
            interface,
            write_protect,
            write_protect_enabled: false,
            config,
            observer: NoObserver,
        };
        device.init_write_protect()?;
        Ok(device)
    }
}

impl<I2C, F> Fm24cxx<I2cInterface<I2C>, NoWriteProtect, F>
where
    I2C: I2c,
    F: AddressFraming,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I2C transports without write-protect management.
    pub fn new_i2c(i2c: I2C, config: Config<F>) -> Result<Self, I2C::Error> {
        Self::new(I2cInterface::new(i2c), config)
    }
}

impl<I2C, WP, F> Fm24cxx<I2cInterface<I2C>, WP, F>
where
    I2C: I2c,
    WP: OutputPin,
    F: AddressFraming,
{
    /// Convenience constructor for I2C transports with a write-protect pin.
    pub fn new_i2c_with_write_protect(
        i2c: I2C,
        pin: WP,
        config: Config<F>,
    ) -> Result<Self, I2C::Error, WP::Error> {
        Self::new_with_write_protect(I2cInterface::new(i2c), pin, config)
    }
}

impl<I2C, WP, F, O> Fm24cxx<I2cInterface<I2C>, WP, F, O> {
    /// Releases the driver, returning the I2C bus, pin and configuration.
    pub fn release_i2c(self) -> (I2C, Option<WP>, Config<F>) {
        let (iface, pin, config) = self.release();
        (iface.release(), pin, config)
    }
}

impl<IFACE, CommE, WP, PinE, F, O> Fm24cxx<IFACE, WP, F, O>
where
    IFACE: FramInterface<Error = CommE>,
    WP: OutputPin<Error = PinE>,
    F: AddressFraming,
    O: Observer,
{
    // ==================================================================
    // == Diagnostics ====================================================
    // ==================================================================
    /// Reports the active configuration to the observer and the log.
    pub fn describe(&mut self) {
        let base_address = self.config.base_address;
        let write_protect_managed = self.write_protect.is_some();
        let capacity = self.config.capacity;

        debug!(
            "FM24Cxx at {=u8:#x}, capacity {=u32}, write protect managed: {=bool}",
            base_address,
            capacity,
            write_protect_managed
        );
        self.observer.notify(Event::Configured {
            base_address,
            write_protect_managed,
            capacity,
        });
    }

    // ==================================================================
    // == Array Transfers ================================================
    // ==================================================================
    /// Writes `data` starting at `address` in a single bus transaction.
    pub fn write_array(&mut self, address: u16, data: &[u8]) -> Result<(), CommE, PinE> {
        self.check_range(address, data.len())?;
        self.write_frame(address, data).map_err(Error::Interface)
    }

    /// Fills `buf` with the bytes stored from `address` onwards.
    ///
    /// Both the address-set transaction and the data read report their errors.
    pub fn read_array(&mut self, address: u16, buf: &mut [u8]) -> Result<(), CommE, PinE> {
        self.check_range(address, buf.len())?;
        if buf.is_empty() {
            return Err(Error::EmptyRequest);
        }

        let framed = self.frame(address);
        self.interface
            .write(framed.device_address, framed.offset(), &[])
            .map_err(Error::Interface)?;

        self.observer.notify(Event::Read {
            device_address: framed.device_address,
            address,
            len: buf.len(),
        });
        self.interface
            .read(framed.device_address, buf)
            .map_err(Error::Interface)
    }

    // ==================================================================
    // == Byte Access ====================================================
    // ==================================================================
    /// Writes one byte.
    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<(), CommE, PinE> {
        self.write_array(address, core::slice::from_ref(&value))
    }

    /// Reads one byte.
    pub fn read_byte(&mut self, address: u16) -> Result<u8, CommE, PinE> {
        let mut value = [0u8; 1];
        self.read_array(address, &mut value)?;
        Ok(value[0])
    }

    /// Copies the byte at `source` to `destination`.
    ///
    /// Nothing is written when the read fails.
    pub fn copy_byte(&mut self, source: u16, destination: u16) -> Result<(), CommE, PinE> {
        let value = self.read_byte(source)?;
        self.write_byte(destination, value)
    }

    // ==================================================================
    // == Bit Access =====================================================
    // ==================================================================
    /// Reads bit `bit` (0 = LSB) of the byte at `address`.
    pub fn read_bit(&mut self, address: u16, bit: u8) -> Result<bool, CommE, PinE> {
        Self::check_bit(bit)?;
        let value = self.read_byte(address)?;
        Ok(value & (1 << bit) != 0)
    }

    /// Sets bit `bit` of the byte at `address`.
    pub fn set_bit(&mut self, address: u16, bit: u8) -> Result<(), CommE, PinE> {
        self.modify_byte(address, bit, |value, mask| value | mask)
    }

    /// Clears bit `bit` of the byte at `address`.
    pub fn clear_bit(&mut self, address: u16, bit: u8) -> Result<(), CommE, PinE> {
        self.modify_byte(address, bit, |value, mask| value & !mask)
    }

    /// Flips bit `bit` of the byte at `address`.
    pub fn toggle_bit(&mut self, address: u16, bit: u8) -> Result<(), CommE, PinE> {
        self.modify_byte(address, bit, |value, mask| value ^ mask)
    }

    // ==================================================================
    // == Multi-Byte Values ==============================================
    // ==================================================================
    /// Reads a little-endian 16-bit value.
    pub fn read_word(&mut self, address: u16) -> Result<u16, CommE, PinE> {
        let mut raw = [0u8; 2];
        self.read_array(address, &mut raw)?;
        Ok(unpack_u16(raw))
    }

    /// Writes a 16-bit value, least significant byte first.
    pub fn write_word(&mut self, address: u16, value: u16) -> Result<(), CommE, PinE> {
        self.write_array(address, &pack_u16(value))
    }

    /// Reads a little-endian 32-bit value.
    pub fn read_long(&mut self, address: u16) -> Result<u32, CommE, PinE> {
        let mut raw = [0u8; 4];
        self.read_array(address, &mut raw)?;
        Ok(unpack_u32(raw))
    }

    /// Writes a 32-bit value, least significant byte first.
    pub fn write_long(&mut self, address: u16, value: u32) -> Result<(), CommE, PinE> {
        self.write_array(address, &pack_u32(value))
    }

    // ==================================================================
    // == Erase ==========================================================
    // ==================================================================
    /// Overwrites the whole capacity with `0x00`, one byte per transaction.
    ///
    /// Stops at the first bus error and reports it as [`Error::Erase`] together with
    /// the number of bytes already cleared. The chip is left partially erased.
    pub fn erase_device(&mut self) -> Result<(), CommE, PinE> {
        debug!("erasing {=u32} bytes", self.config.capacity);
        self.observer.notify(Event::EraseStarted);

        for position in 0..self.config.capacity {
            if let Err(source) = self.write_frame(position as u16, &[ERASED_BYTE]) {
                log_warn!("erase stopped at {=u32}", position);
                self.observer.notify(Event::EraseStopped { position });
                return Err(Error::Erase {
                    erased: position,
                    source,
                });
            }
        }

        self.observer.notify(Event::EraseFinished);
        Ok(())
    }

    // ==================================================================
    // == Write Protection ===============================================
    // ==================================================================
    /// Drives the write-protect line high, blocking writes in hardware.
    pub fn enable_write_protect(&mut self) -> Result<(), CommE, PinE> {
        self.drive_write_protect(true)
    }

    /// Drives the write-protect line low, allowing writes.
    pub fn disable_write_protect(&mut self) -> Result<(), CommE, PinE> {
        self.drive_write_protect(false)
    }

    // ==================================================================
    // == Internal Helpers ===============================================
    // ==================================================================
    fn init_write_protect(&mut self) -> Result<(), CommE, PinE> {
        if self.write_protect.is_none() {
            self.write_protect_enabled = false;
            return Ok(());
        }

        self.drive_write_protect(self.config.write_protect)
    }

    fn drive_write_protect(&mut self, enabled: bool) -> Result<(), CommE, PinE> {
        let Some(pin) = self.write_protect.as_mut() else {
            return Err(Error::NotManaged);
        };
        if enabled {
            pin.set_high().map_err(Error::Pin)?;
        } else {
            pin.set_low().map_err(Error::Pin)?;
        }

        self.write_protect_enabled = enabled;
        self.observer.notify(Event::WriteProtect { enabled });
        Ok(())
    }

    fn frame(&self, address: u16) -> FramedAddress {
        self.config.framing.frame(self.config.base_address, address)
    }

    fn write_frame(&mut self, address: u16, data: &[u8]) -> core::result::Result<(), CommE> {
        let framed = self.frame(address);
        self.observer.notify(Event::Write {
            device_address: framed.device_address,
            address,
            len: data.len(),
        });

        self.interface
            .write(framed.device_address, framed.offset(), data)
    }

    fn check_range(&self, address: u16, len: usize) -> Result<(), CommE, PinE> {
        let start = u32::from(address);
        let end = u32::try_from(len)
            .ok()
            .and_then(|len| start.checked_add(len));

        match end {
            Some(end) if start < self.config.capacity && end <= self.config.capacity => Ok(()),
            _ => Err(Error::OutOfRange),
        }
    }

    fn check_bit(bit: u8) -> Result<(), CommE, PinE> {
        if bit > MAX_BIT_INDEX {
            return Err(Error::BitIndexOutOfRange);
        }
        Ok(())
    }

    fn modify_byte<M>(&mut self, address: u16, bit: u8, mutate: M) -> Result<(), CommE, PinE>
    where
        M: FnOnce(u8, u8) -> u8,
    {
        Self::check_bit(bit)?;
        let current = self.read_byte(address)?;
        self.write_byte(address, mutate(current, 1 << bit))
    }
}

#[cfg(test)]
mod tests {
    use super::{Fm24cxx, NoWriteProtect};
    use crate::addressing::Framing;
    use crate::config::{Config, Density};
    use crate::error::Error;
    use crate::interface::FramInterface;
    use crate::observer::Event;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use embedded_hal_mock::eh1::MockError;
    use std::io::ErrorKind as IoErrorKind;
    use std::vec;
    use std::vec::Vec;

    const BASE: u8 = 0x50;
    const NACK: ErrorKind = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data);

    /// In-memory chip decoding the FM24Cxx framing back into memory addresses.
    struct FakeFram {
        memory: Vec<u8>,
        pointer: usize,
        transactions: usize,
        fail_write_at: Option<usize>,
        fail_reads: bool,
    }

    impl FakeFram {
        fn new(capacity: usize) -> Self {
            Self {
                memory: vec![0xA5; capacity],
                pointer: 0,
                transactions: 0,
                fail_write_at: None,
                fail_reads: false,
            }
        }

        fn decode(device_address: u8, offset: &[u8]) -> usize {
            match *offset {
                [high, low] => usize::from(u16::from_be_bytes([high, low])),
                [low] => (usize::from(device_address - BASE) << 8) | usize::from(low),
                _ => panic!("unexpected offset length {}", offset.len()),
            }
        }
    }

    impl FramInterface for FakeFram {
        type Error = ErrorKind;

        fn write(
            &mut self,
            device_address: u8,
            offset: &[u8],
            data: &[u8],
        ) -> core::result::Result<(), Self::Error> {
            self.transactions += 1;
            let address = Self::decode(device_address, offset);
            if !data.is_empty() && self.fail_write_at == Some(address) {
                return Err(NACK);
            }

            self.memory[address..address + data.len()].copy_from_slice(data);
            self.pointer = address + data.len();
            Ok(())
        }

        fn read(
            &mut self,
            _device_address: u8,
            buf: &mut [u8],
        ) -> core::result::Result<(), Self::Error> {
            self.transactions += 1;
            if self.fail_reads {
                return Err(ErrorKind::Bus);
            }

            buf.copy_from_slice(&self.memory[self.pointer..self.pointer + buf.len()]);
            self.pointer += buf.len();
            Ok(())
        }
    }

    fn fm24c04() -> Fm24cxx<FakeFram> {
        Fm24cxx::new(FakeFram::new(512), Config::new().build()).unwrap()
    }

    fn transactions(device: &mut Fm24cxx<FakeFram>) -> usize {
        device.interface_mut().transactions
    }

    #[test]
    fn rejects_invalid_config() {
        let config = Config::new().base_address(0x51).build();
        let result = Fm24cxx::new(FakeFram::new(512), config);
        assert!(matches!(result, Err(Error::InvalidConfig)));
    }

    #[test]
    fn transfers_past_capacity_are_rejected_without_bus_activity() {
        let mut device = fm24c04();
        let mut buf = [0u8; 4];

        for (address, len) in [(509u16, 4usize), (512, 1), (600, 1), (0, 513), (u16::MAX, 1)] {
            let data = vec![0u8; len];
            assert_eq!(device.write_array(address, &data), Err(Error::OutOfRange));
            let mut read = vec![0u8; len];
            assert_eq!(device.read_array(address, &mut read), Err(Error::OutOfRange));
        }
        assert_eq!(device.read_array(510, &mut buf), Err(Error::OutOfRange));
        assert_eq!(transactions(&mut device), 0);
    }

    #[test]
    fn write_fitting_exactly_at_the_end_succeeds() {
        let mut device = fm24c04();

        assert_eq!(device.write_array(510, &[0x11, 0x22]), Ok(()));
        assert_eq!(device.write_array(511, &[0x11, 0x22]), Err(Error::OutOfRange));
        assert_eq!(device.read_word(510), Ok(0x2211));
    }

    #[test]
    fn empty_read_is_rejected_and_buffer_untouched() {
        let mut device = fm24c04();
        let mut buf: [u8; 0] = [];

        assert_eq!(device.read_array(42, &mut buf), Err(Error::EmptyRequest));
        assert_eq!(transactions(&mut device), 0);
    }

    #[test]
    fn bytes_round_trip_across_the_whole_capacity() {
        let mut device = fm24c04();

        for address in 0..512u16 {
            let value = (address as u8).wrapping_mul(7) ^ 0x5A;
            device.write_byte(address, value).unwrap();
            assert_eq!(device.read_byte(address), Ok(value));
        }
        for value in 0..=255u8 {
            device.write_byte(0x100, value).unwrap();
            assert_eq!(device.read_byte(0x100), Ok(value));
        }
    }

    #[test]
    fn read_failure_is_reported() {
        let mut device = fm24c04();
        device.interface_mut().fail_reads = true;

        assert_eq!(device.read_byte(3), Err(Error::Interface(ErrorKind::Bus)));
    }

    #[test]
    fn copy_byte_moves_value_and_skips_write_when_read_fails() {
        let mut device = fm24c04();
        device.write_byte(10, 0x3C).unwrap();

        device.copy_byte(10, 300).unwrap();
        assert_eq!(device.read_byte(300), Ok(0x3C));

        device.interface_mut().fail_reads = true;
        let before = transactions(&mut device);
        assert_eq!(device.copy_byte(10, 301), Err(Error::Interface(ErrorKind::Bus)));
        // address-set and failed read only
        assert_eq!(transactions(&mut device), before + 2);
    }

    #[test]
    fn bit_index_above_seven_is_rejected_without_bus_activity() {
        let mut device = fm24c04();

        for bit in [8u8, 9, 200] {
            assert_eq!(device.read_bit(0, bit), Err(Error::BitIndexOutOfRange));
            assert_eq!(device.set_bit(0, bit), Err(Error::BitIndexOutOfRange));
            assert_eq!(device.clear_bit(0, bit), Err(Error::BitIndexOutOfRange));
            assert_eq!(device.toggle_bit(0, bit), Err(Error::BitIndexOutOfRange));
        }
        assert_eq!(transactions(&mut device), 0);
    }

    #[test]
    fn bit_operations_modify_single_bits() {
        let mut device = fm24c04();
        device.write_byte(0x120, 0b1010_0000).unwrap();

        device.set_bit(0x120, 0).unwrap();
        assert_eq!(device.read_byte(0x120), Ok(0b1010_0001));
        assert_eq!(device.read_bit(0x120, 0), Ok(true));

        device.clear_bit(0x120, 7).unwrap();
        assert_eq!(device.read_byte(0x120), Ok(0b0010_0001));
        assert_eq!(device.read_bit(0x120, 7), Ok(false));

        device.toggle_bit(0x120, 5).unwrap();
        assert_eq!(device.read_byte(0x120), Ok(0b0000_0001));
        device.toggle_bit(0x120, 4).unwrap();
        assert_eq!(device.read_byte(0x120), Ok(0b0001_0001));
    }

    #[test]
    fn set_bit_is_idempotent_and_toggle_is_an_involution() {
        let mut device = fm24c04();

        for bit in 0..=7u8 {
            device.write_byte(7, 0x96).unwrap();
            device.set_bit(7, bit).unwrap();
            let once = device.read_byte(7).unwrap();
            device.set_bit(7, bit).unwrap();
            assert_eq!(device.read_byte(7), Ok(once));

            device.write_byte(8, 0x96).unwrap();
            device.toggle_bit(8, bit).unwrap();
            device.toggle_bit(8, bit).unwrap();
            assert_eq!(device.read_byte(8), Ok(0x96));
        }
    }

    #[test]
    fn words_and_longs_round_trip_little_endian() {
        let mut device = fm24c04();

        for value in [0u16, 1, 0x00FF, 0x1234, 0x8000, u16::MAX] {
            device.write_word(0x1FE, value).unwrap();
            assert_eq!(device.read_word(0x1FE), Ok(value));
        }
        for value in [0u32, 1, 0x1234_5678, 0x8000_0000, u32::MAX] {
            device.write_long(0xFE, value).unwrap();
            assert_eq!(device.read_long(0xFE), Ok(value));
        }

        device.write_long(0x40, 0x1122_3344).unwrap();
        assert_eq!(&device.interface_mut().memory[0x40..0x44], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn erase_clears_every_byte() {
        let mut device = fm24c04();

        device.erase_device().unwrap();
        assert!(device.interface_mut().memory.iter().all(|&b| b == 0x00));
        assert_eq!(transactions(&mut device), 512);
    }

    #[test]
    fn erase_stops_at_first_failure() {
        let config = Config::new().capacity(8).build();
        let mut device = Fm24cxx::new(FakeFram::new(8), config).unwrap();
        device.interface_mut().fail_write_at = Some(5);

        assert_eq!(
            device.erase_device(),
            Err(Error::Erase {
                erased: 5,
                source: NACK,
            })
        );
        let memory = &device.interface_mut().memory;
        assert_eq!(&memory[..5], &[0x00; 5]);
        assert_eq!(&memory[5..], &[0xA5; 3]);
    }

    #[test]
    fn unmanaged_write_protect_is_refused() {
        let mut device = fm24c04();
        assert!(!device.is_write_protected());

        assert_eq!(device.enable_write_protect(), Err(Error::NotManaged));
        assert_eq!(device.disable_write_protect(), Err(Error::NotManaged));
        assert!(!device.is_write_protected());
    }

    #[test]
    fn unmanaged_write_protect_ignores_initial_state() {
        let config = Config::new().write_protect(true).build();
        let device: Fm24cxx<FakeFram, NoWriteProtect> =
            Fm24cxx::new(FakeFram::new(512), config).unwrap();
        assert!(!device.is_write_protected());
    }

    #[test]
    fn managed_write_protect_drives_the_pin() {
        let expectations = [
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        let pin = PinMock::new(&expectations);
        let config = Config::new().write_protect(true).build();

        let mut device =
            Fm24cxx::new_with_write_protect(FakeFram::new(512), pin, config).unwrap();
        assert!(device.is_write_protected());

        device.disable_write_protect().unwrap();
        assert!(!device.is_write_protected());

        device.enable_write_protect().unwrap();
        assert!(device.is_write_protected());

        let (_, pin, _) = device.release();
        pin.unwrap().done();
    }

    #[test]
    fn managed_write_protect_starts_low_when_disabled() {
        let expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        let pin = PinMock::new(&expectations);
        let config = Config::new().write_protect(false).build();

        let mut device =
            Fm24cxx::new_with_write_protect(FakeFram::new(512), pin, config).unwrap();
        assert!(!device.is_write_protected());

        device.enable_write_protect().unwrap();
        assert!(device.is_write_protected());

        let (_, pin, _) = device.release();
        pin.unwrap().done();
    }

    #[test]
    fn failed_pin_switch_keeps_write_protect_state() {
        let pin_error = MockError::Io(IoErrorKind::NotConnected);
        let expectations = [
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High).with_error(pin_error.clone()),
        ];
        let pin = PinMock::new(&expectations);
        let config = Config::new().write_protect(false).build();

        let mut device =
            Fm24cxx::new_with_write_protect(FakeFram::new(512), pin, config).unwrap();

        assert_eq!(device.enable_write_protect(), Err(Error::Pin(pin_error)));
        assert!(!device.is_write_protected());

        let (_, pin, _) = device.release();
        pin.unwrap().done();
    }

    #[test]
    fn failed_address_set_is_not_reported_as_read() {
        let mut events: Vec<Event> = Vec::new();
        {
            let expectations = [I2cTransaction::write(0x50, vec![0x05]).with_error(NACK)];
            let mut device =
                Fm24cxx::new_i2c(I2cMock::new(&expectations), Config::new().build())
                    .unwrap()
                    .with_observer(|event: Event| events.push(event));

            assert_eq!(device.read_byte(5), Err(Error::Interface(NACK)));

            let (mut i2c, _, _) = device.release_i2c();
            i2c.done();
        }

        assert!(events.is_empty());
    }

    #[test]
    fn observer_sees_transfers_and_erase_progress() {
        let mut events: Vec<Event> = Vec::new();
        {
            let config = Config::new().capacity(2).build();
            let mut device = Fm24cxx::new(FakeFram::new(2), config)
                .unwrap()
                .with_observer(|event: Event| events.push(event));

            device.describe();
            device.write_byte(1, 0x42).unwrap();
            device.read_byte(1).unwrap();
            device.interface_mut().fail_write_at = Some(1);
            assert!(device.erase_device().is_err());
        }

        assert_eq!(
            events,
            vec![
                Event::Configured {
                    base_address: BASE,
                    write_protect_managed: false,
                    capacity: 2,
                },
                Event::Write { device_address: BASE, address: 1, len: 1 },
                Event::Read { device_address: BASE, address: 1, len: 1 },
                Event::EraseStarted,
                Event::Write { device_address: BASE, address: 0, len: 1 },
                Event::Write { device_address: BASE, address: 1, len: 1 },
                Event::EraseStopped { position: 1 },
            ]
        );
    }

    #[test]
    fn i2c_framing_folds_high_address_bit() {
        let expectations = [
            I2cTransaction::transaction_start(0x51),
            I2cTransaction::write(0x51, vec![0xFE]),
            I2cTransaction::write(0x51, vec![0x11, 0x22]),
            I2cTransaction::transaction_end(0x51),
            I2cTransaction::write(0x50, vec![0x7F]),
            I2cTransaction::read(0x50, vec![0x99]),
        ];
        let mut device = Fm24cxx::new_i2c(I2cMock::new(&expectations), Config::new().build()).unwrap();

        device.write_array(510, &[0x11, 0x22]).unwrap();
        assert_eq!(device.read_byte(0x7F), Ok(0x99));

        let (mut i2c, _, _) = device.release_i2c();
        i2c.done();
    }

    #[test]
    fn i2c_framing_uses_two_offset_bytes_on_fm24c64() {
        let expectations = [
            I2cTransaction::transaction_start(0x50),
            I2cTransaction::write(0x50, vec![0x1F, 0xFC]),
            I2cTransaction::write(0x50, vec![0x78, 0x56, 0x34, 0x12]),
            I2cTransaction::transaction_end(0x50),
        ];
        let config = Config::for_density(Density::Fm24c64);
        let mut device = Fm24cxx::new_i2c(I2cMock::new(&expectations), config).unwrap();
        assert_eq!(device.config().framing, Framing::WordAddress);

        device.write_long(0x1FFC, 0x1234_5678).unwrap();

        let (mut i2c, _, _) = device.release_i2c();
        i2c.done();
    }

    #[test]
    fn i2c_address_set_failure_skips_the_read() {
        let nack = ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address);
        let expectations = [I2cTransaction::write(0x51, vec![0x00]).with_error(nack)];
        let mut device = Fm24cxx::new_i2c(I2cMock::new(&expectations), Config::new().build()).unwrap();

        assert_eq!(device.read_byte(0x100), Err(Error::Interface(nack)));

        let (mut i2c, _, _) = device.release_i2c();
        i2c.done();
    }
}
