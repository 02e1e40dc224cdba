//! Configuration primitives for the FM24Cxx driver.

use crate::addressing::{AddressFraming, Framing};

/// Largest address space any FM24Cxx framing can reach.
pub const MAX_CAPACITY: u32 = 1 << 16;
/// Device address with A2..A0 tied low.
pub const DEFAULT_BASE_ADDRESS: u8 = 0x50;

/// Supported chip densities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Density {
    /// FM24C04, 4 Kbit / 512 bytes.
    Fm24c04,
    /// FM24C16, 16 Kbit / 2048 bytes.
    Fm24c16,
    /// FM24C64, 64 Kbit / 8192 bytes.
    Fm24c64,
}

impl Density {
    /// Addressable bytes of the part.
    pub const fn capacity(self) -> u32 {
        match self {
            Self::Fm24c04 => 512,
            Self::Fm24c16 => 2_048,
            Self::Fm24c64 => 8_192,
        }
    }

    /// Address framing used by the part.
    pub const fn framing(self) -> Framing {
        match self {
            Self::Fm24c04 => Framing::PageSelect { page_bits: 1 },
            Self::Fm24c16 => Framing::PageSelect { page_bits: 3 },
            Self::Fm24c64 => Framing::WordAddress,
        }
    }
}

/// User-facing configuration for one FRAM chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<F = Framing> {
    /// 7-bit base device address (`0b1010` + A2..A0).
    pub base_address: u8,
    /// Addressable bytes; every transfer must end below this bound.
    pub capacity: u32,
    /// Write-protect state applied at construction when a pin is managed.
    pub write_protect: bool,
    /// Memory address to bus address translation.
    pub framing: F,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Configuration preset for a known density at the default base address.
    pub fn for_density(density: Density) -> Self {
        Self {
            capacity: density.capacity(),
            framing: density.framing(),
            ..Self::default()
        }
    }
}

impl<F> Config<F>
where
    F: AddressFraming,
{
    /// Checks that the address, capacity and framing agree with each other.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.base_address > 0x7F {
            return Err(ConfigError::InvalidBaseAddress);
        }

        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ConfigError::InvalidCapacity);
        }

        if self.capacity > self.framing.addressable() {
            return Err(ConfigError::CapacityExceedsFraming);
        }

        if self.base_address & self.framing.page_mask() != 0 {
            return Err(ConfigError::AddressOverlapsPageBits);
        }

        Ok(())
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the base device address.
    pub fn base_address(mut self, base_address: u8) -> Self {
        self.config.base_address = base_address;
        self
    }

    /// Selects capacity and framing from a density preset.
    pub fn density(mut self, density: Density) -> Self {
        self.config.capacity = density.capacity();
        self.config.framing = density.framing();
        self
    }

    /// Overrides the capacity.
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the write-protect state applied at construction.
    pub fn write_protect(mut self, enabled: bool) -> Self {
        self.config.write_protect = enabled;
        self
    }

    /// Overrides the address framing.
    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Default for Config<F>
where
    F: Default,
{
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS,
            capacity: Density::Fm24c04.capacity(),
            write_protect: false,
            framing: F::default(),
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Base address does not fit in 7 bits.
    InvalidBaseAddress,
    /// Capacity is zero or larger than 65536 bytes.
    InvalidCapacity,
    /// The framing cannot reach every byte of the capacity.
    CapacityExceedsFraming,
    /// Base address sets bits that the framing uses for page selection.
    AddressOverlapsPageBits,
}
