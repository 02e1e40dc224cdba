//! Optional event hook for tracing driver activity.
//!
//! The driver reports every bus transfer, write-protect change and erase
//! milestone to an [`Observer`]. The default [`NoObserver`] discards them.
//! Any `FnMut(Event)` closure can be attached with
//! [`Fm24cxx::with_observer`](crate::device::Fm24cxx::with_observer).

/// Activity reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Snapshot of the active configuration.
    Configured {
        /// Base 7-bit device address.
        base_address: u8,
        /// Whether a write-protect pin is managed.
        write_protect_managed: bool,
        /// Addressable bytes.
        capacity: u32,
    },
    /// Data written to memory.
    Write {
        /// Device address the transaction went to.
        device_address: u8,
        /// First memory address written.
        address: u16,
        /// Number of bytes written.
        len: usize,
    },
    /// Data read from memory.
    Read {
        /// Device address the transaction went to.
        device_address: u8,
        /// First memory address read.
        address: u16,
        /// Number of bytes read.
        len: usize,
    },
    /// Write-protect line driven to a new state.
    WriteProtect {
        /// `true` when writes are now blocked.
        enabled: bool,
    },
    /// Device erase started.
    EraseStarted,
    /// Device erase completed for the whole capacity.
    EraseFinished,
    /// Device erase stopped early.
    EraseStopped {
        /// Address that failed.
        position: u32,
    },
}

/// Receiver of driver [`Event`]s.
pub trait Observer {
    /// Called synchronously for each event.
    fn notify(&mut self, event: Event);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoObserver;

impl Observer for NoObserver {
    #[inline]
    fn notify(&mut self, _event: Event) {}
}

impl<F> Observer for F
where
    F: FnMut(Event),
{
    fn notify(&mut self, event: Event) {
        self(event)
    }
}
