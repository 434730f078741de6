//! Fixed pin layout and the three-bus pin register model.
//!
//! The harness talks to the CPU system through three 8-bit buses. The input
//! bus and the write side of the bidirectional bus are exclusively
//! harness-driven; the output bus and the read side of the bidirectional bus
//! are exclusively device-driven. `PinBus` is a plain value threaded through
//! each step function so scenarios replay deterministically.

use crate::mux::OutputSelector;

/// Bit mask covering the 3-bit output selector field on the input bus.
pub const IN_OUT_CTRL_MASK: u8 = 0x07;
/// Bit mask covering the 4-bit device status nibble on the bidirectional bus.
pub const IO_STATE_MASK: u8 = 0x0F;
/// Bit mask covering the 3-bit narrow output field on the bidirectional bus.
pub const IO_NARROW_MASK: u8 = 0x70;
/// Bit mask covering the serial return bit on the bidirectional bus.
pub const IO_MISO_MASK: u8 = 0x80;
/// Shift distance from the bidirectional bus to the narrow output field.
pub const IO_NARROW_SHIFT: u8 = 4;

/// Harness-driven pins on the 8-bit input bus, at fixed bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum InputPin {
    /// Output selector bit 0.
    OutCtrl0 = 0,
    /// Output selector bit 1.
    OutCtrl1 = 1,
    /// Output selector bit 2.
    OutCtrl2 = 2,
    /// SPI serial clock.
    SpiSck = 3,
    /// SPI master-out serial data.
    SpiMosi = 4,
    /// SPI chip select, active low.
    SpiCs = 5,
    /// Run control flag.
    Run = 6,
    /// Mode control flag.
    Mode = 7,
}

impl InputPin {
    /// Returns the fixed bit position of this pin within the input bus.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Returns the single-bit mask for this pin.
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Device-driven pins on the 8-bit bidirectional bus, at fixed bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum BidirPin {
    /// Device status nibble bit 0.
    State0 = 0,
    /// Device status nibble bit 1.
    State1 = 1,
    /// Device status nibble bit 2.
    State2 = 2,
    /// Device status nibble bit 3.
    State3 = 3,
    /// Narrow multiplexed output bit 0.
    NarrowOut0 = 4,
    /// Narrow multiplexed output bit 1.
    NarrowOut1 = 5,
    /// Narrow multiplexed output bit 2.
    NarrowOut2 = 6,
    /// SPI master-in serial data.
    SpiMiso = 7,
}

impl BidirPin {
    /// Returns the fixed bit position of this pin within the bidirectional bus.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Returns the single-bit mask for this pin.
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Identifies one of the three physical buses for whole-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Bus {
    /// Harness-driven 8-bit input bus.
    Input,
    /// Device-driven 8-bit wide output bus.
    Output,
    /// 8-bit bidirectional bus (device-driven in this pin layout).
    Bidir,
}

/// Register model for the three physical buses.
///
/// Created once per scenario with all bits low and mutated in place. There is
/// no implicit propagation between buses; reacting to input edges is the
/// external device's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PinBus {
    in_bus: u8,
    out_bus: u8,
    io_bus: u8,
}

impl PinBus {
    /// Creates a bus register with every bit low.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_bus: 0,
            out_bus: 0,
            io_bus: 0,
        }
    }

    /// Drives one input pin high.
    pub const fn set(&mut self, pin: InputPin) {
        self.in_bus |= pin.mask();
    }

    /// Drives one input pin low.
    pub const fn clear(&mut self, pin: InputPin) {
        self.in_bus &= !pin.mask();
    }

    /// Returns `true` when the given input pin is currently driven high.
    #[must_use]
    pub const fn is_set(&self, pin: InputPin) -> bool {
        self.in_bus & pin.mask() != 0
    }

    /// Reads the full current byte of one bus.
    #[must_use]
    pub const fn read(&self, bus: Bus) -> u8 {
        match bus {
            Bus::Input => self.in_bus,
            Bus::Output => self.out_bus,
            Bus::Bidir => self.io_bus,
        }
    }

    /// Masks the 3-bit output selector field into the input bus.
    pub const fn write_selector(&mut self, selector: OutputSelector) {
        self.in_bus = (self.in_bus & !IN_OUT_CTRL_MASK) | selector.as_u3();
    }

    /// Device-side write of the full wide output bus.
    pub const fn drive_out(&mut self, value: u8) {
        self.out_bus = value;
    }

    /// Device-side write of the full bidirectional bus.
    pub const fn drive_io(&mut self, value: u8) {
        self.io_bus = value;
    }

    /// Samples the serial return bit driven by the device.
    #[must_use]
    pub const fn miso(&self) -> bool {
        self.io_bus & BidirPin::SpiMiso.mask() != 0
    }
}
