//! Output-bus multiplex decoding.
//!
//! The device time-shares its output buses across eight internal signal
//! sources. Three input-bus bits select which source pair is visible on the
//! 8-bit wide output bus and the 3-bit narrow field of the bidirectional
//! bus. Decoding is pure and used only for verification; it never mutates
//! bus state and depends on the three selector bits alone.

use crate::pin::{Bus, PinBus, IN_OUT_CTRL_MASK, IO_NARROW_MASK, IO_NARROW_SHIFT, IO_STATE_MASK};

/// 3-bit output selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum OutputSelector {
    Sel0 = 0,
    Sel1 = 1,
    Sel2 = 2,
    Sel3 = 3,
    Sel4 = 4,
    Sel5 = 5,
    Sel6 = 6,
    Sel7 = 7,
}

/// Internal sources multiplexed onto the 8-bit wide output bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WideSource {
    /// Most recent code-space write address.
    CodeWriteAddress,
    /// Most recent data-space write address.
    DataWriteAddress,
    /// Code-space access address register (program counter).
    ProgramCounter,
    /// Data-space access address register (data pointer).
    DataPointer,
}

/// Internal sources multiplexed onto the 3-bit narrow output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum NarrowSource {
    /// Low 3 bits of the code-space write data nibble.
    CodeWriteDataLow3,
    /// Low 3 bits of the code-space read data nibble.
    CodeReadDataLow3,
    /// Two zero bits above bit 0 of the code-space write data nibble.
    CodeWriteDataBit0,
    /// Two zero bits above bit 0 of the code-space read data nibble.
    CodeReadDataBit0,
}

/// Single source-of-truth selector table in ascending selector order.
///
/// Selectors 4 and 5 intentionally expose the same pair.
pub const SELECTOR_SOURCE_TABLE: &[(OutputSelector, WideSource, NarrowSource)] = &[
    (
        OutputSelector::Sel0,
        WideSource::CodeWriteAddress,
        NarrowSource::CodeWriteDataLow3,
    ),
    (
        OutputSelector::Sel1,
        WideSource::CodeWriteAddress,
        NarrowSource::CodeReadDataLow3,
    ),
    (
        OutputSelector::Sel2,
        WideSource::DataWriteAddress,
        NarrowSource::CodeWriteDataBit0,
    ),
    (
        OutputSelector::Sel3,
        WideSource::DataWriteAddress,
        NarrowSource::CodeReadDataBit0,
    ),
    (
        OutputSelector::Sel4,
        WideSource::ProgramCounter,
        NarrowSource::CodeReadDataLow3,
    ),
    (
        OutputSelector::Sel5,
        WideSource::ProgramCounter,
        NarrowSource::CodeReadDataLow3,
    ),
    (
        OutputSelector::Sel6,
        WideSource::DataPointer,
        NarrowSource::CodeWriteDataBit0,
    ),
    (
        OutputSelector::Sel7,
        WideSource::DataPointer,
        NarrowSource::CodeReadDataBit0,
    ),
];

impl OutputSelector {
    /// Converts a 3-bit selector value into a selector.
    #[must_use]
    pub const fn from_u3(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Sel0),
            1 => Some(Self::Sel1),
            2 => Some(Self::Sel2),
            3 => Some(Self::Sel3),
            4 => Some(Self::Sel4),
            5 => Some(Self::Sel5),
            6 => Some(Self::Sel6),
            7 => Some(Self::Sel7),
            _ => None,
        }
    }

    /// Extracts the selector from the three fixed input-bus bits. Total.
    #[must_use]
    pub const fn from_in_bus(in_bus: u8) -> Self {
        match Self::from_u3(in_bus & IN_OUT_CTRL_MASK) {
            Some(selector) => selector,
            // The masked field cannot exceed 7.
            None => Self::Sel0,
        }
    }

    /// Returns the raw 3-bit selector value.
    #[must_use]
    pub const fn as_u3(self) -> u8 {
        self as u8
    }

    /// Returns the source pair this selector exposes.
    #[must_use]
    pub const fn sources(self) -> (WideSource, NarrowSource) {
        match self {
            Self::Sel0 => (WideSource::CodeWriteAddress, NarrowSource::CodeWriteDataLow3),
            Self::Sel1 => (WideSource::CodeWriteAddress, NarrowSource::CodeReadDataLow3),
            Self::Sel2 => (WideSource::DataWriteAddress, NarrowSource::CodeWriteDataBit0),
            Self::Sel3 => (WideSource::DataWriteAddress, NarrowSource::CodeReadDataBit0),
            Self::Sel4 | Self::Sel5 => {
                (WideSource::ProgramCounter, NarrowSource::CodeReadDataLow3)
            }
            Self::Sel6 => (WideSource::DataPointer, NarrowSource::CodeWriteDataBit0),
            Self::Sel7 => (WideSource::DataPointer, NarrowSource::CodeReadDataBit0),
        }
    }
}

/// One instantaneous sample of the device-driven buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OutputSample {
    /// Selector the harness was driving when the sample was taken.
    pub selector: OutputSelector,
    /// Full wide output byte.
    pub wide: u8,
    /// 3-bit narrow output value, shifted down to bits 2..0.
    pub narrow: u8,
    /// 4-bit device status nibble.
    pub state: u8,
}

impl OutputSample {
    /// Captures the current device-driven bus state.
    #[must_use]
    pub const fn capture(pins: &PinBus) -> Self {
        let io = pins.read(Bus::Bidir);
        Self {
            selector: OutputSelector::from_in_bus(pins.read(Bus::Input)),
            wide: pins.read(Bus::Output),
            narrow: (io & IO_NARROW_MASK) >> IO_NARROW_SHIFT,
            state: io & IO_STATE_MASK,
        }
    }

    /// Returns the source pair the sampled values belong to.
    #[must_use]
    pub const fn sources(self) -> (WideSource, NarrowSource) {
        self.selector.sources()
    }
}
