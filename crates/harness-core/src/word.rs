//! 16-bit SPI transfer-word codec.
//!
//! Bit layout is fixed: bit 15 carries the read/write flag, bits 14..4 the
//! 11-bit address (MSB first), bits 3..0 the 4-bit data nibble. A transaction
//! always carries exactly [`TRANSFER_BITS`] bits; no partial words exist.

use thiserror::Error;

use crate::fault::FaultClass;
use crate::space::{classify_address, AddressRegion, ADDRESS_MASK};

/// Number of bits in one serial transfer.
pub const TRANSFER_BITS: usize = 16;
/// Mask selecting the valid 4-bit data domain.
pub const DATA_MASK: u8 = 0x0F;

/// Transfer direction carried in bit 15 of the wire word.
///
/// The original stimulus writes the STOP opcode with the flag low, so low
/// means write and high means read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum TransferDirection {
    /// Load a nibble into the addressed location.
    #[default]
    Write = 0,
    /// Request the addressed location's nibble on the return line.
    Read = 1,
}

/// Field-validation errors raised by [`SpiWord::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SpiWordError {
    /// Address does not fit the 11-bit field.
    #[error("address {0:#05x} does not fit in 11 bits")]
    AddressOverflow(u16),
    /// Data does not fit the 4-bit field.
    #[error("data {0:#04x} does not fit in 4 bits")]
    DataOverflow(u8),
}

impl SpiWordError {
    /// Returns the taxonomy class for this error.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::AddressOverflow(_) | Self::DataOverflow(_) => FaultClass::Precondition,
        }
    }
}

/// One well-formed 16-bit transfer word.
///
/// The field invariants (11-bit address, 4-bit data) hold by construction;
/// decoding from the wire is total because every 16-bit pattern is a valid
/// word under the fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SpiWord {
    direction: TransferDirection,
    address: u16,
    data: u8,
}

impl SpiWord {
    /// Creates a transfer word, validating the field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SpiWordError::AddressOverflow`] when `address` exceeds the
    /// 11-bit domain and [`SpiWordError::DataOverflow`] when `data` exceeds
    /// the 4-bit domain.
    pub const fn new(
        direction: TransferDirection,
        address: u16,
        data: u8,
    ) -> Result<Self, SpiWordError> {
        if address > ADDRESS_MASK {
            return Err(SpiWordError::AddressOverflow(address));
        }
        if data > DATA_MASK {
            return Err(SpiWordError::DataOverflow(data));
        }

        Ok(Self {
            direction,
            address,
            data,
        })
    }

    /// Returns the transfer direction flag.
    #[must_use]
    pub const fn direction(self) -> TransferDirection {
        self.direction
    }

    /// Returns the 11-bit target address.
    #[must_use]
    pub const fn address(self) -> u16 {
        self.address
    }

    /// Returns the 4-bit data nibble.
    #[must_use]
    pub const fn data(self) -> u8 {
        self.data
    }

    /// Returns the fixed region the target address falls in.
    #[must_use]
    pub const fn region(self) -> AddressRegion {
        classify_address(self.address)
    }

    /// Packs the word into its 16-bit wire form.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn to_raw(self) -> u16 {
        let flag = match self.direction {
            TransferDirection::Write => 0u16,
            TransferDirection::Read => 1u16,
        };
        (flag << 15) | (self.address << 4) | (self.data as u16)
    }

    /// Unpacks a 16-bit wire word. Total and lossless for every pattern.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_raw(raw: u16) -> Self {
        let direction = if raw & 0x8000 != 0 {
            TransferDirection::Read
        } else {
            TransferDirection::Write
        };

        Self {
            direction,
            address: (raw >> 4) & ADDRESS_MASK,
            data: (raw & 0x000F) as u8,
        }
    }

    /// Serializes the word MSB-first into the transmit bit order.
    #[must_use]
    pub const fn to_bits(self) -> [bool; TRANSFER_BITS] {
        let raw = self.to_raw();
        let mut bits = [false; TRANSFER_BITS];
        let mut index = 0;
        while index < TRANSFER_BITS {
            bits[index] = raw & (1 << (15 - index)) != 0;
            index += 1;
        }
        bits
    }

    /// Rebuilds a word from an MSB-first transmit bit sequence.
    #[must_use]
    pub const fn from_bits(bits: [bool; TRANSFER_BITS]) -> Self {
        let mut raw = 0u16;
        let mut index = 0;
        while index < TRANSFER_BITS {
            if bits[index] {
                raw |= 1 << (15 - index);
            }
            index += 1;
        }
        Self::from_raw(raw)
    }
}
