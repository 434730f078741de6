//! Bit-banged SPI master transaction driver.
//!
//! The driver owns no clock: it performs one pin mutation per call and
//! reports the minimum hold the caller must schedule before the next call.
//! SCK and chip-select both idle high. One transaction shifts exactly 16
//! bits MSB-first and is atomic; beginning another transaction while one is
//! in flight is a precondition failure, never retried.
//!
//! The driver performs no runtime timing checks. Advancing fewer cycles
//! than a returned hold leaves device behavior undefined by the device's
//! own contract, outside this driver's scope.

use thiserror::Error;

use crate::api::HarnessConfig;
use crate::fault::FaultClass;
use crate::pin::{InputPin, PinBus};
use crate::word::{SpiWord, TRANSFER_BITS};

/// Index of the last bit of a transfer.
const LAST_BIT: u8 = 15;
const _: () = assert!(LAST_BIT as usize == TRANSFER_BITS - 1);

/// Driver state machine phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverPhase {
    /// Chip-select deasserted, clock at its idle high level.
    #[default]
    Idle,
    /// Chip-select driven low, first bit pre-set on the data line.
    Asserted,
    /// Clock held low while the indexed bit is stable on the data line.
    BitLow(u8),
    /// Clock held high; the next bit has been pre-loaded on the data line.
    BitHigh(u8),
}

/// Usage errors reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DriverError {
    /// A transaction was begun while a previous one was still in flight.
    #[error("transaction begun while driver is mid-transaction")]
    TransactionInProgress,
}

impl DriverError {
    /// Returns the taxonomy class for this error.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::TransactionInProgress => FaultClass::Precondition,
        }
    }
}

/// One pin mutation's scheduling requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhaseStep {
    /// Minimum scheduling cycles to hold before the next phase call.
    pub hold_cycles: u32,
    /// `true` once the transaction has returned the driver to Idle.
    pub completed: bool,
}

/// Clocked stimulus generator for one [`SpiWord`] per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpiMasterDriver {
    phase: DriverPhase,
    bits: [bool; TRANSFER_BITS],
    miso_accum: u16,
    response: Option<u16>,
}

impl SpiMasterDriver {
    /// Creates a driver in the Idle phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Returns `true` when no transaction is in flight.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, DriverPhase::Idle)
    }

    /// Drives the bus to SPI idle levels (SCK, CS, and MOSI all high).
    ///
    /// Matches the level the original stimulus settles at before the first
    /// transaction. Only meaningful while Idle; pins are untouched otherwise.
    pub fn drive_idle_levels(&self, pins: &mut PinBus) {
        if self.is_idle() {
            pins.set(InputPin::SpiSck);
            pins.set(InputPin::SpiCs);
            pins.set(InputPin::SpiMosi);
        }
    }

    /// Begins a transaction: asserts chip-select and pre-sets the first bit.
    ///
    /// The clock is left at its idle high level; the caller schedules the
    /// configured chip-select hold before the first [`Self::advance_phase`].
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::TransactionInProgress`] when the driver is not
    /// Idle. No pins are touched in that case.
    pub fn begin_transaction(
        &mut self,
        pins: &mut PinBus,
        word: SpiWord,
    ) -> Result<(), DriverError> {
        if !self.is_idle() {
            return Err(DriverError::TransactionInProgress);
        }

        self.bits = word.to_bits();
        self.miso_accum = 0;
        self.response = None;

        pins.set(InputPin::SpiSck);
        pins.clear(InputPin::SpiCs);
        Self::drive_mosi(pins, self.bits[0]);
        self.phase = DriverPhase::Asserted;
        Ok(())
    }

    /// Performs the next clock-phase pin mutation.
    ///
    /// Returns `None` while Idle. Falling edges start a low phase with the
    /// current bit held stable; rising edges sample the return line and
    /// pre-load the next bit at least one scheduling cycle before the edge
    /// that will launch it. The sixteenth high phase deasserts chip-select
    /// and completes the transaction.
    pub fn advance_phase(&mut self, pins: &mut PinBus, config: &HarnessConfig) -> Option<PhaseStep> {
        match self.phase {
            DriverPhase::Idle => None,
            DriverPhase::Asserted => {
                pins.clear(InputPin::SpiSck);
                self.phase = DriverPhase::BitLow(0);
                Some(PhaseStep {
                    hold_cycles: config.sck_low_hold_cycles,
                    completed: false,
                })
            }
            DriverPhase::BitLow(index) => {
                self.miso_accum = (self.miso_accum << 1) | u16::from(pins.miso());
                pins.set(InputPin::SpiSck);
                if index < LAST_BIT {
                    Self::drive_mosi(pins, self.bits[usize::from(index) + 1]);
                }
                self.phase = DriverPhase::BitHigh(index);
                Some(PhaseStep {
                    hold_cycles: config.sck_high_hold_cycles,
                    completed: false,
                })
            }
            DriverPhase::BitHigh(index) if index < LAST_BIT => {
                pins.clear(InputPin::SpiSck);
                self.phase = DriverPhase::BitLow(index + 1);
                Some(PhaseStep {
                    hold_cycles: config.sck_low_hold_cycles,
                    completed: false,
                })
            }
            DriverPhase::BitHigh(_) => {
                pins.set(InputPin::SpiCs);
                self.response = Some(self.miso_accum);
                self.phase = DriverPhase::Idle;
                // One cycle for the device to observe the release.
                Some(PhaseStep {
                    hold_cycles: 1,
                    completed: true,
                })
            }
        }
    }

    /// Returns the raw 16-bit word sampled from the return line by the most
    /// recently completed transaction.
    #[must_use]
    pub const fn response_raw(&self) -> Option<u16> {
        self.response
    }

    /// Returns the data nibble of the most recent response.
    ///
    /// The device shifts read data into the trailing four bit-times of the
    /// transfer, so the reply nibble lands in the data field positions.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn response_data(&self) -> Option<u8> {
        match self.response {
            Some(raw) => Some((raw & 0x000F) as u8),
            None => None,
        }
    }

    const fn drive_mosi(pins: &mut PinBus, level: bool) {
        if level {
            pins.set(InputPin::SpiMosi);
        } else {
            pins.clear(InputPin::SpiMosi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DriverError, DriverPhase, SpiMasterDriver};
    use crate::api::HarnessConfig;
    use crate::pin::{BidirPin, InputPin, PinBus};
    use crate::word::{SpiWord, TransferDirection, TRANSFER_BITS};

    fn test_word() -> SpiWord {
        SpiWord::new(TransferDirection::Write, 0x2A5, 0x9).expect("fields in range")
    }

    #[test]
    fn begin_while_busy_is_a_precondition_failure() {
        let mut pins = PinBus::new();
        let mut driver = SpiMasterDriver::new();

        driver
            .begin_transaction(&mut pins, test_word())
            .expect("driver starts idle");
        assert_eq!(
            driver.begin_transaction(&mut pins, test_word()),
            Err(DriverError::TransactionInProgress)
        );
    }

    #[test]
    fn transaction_clocks_sixteen_low_high_pairs_then_returns_to_idle() {
        let mut pins = PinBus::new();
        let mut driver = SpiMasterDriver::new();
        let config = HarnessConfig::default();

        driver.drive_idle_levels(&mut pins);
        driver
            .begin_transaction(&mut pins, test_word())
            .expect("driver starts idle");
        assert!(!pins.is_set(InputPin::SpiCs));
        assert!(pins.is_set(InputPin::SpiSck));

        let mut low_phases = 0;
        let mut high_phases = 0;
        let mut last = None;
        while let Some(step) = driver.advance_phase(&mut pins, &config) {
            match driver.phase() {
                DriverPhase::BitLow(_) => {
                    low_phases += 1;
                    assert!(!pins.is_set(InputPin::SpiSck));
                    assert_eq!(step.hold_cycles, config.sck_low_hold_cycles);
                }
                DriverPhase::BitHigh(_) => {
                    high_phases += 1;
                    assert!(pins.is_set(InputPin::SpiSck));
                    assert_eq!(step.hold_cycles, config.sck_high_hold_cycles);
                }
                DriverPhase::Idle => {}
                DriverPhase::Asserted => unreachable!("asserted is never re-entered"),
            }
            if !step.completed {
                assert!(!pins.is_set(InputPin::SpiCs), "CS must stay low mid-transfer");
            }
            last = Some(step);
        }

        assert_eq!(low_phases, TRANSFER_BITS);
        assert_eq!(high_phases, TRANSFER_BITS);
        assert!(last.expect("at least one phase").completed);
        assert!(driver.is_idle());
        assert!(pins.is_set(InputPin::SpiCs));
        assert!(pins.is_set(InputPin::SpiSck));
    }

    #[test]
    fn mosi_follows_word_bits_and_changes_only_at_rising_edges() {
        let mut pins = PinBus::new();
        let mut driver = SpiMasterDriver::new();
        let config = HarnessConfig::default();
        let word = test_word();
        let bits = word.to_bits();

        driver
            .begin_transaction(&mut pins, word)
            .expect("driver starts idle");
        assert_eq!(pins.is_set(InputPin::SpiMosi), bits[0]);

        let mut observed = Vec::new();
        while let Some(_step) = driver.advance_phase(&mut pins, &config) {
            if let DriverPhase::BitLow(index) = driver.phase() {
                // Entire low phase: values must match the indexed word bit.
                assert_eq!(pins.is_set(InputPin::SpiMosi), bits[usize::from(index)]);
                observed.push(pins.is_set(InputPin::SpiMosi));
            }
        }

        assert_eq!(observed, bits.to_vec());
    }

    #[test]
    fn response_collects_miso_samples_msb_first() {
        let mut pins = PinBus::new();
        let mut driver = SpiMasterDriver::new();
        let config = HarnessConfig::default();

        driver
            .begin_transaction(&mut pins, test_word())
            .expect("driver starts idle");
        assert_eq!(driver.response_raw(), None);

        // Drive the return line high during low phases of bits 12..=15 the
        // way the device replies with data nibble 0xF.
        while let Some(_step) = driver.advance_phase(&mut pins, &config) {
            if let DriverPhase::BitLow(index) = driver.phase() {
                if index >= 12 {
                    pins.drive_io(BidirPin::SpiMiso.mask());
                } else {
                    pins.drive_io(0);
                }
            }
        }

        assert_eq!(driver.response_raw(), Some(0x000F));
        assert_eq!(driver.response_data(), Some(0xF));
    }
}
