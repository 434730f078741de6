//! Host-facing configuration, device boundary, and trace contracts.
//!
//! The simulated CPU system is an external collaborator consumed only
//! through [`BusDevice`]; the harness never looks inside it. All timing
//! values are fixed requirements of the device, not runtime-negotiated.

use crate::pin::PinBus;
use crate::word::SpiWord;

/// Default minimum hold, in scheduling cycles, for the SCK low phase.
pub const DEFAULT_SCK_LOW_HOLD_CYCLES: u32 = 4;
/// Default minimum hold, in scheduling cycles, for the SCK high phase.
pub const DEFAULT_SCK_HIGH_HOLD_CYCLES: u32 = 4;
/// Default hold between chip-select assertion and the first falling edge.
pub const DEFAULT_CS_ASSERT_HOLD_CYCLES: u32 = 1;
/// Default settle time at SPI idle levels before a transaction begins.
pub const DEFAULT_SPI_IDLE_SETUP_CYCLES: u32 = 16;
/// Default number of cycles the reset line is held low.
pub const DEFAULT_RESET_HOLD_CYCLES: u32 = 2;
/// Default overall scenario cycle budget.
pub const DEFAULT_CYCLE_BUDGET: u64 = 4096;

/// Fixed protocol timing and scheduling knobs for one harness instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct HarnessConfig {
    /// Minimum SCK low-phase hold (H1). The receiver latches on the rising
    /// edge that ends this window.
    pub sck_low_hold_cycles: u32,
    /// Minimum SCK high-phase hold (H2).
    pub sck_high_hold_cycles: u32,
    /// Hold between chip-select assertion and the first falling edge.
    pub cs_assert_hold_cycles: u32,
    /// Settle time at SPI idle levels before each transaction.
    pub spi_idle_setup_cycles: u32,
    /// Cycles the reset line is held low during the reset sequence.
    pub reset_hold_cycles: u32,
    /// Scenario-wide cycle budget; exceeding it fails the scenario.
    pub cycle_budget: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            sck_low_hold_cycles: DEFAULT_SCK_LOW_HOLD_CYCLES,
            sck_high_hold_cycles: DEFAULT_SCK_HIGH_HOLD_CYCLES,
            cs_assert_hold_cycles: DEFAULT_CS_ASSERT_HOLD_CYCLES,
            spi_idle_setup_cycles: DEFAULT_SPI_IDLE_SETUP_CYCLES,
            reset_hold_cycles: DEFAULT_RESET_HOLD_CYCLES,
            cycle_budget: DEFAULT_CYCLE_BUDGET,
        }
    }
}

/// Static control signals driven beside the three buses.
///
/// Device behavior while `reset_n` is low is undefined and must not be
/// asserted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControlLines {
    /// Active-low reset line.
    pub reset_n: bool,
    /// Device enable line, held high for the whole scenario.
    pub enable: bool,
}

impl Default for ControlLines {
    fn default() -> Self {
        Self {
            reset_n: true,
            enable: true,
        }
    }
}

/// Narrow boundary through which the external simulated device is consumed.
///
/// The sequencer calls this once per elapsed scheduling cycle. The device is
/// the exclusive mutator of the output bus and the bidirectional bus; the
/// harness-owned input bus must be treated as read-only here.
pub trait BusDevice {
    /// Reacts to one scheduling-clock cycle with the current line state.
    fn clock_cycle(&mut self, lines: ControlLines, pins: &mut PinBus);
}

/// Deterministic observation events emitted at sequencer boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Reset line driven low.
    ResetAsserted {
        /// Cycle count when the line fell.
        cycle: u64,
    },
    /// Reset line released high.
    ResetReleased {
        /// Cycle count when the line rose.
        cycle: u64,
    },
    /// A serial transaction left the Idle state.
    TransactionStarted {
        /// Cycle count at chip-select assertion.
        cycle: u64,
        /// Word being shifted out.
        word: SpiWord,
    },
    /// A serial transaction returned to the Idle state.
    TransactionCompleted {
        /// Cycle count at chip-select release.
        cycle: u64,
        /// Raw 16-bit value sampled from the return line.
        response_raw: u16,
    },
    /// A transaction targeted a region with undefined device-side meaning.
    ReservedAddressTargeted {
        /// Cycle count at chip-select assertion.
        cycle: u64,
        /// Offending 11-bit address.
        address: u16,
    },
    /// A scripted expectation matched the sampled bus state.
    CheckPassed {
        /// Cycle count when the sample was taken.
        cycle: u64,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Trace sink that discards every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
