//! Pin-level verification harness for the SPI-programmed nibble CPU system.
//!
//! The CPU system itself is an external collaborator consumed through the
//! [`BusDevice`] boundary. This crate owns the reproducible part of the
//! bench: the bit-banged SPI master protocol, the transfer-word and
//! address-space rules it honors, and the output-bus multiplex decoding a
//! verifier applies to sampled pins.

/// Fixed pin layout and the three-bus register model.
pub mod pin;
pub use pin::{
    BidirPin, Bus, InputPin, PinBus, IN_OUT_CTRL_MASK, IO_MISO_MASK, IO_NARROW_MASK,
    IO_NARROW_SHIFT, IO_STATE_MASK,
};

/// Fixed 11-bit address-space map and classification helpers.
pub mod space;
pub use space::{
    classify_address, AddressRegion, RegionDescriptor, ADDRESS_BITS, ADDRESS_MASK, CODE_END,
    CODE_START, DATA_END, DATA_START, FIXED_ADDRESS_REGIONS, RESERVED_HIGH_END,
    RESERVED_HIGH_START, RESERVED_LOW_END, RESERVED_LOW_START,
};

/// 16-bit SPI transfer-word codec.
pub mod word;
pub use word::{SpiWord, SpiWordError, TransferDirection, DATA_MASK, TRANSFER_BITS};

/// Harness fault taxonomy.
pub mod fault;
pub use fault::FaultClass;

/// Host-facing configuration, device boundary, and trace contracts.
pub mod api;
pub use api::{
    BusDevice, ControlLines, HarnessConfig, NullTraceSink, TraceEvent, TraceSink,
    DEFAULT_CS_ASSERT_HOLD_CYCLES, DEFAULT_CYCLE_BUDGET, DEFAULT_RESET_HOLD_CYCLES,
    DEFAULT_SCK_HIGH_HOLD_CYCLES, DEFAULT_SCK_LOW_HOLD_CYCLES, DEFAULT_SPI_IDLE_SETUP_CYCLES,
};

/// Bit-banged SPI master transaction driver.
pub mod driver;
pub use driver::{DriverError, DriverPhase, PhaseStep, SpiMasterDriver};

/// Output-bus multiplex decoding.
pub mod mux;
pub use mux::{NarrowSource, OutputSample, OutputSelector, WideSource, SELECTOR_SOURCE_TABLE};

/// Scripted scenario sequencing against the external device.
pub mod scenario;
pub use scenario::{BusCheck, ScenarioError, ScenarioReport, ScenarioStep, Sequencer};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
