//! Scripted scenario sequencing against the external device.
//!
//! A scenario is a flat ordered list of steps with no branching or retry:
//! the protocol is deterministic, so a mismatch cannot be cured without
//! re-running the whole scenario from reset. The sequencer is the single
//! logical thread of control; it mutates pins, then advances the device a
//! requested number of scheduling-clock cycles, then resumes.

use thiserror::Error;

use crate::api::{BusDevice, ControlLines, HarnessConfig, TraceEvent, TraceSink};
use crate::driver::{DriverError, SpiMasterDriver};
use crate::fault::FaultClass;
use crate::mux::{NarrowSource, OutputSample, OutputSelector, WideSource};
use crate::pin::{InputPin, PinBus};
use crate::word::SpiWord;

/// Which sampled field a scripted expectation checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusCheck {
    /// Full wide output byte.
    Wide,
    /// 3-bit narrow output value.
    Narrow,
    /// 4-bit device status nibble.
    State,
}

/// One scripted sequencer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScenarioStep {
    /// Issue the reset sequence: enable high, reset low for the configured
    /// hold, then released. Other harness-owned pin values are untouched.
    Reset,
    /// Drive one input pin high.
    Set(InputPin),
    /// Drive one input pin low.
    Clear(InputPin),
    /// Mask the output selector field into the input bus.
    SelectOutput(OutputSelector),
    /// Suspend for the given number of scheduling-clock cycles.
    Advance(u32),
    /// Transmit one full 16-bit transfer word.
    Transmit(SpiWord),
    /// Assert the current wide output byte.
    ExpectWide(u8),
    /// Assert the current narrow output value (bits 2..0).
    ExpectNarrow(u8),
    /// Assert the current device status nibble.
    ExpectState(u8),
    /// Assert the source pair the current selector exposes.
    ExpectSources(WideSource, NarrowSource),
}

/// Failures that terminate a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// A sampled bus value did not match the scripted expectation.
    #[error("cycle {cycle}: {check:?} check expected {expected:#04x}, observed {actual:#04x}")]
    CheckMismatch {
        /// Cycle count when the sample was taken.
        cycle: u64,
        /// Field the expectation checked.
        check: BusCheck,
        /// Scripted value.
        expected: u8,
        /// Sampled value.
        actual: u8,
    },
    /// The decoded source pair did not match the scripted expectation.
    #[error("cycle {cycle}: selector exposes {actual:?}, expected {expected:?}")]
    SourceMismatch {
        /// Cycle count when the sample was taken.
        cycle: u64,
        /// Scripted source pair.
        expected: (WideSource, NarrowSource),
        /// Decoded source pair.
        actual: (WideSource, NarrowSource),
    },
    /// The scenario did not complete within its cycle budget.
    #[error("cycle budget of {budget} cycles exceeded at cycle {cycle}")]
    CycleBudgetExceeded {
        /// Cycle count when the budget was crossed.
        cycle: u64,
        /// Configured budget.
        budget: u64,
    },
    /// The transaction driver reported a usage error.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl ScenarioError {
    /// Returns the taxonomy class for this error.
    #[must_use]
    pub const fn class(&self) -> FaultClass {
        match self {
            Self::CheckMismatch { .. }
            | Self::SourceMismatch { .. }
            | Self::CycleBudgetExceeded { .. } => FaultClass::Assertion,
            Self::Driver(error) => error.class(),
        }
    }
}

/// Summary of a completed scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ScenarioReport {
    /// Total scheduling-clock cycles elapsed.
    pub cycles: u64,
    /// Serial transactions completed.
    pub transactions: u32,
    /// Expectations that matched.
    pub checks_passed: u32,
}

/// Top-level orchestration of driver operations and bus samples.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer {
    pins: PinBus,
    driver: SpiMasterDriver,
    lines: ControlLines,
    config: HarnessConfig,
    cycle: u64,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Sequencer {
    /// Creates a sequencer with all buses low and the reset line released.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            pins: PinBus::new(),
            driver: SpiMasterDriver::new(),
            lines: ControlLines::default(),
            config,
            cycle: 0,
        }
    }

    /// Returns the current bus register state.
    #[must_use]
    pub const fn pins(&self) -> &PinBus {
        &self.pins
    }

    /// Returns the monotonic count of clock edges since scenario start.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns the most recent transaction response, once idle.
    #[must_use]
    pub const fn response_raw(&self) -> Option<u16> {
        self.driver.response_raw()
    }

    /// Returns the data nibble of the most recent transaction response.
    #[must_use]
    pub const fn response_data(&self) -> Option<u8> {
        self.driver.response_data()
    }

    /// Runs a scripted scenario to completion against `device`.
    ///
    /// Steps execute strictly in order; each step's effects are fully
    /// visible before the next step begins.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScenarioError`] encountered; the scenario is not
    /// retried.
    pub fn run(
        &mut self,
        steps: &[ScenarioStep],
        device: &mut dyn BusDevice,
        trace: &mut dyn TraceSink,
    ) -> Result<ScenarioReport, ScenarioError> {
        let mut report = ScenarioReport::default();

        for step in steps {
            match *step {
                ScenarioStep::Reset => self.reset(device, trace)?,
                ScenarioStep::Set(pin) => self.pins.set(pin),
                ScenarioStep::Clear(pin) => self.pins.clear(pin),
                ScenarioStep::SelectOutput(selector) => self.pins.write_selector(selector),
                ScenarioStep::Advance(cycles) => self.advance(u64::from(cycles), device)?,
                ScenarioStep::Transmit(word) => {
                    self.transmit(word, device, trace)?;
                    report.transactions += 1;
                }
                ScenarioStep::ExpectWide(expected) => {
                    let sample = OutputSample::capture(&self.pins);
                    self.check(BusCheck::Wide, expected, sample.wide, trace)?;
                    report.checks_passed += 1;
                }
                ScenarioStep::ExpectNarrow(expected) => {
                    let sample = OutputSample::capture(&self.pins);
                    self.check(BusCheck::Narrow, expected, sample.narrow, trace)?;
                    report.checks_passed += 1;
                }
                ScenarioStep::ExpectState(expected) => {
                    let sample = OutputSample::capture(&self.pins);
                    self.check(BusCheck::State, expected, sample.state, trace)?;
                    report.checks_passed += 1;
                }
                ScenarioStep::ExpectSources(wide, narrow) => {
                    let actual = OutputSample::capture(&self.pins).sources();
                    if actual != (wide, narrow) {
                        return Err(ScenarioError::SourceMismatch {
                            cycle: self.cycle,
                            expected: (wide, narrow),
                            actual,
                        });
                    }
                    trace.on_event(TraceEvent::CheckPassed { cycle: self.cycle });
                    report.checks_passed += 1;
                }
            }
        }

        report.cycles = self.cycle;
        Ok(report)
    }

    /// Reset protocol: enable high, reset low for the configured minimum,
    /// then released. Device behavior before release is undefined and is not
    /// sampled here.
    fn reset(
        &mut self,
        device: &mut dyn BusDevice,
        trace: &mut dyn TraceSink,
    ) -> Result<(), ScenarioError> {
        self.lines.enable = true;
        self.lines.reset_n = false;
        trace.on_event(TraceEvent::ResetAsserted { cycle: self.cycle });

        self.advance(u64::from(self.config.reset_hold_cycles), device)?;

        self.lines.reset_n = true;
        trace.on_event(TraceEvent::ResetReleased { cycle: self.cycle });
        Ok(())
    }

    fn transmit(
        &mut self,
        word: SpiWord,
        device: &mut dyn BusDevice,
        trace: &mut dyn TraceSink,
    ) -> Result<(), ScenarioError> {
        if word.region().is_reserved() {
            trace.on_event(TraceEvent::ReservedAddressTargeted {
                cycle: self.cycle,
                address: word.address(),
            });
        }

        self.driver.drive_idle_levels(&mut self.pins);
        self.advance(u64::from(self.config.spi_idle_setup_cycles), device)?;

        self.driver.begin_transaction(&mut self.pins, word)?;
        trace.on_event(TraceEvent::TransactionStarted {
            cycle: self.cycle,
            word,
        });
        self.advance(u64::from(self.config.cs_assert_hold_cycles), device)?;

        while let Some(phase) = self.driver.advance_phase(&mut self.pins, &self.config) {
            self.advance(u64::from(phase.hold_cycles), device)?;
        }

        if let Some(response_raw) = self.driver.response_raw() {
            trace.on_event(TraceEvent::TransactionCompleted {
                cycle: self.cycle,
                response_raw,
            });
        }
        Ok(())
    }

    /// Advances the scheduling clock, giving the device one reaction per
    /// elapsed cycle and enforcing the scenario budget.
    fn advance(&mut self, cycles: u64, device: &mut dyn BusDevice) -> Result<(), ScenarioError> {
        for _ in 0..cycles {
            self.cycle += 1;
            if self.cycle > self.config.cycle_budget {
                return Err(ScenarioError::CycleBudgetExceeded {
                    cycle: self.cycle,
                    budget: self.config.cycle_budget,
                });
            }
            device.clock_cycle(self.lines, &mut self.pins);
        }
        Ok(())
    }

    fn check(
        &self,
        check: BusCheck,
        expected: u8,
        actual: u8,
        trace: &mut dyn TraceSink,
    ) -> Result<(), ScenarioError> {
        if expected != actual {
            return Err(ScenarioError::CheckMismatch {
                cycle: self.cycle,
                check,
                expected,
                actual,
            });
        }
        trace.on_event(TraceEvent::CheckPassed { cycle: self.cycle });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BusCheck, ScenarioError, ScenarioStep, Sequencer};
    use crate::api::{BusDevice, ControlLines, HarnessConfig, NullTraceSink, TraceEvent};
    use crate::pin::{InputPin, PinBus};
    use crate::word::{SpiWord, TransferDirection};

    /// Device that only mirrors its enable/reset lines into a call log.
    #[derive(Default)]
    struct InertDevice {
        cycles_seen: u64,
        reset_low_cycles: u64,
    }

    impl BusDevice for InertDevice {
        fn clock_cycle(&mut self, lines: ControlLines, _pins: &mut PinBus) {
            self.cycles_seen += 1;
            if !lines.reset_n {
                self.reset_low_cycles += 1;
            }
        }
    }

    #[test]
    fn reset_holds_the_line_low_for_the_configured_minimum() {
        let mut sequencer = Sequencer::default();
        let mut device = InertDevice::default();
        let mut trace = Vec::new();

        let report = sequencer
            .run(&[ScenarioStep::Reset], &mut device, &mut trace)
            .expect("reset scenario succeeds");

        assert_eq!(device.reset_low_cycles, 2);
        assert_eq!(report.cycles, 2);
        assert_eq!(
            trace,
            vec![
                TraceEvent::ResetAsserted { cycle: 0 },
                TraceEvent::ResetReleased { cycle: 2 },
            ]
        );
    }

    #[test]
    fn reset_does_not_disturb_other_harness_pins() {
        let mut sequencer = Sequencer::default();
        let mut device = InertDevice::default();

        let steps = [
            ScenarioStep::Set(InputPin::Run),
            ScenarioStep::Set(InputPin::Mode),
            ScenarioStep::Reset,
        ];
        sequencer
            .run(&steps, &mut device, &mut NullTraceSink)
            .expect("scenario succeeds");

        assert!(sequencer.pins().is_set(InputPin::Run));
        assert!(sequencer.pins().is_set(InputPin::Mode));
    }

    #[test]
    fn advance_gives_the_device_one_reaction_per_cycle() {
        let mut sequencer = Sequencer::default();
        let mut device = InertDevice::default();

        sequencer
            .run(
                &[ScenarioStep::Advance(7), ScenarioStep::Advance(3)],
                &mut device,
                &mut NullTraceSink,
            )
            .expect("scenario succeeds");

        assert_eq!(device.cycles_seen, 10);
        assert_eq!(sequencer.cycle(), 10);
    }

    #[test]
    fn exceeding_the_cycle_budget_fails_without_retry() {
        let config = HarnessConfig {
            cycle_budget: 5,
            ..HarnessConfig::default()
        };
        let mut sequencer = Sequencer::new(config);
        let mut device = InertDevice::default();

        let err = sequencer
            .run(&[ScenarioStep::Advance(9)], &mut device, &mut NullTraceSink)
            .expect_err("budget must trip");

        assert_eq!(
            err,
            ScenarioError::CycleBudgetExceeded { cycle: 6, budget: 5 }
        );
        assert_eq!(device.cycles_seen, 5);
    }

    #[test]
    fn mismatched_expectation_terminates_the_scenario() {
        let mut sequencer = Sequencer::default();
        let mut device = InertDevice::default();

        let steps = [ScenarioStep::ExpectWide(0x55), ScenarioStep::Advance(1)];
        let err = sequencer
            .run(&steps, &mut device, &mut NullTraceSink)
            .expect_err("wide bus is idle low");

        assert_eq!(
            err,
            ScenarioError::CheckMismatch {
                cycle: 0,
                check: BusCheck::Wide,
                expected: 0x55,
                actual: 0x00,
            }
        );
        // Steps after the mismatch never ran.
        assert_eq!(device.cycles_seen, 0);
    }

    #[test]
    fn transmit_reports_reserved_addresses_without_rejecting_them() {
        let mut sequencer = Sequencer::default();
        let mut device = InertDevice::default();
        let mut trace = Vec::new();

        let word = SpiWord::new(TransferDirection::Write, 0x123, 0x0).expect("fields in range");
        let report = sequencer
            .run(&[ScenarioStep::Transmit(word)], &mut device, &mut trace)
            .expect("reserved targets are legal wire values");

        assert_eq!(report.transactions, 1);
        assert!(trace.contains(&TraceEvent::ReservedAddressTargeted {
            cycle: 0,
            address: 0x123,
        }));
    }

    #[test]
    fn transmit_cycle_cost_matches_the_configured_holds() {
        let config = HarnessConfig::default();
        let mut sequencer = Sequencer::new(config);
        let mut device = InertDevice::default();

        let word = SpiWord::new(TransferDirection::Write, 0x000, 0x7).expect("fields in range");
        let report = sequencer
            .run(&[ScenarioStep::Transmit(word)], &mut device, &mut NullTraceSink)
            .expect("scenario succeeds");

        let expected = u64::from(config.spi_idle_setup_cycles)
            + u64::from(config.cs_assert_hold_cycles)
            + 16 * u64::from(config.sck_low_hold_cycles)
            + 16 * u64::from(config.sck_high_hold_cycles)
            + 1;
        assert_eq!(report.cycles, expected);
    }
}
