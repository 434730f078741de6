//! Harness fault taxonomy.
//!
//! Each error type in the crate maps into one of these classes so reports
//! can aggregate failures by kind. Timing violations deliberately have no
//! runtime representation: advancing fewer cycles than a minimum hold is a
//! caller bug that only the waveform property tests can observe, because the
//! driver never checks elapsed cycles itself.

/// Failure classes for harness-side errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Usage error detected before any pin was touched.
    Precondition,
    /// Minimum-hold violation; never detected at runtime, test-only concern.
    Timing,
    /// Address fell in a region with undefined device-side meaning.
    Classification,
    /// Sampled bus state did not match the scripted expectation.
    Assertion,
}
