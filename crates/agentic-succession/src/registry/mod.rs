//! Succession registry — inactivity policy and griefing-resistant execution.
//!
//! The registry module provides:
//! - The inactivity policy (successor, wait period, activity clock)
//! - Owner operations: configure once, update successor, rate-limited check-in
//! - Capacity-bounded execution that moves the original token first and
//!   leaves whatever does not fit for a later retry
//! - The `SuccessionPolicy` trait, the seam for other policy kinds

pub mod engine;
pub mod policy;

pub use engine::{RegistryState, SuccessionPlan, SuccessionRegistry, SuccessionReport};
pub use policy::{
    InactivityPolicy, SuccessionPolicy, WaitPeriod, LONG_WAIT_SECS, MIN_CHECK_IN_INTERVAL_SECS,
    SHORT_WAIT_SECS,
};
