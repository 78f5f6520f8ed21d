//! Inactivity policy: successor, wait period, activity clock.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuccessionError};
use crate::identity::Address;
use crate::time::days;

/// Inactivity required before a short-period policy becomes claimable.
pub const SHORT_WAIT_SECS: u64 = days(180);

/// Inactivity required before a long-period policy becomes claimable.
pub const LONG_WAIT_SECS: u64 = days(365);

/// Minimum spacing between check-ins (and between configuration and the
/// first check-in).
pub const MIN_CHECK_IN_INTERVAL_SECS: u64 = days(7);

/// How long the owner must stay inactive before succession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPeriod {
    /// About six months.
    Short,
    /// About one year.
    Long,
}

impl WaitPeriod {
    pub fn duration_secs(&self) -> u64 {
        match self {
            Self::Short => SHORT_WAIT_SECS,
            Self::Long => LONG_WAIT_SECS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for WaitPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WaitPeriod {
    type Err = SuccessionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "short" | "180d" => Ok(Self::Short),
            "long" | "365d" => Ok(Self::Long),
            other => Err(SuccessionError::SerializationError(format!(
                "unknown wait period '{other}' (expected short or long)"
            ))),
        }
    }
}

/// A configured inactivity policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityPolicy {
    pub successor: Address,
    pub wait_period: WaitPeriod,
    /// Last proof of owner activity (configure, successor update, check-in).
    pub last_activity: u64,
}

impl InactivityPolicy {
    pub fn new(successor: Address, wait_period: WaitPeriod, now: u64) -> Self {
        Self {
            successor,
            wait_period,
            last_activity: now,
        }
    }

    /// First instant at which the successor may execute.
    pub fn claimable_at(&self) -> u64 {
        self.last_activity
            .saturating_add(self.wait_period.duration_secs())
    }

    /// First instant at which the owner may check in again.
    pub fn next_check_in_at(&self) -> u64 {
        self.last_activity
            .saturating_add(MIN_CHECK_IN_INTERVAL_SECS)
    }

    /// Record owner activity.
    pub fn touch(&mut self, now: u64) {
        self.last_activity = now;
    }
}

/// Decides who may trigger succession and when.
///
/// Execution re-evaluates `check_conditions` on every attempt; nothing about
/// an earlier evaluation is cached.
pub trait SuccessionPolicy {
    /// The only address allowed to execute.
    fn successor(&self) -> Address;

    /// First instant at which conditions hold, if the clock is still running.
    fn claimable_at(&self) -> u64;

    /// Fail unless `caller` may execute at `now`.
    fn check_conditions(&self, caller: Address, now: u64) -> Result<()> {
        if caller != self.successor() {
            return Err(SuccessionError::Unauthorized(caller));
        }
        let claimable_at = self.claimable_at();
        if now < claimable_at {
            return Err(SuccessionError::ConditionsNotMet { claimable_at, now });
        }
        Ok(())
    }
}

impl SuccessionPolicy for InactivityPolicy {
    fn successor(&self) -> Address {
        self.successor
    }

    fn claimable_at(&self) -> u64 {
        InactivityPolicy::claimable_at(self)
    }
}
