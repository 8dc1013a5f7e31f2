//! Permutation validators and the collaborators they call out to.

pub mod adv_res;
pub mod penalty;
pub mod stopover;
pub mod ticketing;

pub use adv_res::{AdvResOverride, AdvResTktValidator, TimingSettings};
pub use penalty::{FeeApplScenario, PenaltyEstimator};
pub use stopover::{StopoverConnectionValidator, StopoverMismatch};
pub use ticketing::TicketingChecks;

use crate::model::{ExchangeTrx, FarePath, FareUsage, Money, PricingUnit};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Memoized boolean check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriState {
    #[default]
    NotProcessed,
    Valid,
    Invalid,
}

impl TriState {
    pub fn get(self) -> Option<bool> {
        match self {
            TriState::NotProcessed => None,
            TriState::Valid => Some(true),
            TriState::Invalid => Some(false),
        }
    }

    /// Returns the stored outcome, running `check` only the first time.
    pub fn resolve(&mut self, check: impl FnOnce() -> bool) -> bool {
        if let Some(done) = self.get() {
            return done;
        }
        let outcome = check();
        *self = TriState::from(outcome);
        outcome
    }
}

impl From<bool> for TriState {
    fn from(valid: bool) -> Self {
        if valid {
            TriState::Valid
        } else {
            TriState::Invalid
        }
    }
}

/// Generic rule category pipeline run for one fare usage under an
/// advance reservation override.
pub trait RuleValidationController {
    fn validate(
        &mut self,
        trx: &ExchangeTrx,
        fare_path: &FarePath,
        pu: &PricingUnit,
        fu: &FareUsage,
        adv_res: &AdvResOverride,
    ) -> bool;
}

impl<C: RuleValidationController + ?Sized> RuleValidationController for &mut C {
    fn validate(
        &mut self,
        trx: &ExchangeTrx,
        fare_path: &FarePath,
        pu: &PricingUnit,
        fu: &FareUsage,
        adv_res: &AdvResOverride,
    ) -> bool {
        (**self).validate(trx, fare_path, pu, fu, adv_res)
    }
}

/// Controller that accepts every override.
#[derive(Debug, Clone, Default)]
pub struct PassAllController;

impl RuleValidationController for PassAllController {
    fn validate(
        &mut self,
        _trx: &ExchangeTrx,
        _fare_path: &FarePath,
        _pu: &PricingUnit,
        _fu: &FareUsage,
        _adv_res: &AdvResOverride,
    ) -> bool {
        true
    }
}

pub trait CurrencyConverter {
    /// `None` when no rate is available; callers keep the amount unchanged.
    fn convert(&self, amount: &Money, target: &str) -> Option<Money>;
}

/// Converter backed by a fixed table of rates from one currency to another.
#[derive(Debug, Clone, Default)]
pub struct RateTableConverter {
    rates: HashMap<(String, String), Decimal>,
}

impl RateTableConverter {
    pub fn new() -> Self {
        RateTableConverter::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self
    }
}

impl CurrencyConverter for RateTableConverter {
    fn convert(&self, amount: &Money, target: &str) -> Option<Money> {
        if amount.currency == target {
            return Some(amount.clone());
        }
        let rate = self
            .rates
            .get(&(amount.currency.clone(), target.to_string()))?;
        Some(Money::new((amount.amount * rate).round_dp(2), target))
    }
}

pub trait UtcOffsetLookup {
    /// Minutes to add to a local time at `from_loc` to get the local time at
    /// `to_loc` at instant `at`.
    fn offset_minutes(&self, from_loc: &str, to_loc: &str, at: NaiveDateTime) -> Option<i64>;
}

/// Fixed UTC offsets per location, no daylight saving.
#[derive(Debug, Clone, Default)]
pub struct FixedOffsets {
    utc_offsets: HashMap<String, i64>,
}

impl FixedOffsets {
    pub fn new() -> Self {
        FixedOffsets::default()
    }

    pub fn with_location(mut self, loc: &str, utc_offset_minutes: i64) -> Self {
        self.utc_offsets.insert(loc.to_string(), utc_offset_minutes);
        self
    }
}

impl UtcOffsetLookup for FixedOffsets {
    fn offset_minutes(&self, from_loc: &str, to_loc: &str, _at: NaiveDateTime) -> Option<i64> {
        let from = self.utc_offsets.get(from_loc)?;
        let to = self.utc_offsets.get(to_loc)?;
        Some(to - from)
    }
}
