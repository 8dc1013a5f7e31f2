//! Advance reservation and ticketing timing validation of a permutation.
//!
//! Each fare usage of the new fare path is checked by the rule controller
//! under an [`AdvResOverride`]: the dates that replace the ticketing and
//! departure dates the advance reservation rule would otherwise measure.
//! Overrides come from the reissue sequence governing the exchanged fare
//! component mapped to the fare usage, or, when it has no advance
//! reservation data, from the pricing unit.

use crate::config::Config;
use crate::diag::{Diagnostic, NoOpDiagnostic};
use crate::model::reissue::{from_adv_res, to_adv_res, TKT_PRIOR_DEPARTURE, TKT_RESV_SIMULTANEOUS};
use crate::model::{
    ExchangeTrx, FarePath, FareUsage, PricingUnit, ReissueSequence, SequenceKey, TicketingPoint,
};
use crate::permutation::ProcessTagPermutation;
use crate::validation::ticketing::TicketingChecks;
use crate::validation::{RuleValidationController, UtcOffsetLookup};
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Dates and flags passed to the rule controller for one fare usage.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq, Serialize)]
pub struct AdvResOverride {
    pub from_date: Option<NaiveDateTime>,
    pub to_date: Option<NaiveDateTime>,
    pub ignore_tkt_after_res_restriction: bool,
    pub ignore_tkt_before_dept_restriction: bool,
    /// Sequence the dates were derived from.
    pub reissue_sequence: Option<SequenceKey>,
}

impl AdvResOverride {
    /// Dates come from a governing sequence's bytes 93-106 ("option N").
    /// Such overrides bypass the result cache even when one of the dates is
    /// missing; overrides built from pricing unit fallbacks are cached
    /// whether or not both dates are set.
    pub fn is_dated(&self) -> bool {
        self.reissue_sequence.is_some()
    }
}

/// Departure a dated override measures to when the sequence leaves the
/// to byte blank. Every eligible fare usage is validated in all scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationScope {
    /// Journey departure.
    Journey,
    /// Departure of the fare usage's pricing unit.
    PricingUnit,
    FareComponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSettings {
    pub domestic_grace_minutes: i64,
    pub adv_res_2012: bool,
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            domestic_grace_minutes: crate::config::DEFAULT_DOMESTIC_GRACE_MINUTES,
            adv_res_2012: false,
        }
    }
}

impl From<&Config> for TimingSettings {
    fn from(config: &Config) -> Self {
        TimingSettings {
            domestic_grace_minutes: config.domestic_grace_minutes(),
            adv_res_2012: config.adv_res_2012(),
        }
    }
}

/// Pricing unit and fare usage position within the fare path, plus the
/// override they were validated under.
type CacheKey = (usize, usize, AdvResOverride);

/// Timing validator for one fare path. Caches live as long as the
/// validator and are shared by every permutation it checks.
pub struct AdvResTktValidator<'a, C, U, D = NoOpDiagnostic> {
    trx: &'a ExchangeTrx,
    fare_path: &'a FarePath,
    controller: C,
    offsets: U,
    diag: D,
    settings: TimingSettings,
    from: TicketingPoint,
    from_for_not_mapped: Vec<NaiveDateTime>,
    cache: HashMap<CacheKey, bool>,
    checks: TicketingChecks,
}

impl<'a, C, U> AdvResTktValidator<'a, C, U, NoOpDiagnostic>
where
    C: RuleValidationController,
    U: UtcOffsetLookup,
{
    pub fn new(
        trx: &'a ExchangeTrx,
        fare_path: &'a FarePath,
        controller: C,
        offsets: U,
        settings: TimingSettings,
    ) -> Self {
        Self::with_diagnostic(trx, fare_path, controller, offsets, settings, NoOpDiagnostic)
    }
}

impl<'a, C, U, D> AdvResTktValidator<'a, C, U, D>
where
    C: RuleValidationController,
    U: UtcOffsetLookup,
    D: Diagnostic,
{
    pub fn with_diagnostic(
        trx: &'a ExchangeTrx,
        fare_path: &'a FarePath,
        controller: C,
        offsets: U,
        settings: TimingSettings,
        diag: D,
    ) -> Self {
        let mut validator = AdvResTktValidator {
            trx,
            fare_path,
            controller,
            offsets,
            diag,
            settings,
            from: trx.original_ticketing.clone(),
            from_for_not_mapped: Vec::new(),
            cache: HashMap::new(),
            checks: TicketingChecks::new(),
        };
        validator.permutation_independent_set_up();
        validator
    }

    /// Computes the from date shared by all permutations and the from date
    /// of each pricing unit for fare usages with no mapped sequence data.
    pub fn permutation_independent_set_up(&mut self) {
        let trx = self.trx;
        let point = trx
            .previous_exchange
            .as_ref()
            .unwrap_or(&trx.original_ticketing);
        self.from = TicketingPoint {
            date: self.to_reference_time(point.date, &point.location),
            location: point.location.clone(),
        };

        let ticketing_date = trx.ticketing.date;
        let from_date = self.from.date;
        self.from_for_not_mapped = self
            .fare_path
            .pricing_units
            .iter()
            .map(|pu| {
                if pu.fare_usages.iter().any(FareUsage::is_current_retrieved) {
                    ticketing_date
                } else {
                    from_date
                }
            })
            .collect();
    }

    pub fn permutation_independent_from(&self) -> &TicketingPoint {
        &self.from
    }

    pub fn from_date_for_not_mapped(&self, pu_index: usize) -> Option<NaiveDateTime> {
        self.from_for_not_mapped.get(pu_index).copied()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn diagnostic(&self) -> &D {
        &self.diag
    }

    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }

    pub fn validation_scope(&self, perm: &ProcessTagPermutation) -> ValidationScope {
        if self.settings.adv_res_2012 {
            return ValidationScope::FareComponent;
        }
        let mut indicators = perm
            .process_tags()
            .iter()
            .filter_map(|pti| pti.sequence())
            .map(|seq| seq.ticket_resv_ind);
        let same_indicator = match indicators.next() {
            Some(first) => indicators.all(|ind| ind == first),
            None => true,
        };
        if !same_indicator {
            ValidationScope::FareComponent
        } else if self.fare_path.fare_usages().all(|fu| fu.same_fare_break_and_carrier) {
            ValidationScope::Journey
        } else {
            ValidationScope::PricingUnit
        }
    }

    /// Validates every eligible fare usage of `perm`, stopping at the first
    /// failure.
    pub fn validate(&mut self, perm: &ProcessTagPermutation) -> bool {
        let scope = self.validation_scope(perm);
        let fare_path = self.fare_path;

        for (pu_index, pu) in fare_path.pricing_units.iter().enumerate() {
            for (fu_index, fu) in pu.fare_usages.iter().enumerate() {
                if fu.cat5_ignored_for_keep_fare {
                    continue;
                }
                if !self.validate_fare_usage(perm, scope, (pu_index, fu_index), pu, fu) {
                    debug!(
                        permutation = perm.number(),
                        ?scope,
                        pu = pu_index,
                        fare_market = %format!("{}-{}", fu.fare_market.board, fu.fare_market.off),
                        "timing validation failed"
                    );
                    return false;
                }
            }
        }
        true
    }

    fn validate_fare_usage(
        &mut self,
        perm: &ProcessTagPermutation,
        scope: ValidationScope,
        (pu_index, fu_index): (usize, usize),
        pu: &PricingUnit,
        fu: &FareUsage,
    ) -> bool {
        let trx = self.trx;
        let fare_path = self.fare_path;
        let sequence = fu
            .mapped_exc_fc
            .and_then(|n| trx.exc_fare_component(n))
            .and_then(|fc| perm.find_process_tag_info(&fc.fare_market))
            .and_then(|pti| pti.sequence());

        let mut adv_res = self.build_override(sequence, scope, pu_index, pu, fu);

        if let Some(seq) = sequence {
            if seq.ticket_resv_ind == TKT_RESV_SIMULTANEOUS {
                if !self
                    .checks
                    .simultaneous(trx, fare_path, self.settings.domestic_grace_minutes)
                {
                    self.diag.on_ticketing_check_failed("simultaneous");
                    return false;
                }
                adv_res.ignore_tkt_after_res_restriction = true;
            }
            if seq.departure_ind == TKT_PRIOR_DEPARTURE {
                if !self.checks.prior_of_departure(trx, fare_path) {
                    self.diag.on_ticketing_check_failed("prior of departure");
                    return false;
                }
                adv_res.ignore_tkt_before_dept_restriction = true;
            }
        }

        let market = format!("{}-{}", fu.fare_market.board, fu.fare_market.off);
        self.diag.on_adv_res_override(&market, &adv_res);

        if adv_res.is_dated() {
            return self.controller.validate(trx, fare_path, pu, fu, &adv_res);
        }

        let key = (pu_index, fu_index, adv_res);
        if let Some(&hit) = self.cache.get(&key) {
            self.diag.on_adv_res_cache_hit(&key.2, hit);
            return hit;
        }
        let valid = self.controller.validate(trx, fare_path, pu, fu, &key.2);
        self.cache.insert(key, valid);
        valid
    }

    fn build_override(
        &self,
        sequence: Option<&ReissueSequence>,
        scope: ValidationScope,
        pu_index: usize,
        pu: &PricingUnit,
        fu: &FareUsage,
    ) -> AdvResOverride {
        match sequence.filter(|seq| seq.has_adv_res_data()) {
            Some(seq) => AdvResOverride {
                from_date: Some(self.override_from_date(seq, fu)),
                to_date: self.override_to_date(seq, scope, pu, fu),
                reissue_sequence: Some(seq.key()),
                ..AdvResOverride::default()
            },
            None => AdvResOverride {
                from_date: self.from_date_for_not_mapped(pu_index),
                to_date: pu
                    .departure()
                    .map(|d| self.to_reference_time(d, pu.origin().unwrap_or_default())),
                ..AdvResOverride::default()
            },
        }
    }

    fn override_from_date(&self, seq: &ReissueSequence, fu: &FareUsage) -> NaiveDateTime {
        let new_ticket = self.trx.ticketing.date;
        let original = self.from.date;
        match seq.from_adv_res_ind {
            from_adv_res::OUTBOUND_CHANGED if self.trx.outbound_changed() => new_ticket,
            from_adv_res::RETRIEVAL_TYPE if fu.is_current_retrieved() => new_ticket,
            from_adv_res::NEW_TICKET_DATE => new_ticket,
            _ => original,
        }
    }

    fn override_to_date(
        &self,
        seq: &ReissueSequence,
        scope: ValidationScope,
        pu: &PricingUnit,
        fu: &FareUsage,
    ) -> Option<NaiveDateTime> {
        let target = match seq.to_adv_res_ind {
            to_adv_res::JOURNEY => ValidationScope::Journey,
            to_adv_res::PRICING_UNIT => ValidationScope::PricingUnit,
            to_adv_res::FARE_COMPONENT => ValidationScope::FareComponent,
            _ => scope,
        };
        let (departure, origin) = match target {
            ValidationScope::Journey => (self.fare_path.departure(), self.fare_path.origin()),
            ValidationScope::PricingUnit => (pu.departure(), pu.origin()),
            ValidationScope::FareComponent => (fu.departure(), Some(fu.fare_market.origin())),
        };
        departure.map(|d| self.to_reference_time(d, origin.unwrap_or_default()))
    }

    /// Local time at `loc` expressed at the ticketing location.
    fn to_reference_time(&self, local: NaiveDateTime, loc: &str) -> NaiveDateTime {
        let reference = &self.trx.ticketing.location;
        if loc == reference.as_str() {
            return local;
        }
        self.offsets
            .offset_minutes(loc, reference, local)
            .map_or(local, |minutes| local + Duration::minutes(minutes))
    }
}
