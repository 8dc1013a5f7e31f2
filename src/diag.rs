//! Diagnostic hook: injectable sink for trace output of the validators.
//!
//! Validators call the hook at each decision point; formatting is left to
//! the implementation. Every method defaults to a no-op.

use crate::model::{FareApplication, FcChangeStatus};
use crate::permutation::{ProcessTagInfo, ProcessTagPermutation, ReissueCharges};
use crate::validation::adv_res::AdvResOverride;
use crate::validation::stopover::StopoverMismatch;
use tracing::debug;

pub trait Diagnostic {
    /// Rule bytes of a permutation are available through its accessors.
    fn on_rule_bytes_resolved(&mut self, _perm: &ProcessTagPermutation) {}

    /// Tag war outcome for one change status.
    fn on_tag_war_winner(
        &mut self,
        _permutation: u32,
        _status: FcChangeStatus,
        _fare_appl: FareApplication,
        _winner: Option<&ProcessTagInfo>,
    ) {
    }

    /// A permutation was excluded by an earlier stop byte.
    fn on_permutation_skipped(&mut self, _permutation: u32, _stopped_by: u32) {}

    /// An advance reservation override was built for a fare usage.
    fn on_adv_res_override(&mut self, _fare_market: &str, _adv_res: &AdvResOverride) {}

    /// A cached rule controller result was reused.
    fn on_adv_res_cache_hit(&mut self, _adv_res: &AdvResOverride, _result: bool) {}

    /// A ticketing timing check failed before the rule controller ran.
    fn on_ticketing_check_failed(&mut self, _check: &str) {}

    /// Stopover or connection points differ between the itineraries.
    fn on_stopover_mismatch(&mut self, _permutation: u32, _mismatch: &StopoverMismatch) {}

    /// Change fee estimated for a permutation.
    fn on_fee_estimated(&mut self, _permutation: u32, _charges: &ReissueCharges) {}
}

#[derive(Debug, Clone, Default)]
pub struct NoOpDiagnostic;

impl Diagnostic for NoOpDiagnostic {}

/// Forwards every event to `tracing` at debug level.
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostic;

impl Diagnostic for TracingDiagnostic {
    fn on_rule_bytes_resolved(&mut self, perm: &ProcessTagPermutation) {
        debug!(
            permutation = perm.number(),
            endorsement = %perm.endorsement_byte(),
            reissue_to_lower = %perm.reissue_to_lower_byte(),
            equal_or_higher = perm.ticket_equal_or_higher_byte().as_str(),
            electronic_ticket = %perm.electronic_ticket(),
            residual = %perm.residual_penalty_byte(),
            form_of_refund = %perm.form_of_refund_byte(),
            stopover_connection = %perm.stopover_connection_byte(),
            "rule bytes resolved"
        );
    }

    fn on_tag_war_winner(
        &mut self,
        permutation: u32,
        status: FcChangeStatus,
        fare_appl: FareApplication,
        winner: Option<&ProcessTagInfo>,
    ) {
        debug!(
            permutation,
            status = %status,
            fare_appl = %fare_appl,
            winner_fc = winner.map(|w| w.fare_comp_number()),
            winner_tag = winner.map(|w| w.process_tag().number()),
            "tag war winner"
        );
    }

    fn on_permutation_skipped(&mut self, permutation: u32, stopped_by: u32) {
        debug!(permutation, stopped_by, "permutation skipped by stop byte");
    }

    fn on_adv_res_override(&mut self, fare_market: &str, adv_res: &AdvResOverride) {
        debug!(
            fare_market,
            from = ?adv_res.from_date,
            to = ?adv_res.to_date,
            ignore_after_res = adv_res.ignore_tkt_after_res_restriction,
            ignore_before_dept = adv_res.ignore_tkt_before_dept_restriction,
            dated = adv_res.is_dated(),
            "adv res override"
        );
    }

    fn on_adv_res_cache_hit(&mut self, adv_res: &AdvResOverride, result: bool) {
        debug!(from = ?adv_res.from_date, to = ?adv_res.to_date, result, "adv res cache hit");
    }

    fn on_ticketing_check_failed(&mut self, check: &str) {
        debug!(check, "ticketing check failed");
    }

    fn on_stopover_mismatch(&mut self, permutation: u32, mismatch: &StopoverMismatch) {
        debug!(
            permutation,
            kind = ?mismatch.kind,
            only_in_old = ?mismatch.only_in_old,
            only_in_new = ?mismatch.only_in_new,
            "stopover/connection mismatch"
        );
    }

    fn on_fee_estimated(&mut self, permutation: u32, charges: &ReissueCharges) {
        debug!(
            permutation,
            scenario = ?charges.scenario,
            total = %charges.total,
            "change fee estimated"
        );
    }
}

/// Keeps every event as a line of text, in order.
#[derive(Debug, Clone, Default)]
pub struct CollectingDiagnostic {
    pub lines: Vec<String>,
}

impl Diagnostic for CollectingDiagnostic {
    fn on_tag_war_winner(
        &mut self,
        permutation: u32,
        status: FcChangeStatus,
        fare_appl: FareApplication,
        winner: Option<&ProcessTagInfo>,
    ) {
        let winner = winner.map_or("NONE".to_string(), |w| {
            format!("FC {} TAG {}", w.fare_comp_number(), w.process_tag())
        });
        self.lines.push(format!("PERMUTATION {} {} {} WINNER {}", permutation, status, fare_appl, winner));
    }

    fn on_permutation_skipped(&mut self, permutation: u32, stopped_by: u32) {
        self.lines
            .push(format!("PERMUTATION {} SKIPPED BY STOP BYTE OF PERMUTATION {}", permutation, stopped_by));
    }

    fn on_adv_res_cache_hit(&mut self, _adv_res: &AdvResOverride, result: bool) {
        self.lines.push(format!("ADV RES CACHE HIT: {}", if result { "PASS" } else { "FAIL" }));
    }

    fn on_ticketing_check_failed(&mut self, check: &str) {
        self.lines.push(format!("TICKETING CHECK FAILED: {}", check));
    }

    fn on_stopover_mismatch(&mut self, permutation: u32, mismatch: &StopoverMismatch) {
        self.lines.push(format!(
            "PERMUTATION {} {:?} MISMATCH OLD {:?} NEW {:?}",
            permutation, mismatch.kind, mismatch.only_in_old, mismatch.only_in_new
        ));
    }

    fn on_fee_estimated(&mut self, permutation: u32, charges: &ReissueCharges) {
        self.lines
            .push(format!("PERMUTATION {} CHANGE FEE {}", permutation, charges.total));
    }
}
