//! Process tag permutations: one candidate assignment of a matched rule per
//! fare component, plus the aggregates computed for it during validation.

pub mod process_tag;
pub mod rule_bytes;
pub mod stop_byte;
pub mod tag_war;

pub use process_tag::ProcessTagInfo;
pub use stop_byte::StopByteTracker;

use crate::model::reissue::{EXPND_KEEP_Y, STOP_IND_Y};
use crate::model::{
    EqualOrHigherInd, FareApplication, FareMarket, FcChangeStatus, Money, ProcessTag,
};
use crate::validation::penalty::FeeApplScenario;
use serde::Serialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Fare application selected per fare component change status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FareApplMap {
    uu: FareApplication,
    uc: FareApplication,
    un: FareApplication,
    fl: FareApplication,
}

impl FareApplMap {
    pub fn get(&self, status: FcChangeStatus) -> FareApplication {
        match status {
            FcChangeStatus::Uu => self.uu,
            FcChangeStatus::Uc => self.uc,
            FcChangeStatus::Un => self.un,
            FcChangeStatus::Fl => self.fl,
            FcChangeStatus::Unknown => FareApplication::UnknownFa,
        }
    }

    /// Statuses outside UU/UC/UN/FL are ignored.
    pub fn set(&mut self, status: FcChangeStatus, fa: FareApplication) {
        match status {
            FcChangeStatus::Uu => self.uu = fa,
            FcChangeStatus::Uc => self.uc = fa,
            FcChangeStatus::Un => self.un = fa,
            FcChangeStatus::Fl => self.fl = fa,
            FcChangeStatus::Unknown => {}
        }
    }
}

/// Reissue charges computed for a permutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReissueCharges {
    pub scenario: FeeApplScenario,
    /// Per fare component amount that entered the estimate.
    pub per_fare_component: Vec<(u16, Money)>,
    pub total: Money,
}

/// One candidate combination of process tags.
///
/// `process_tags` holds one entry per fare component that required a
/// voluntary changes match, in fare component order.
#[derive(Debug, Clone, Default)]
pub struct ProcessTagPermutation {
    number: u32,
    process_tags: Vec<Rc<ProcessTagInfo>>,
    mixed_tags: bool,
    fare_appl: FareApplMap,
    rebook_fare_appl: FareApplMap,
    fare_appl_winner_tags: BTreeMap<FareApplication, Rc<ProcessTagInfo>>,
    estimated_change_fee: Option<Money>,
    electronic_ticket: OnceCell<char>,
    reissue_charges: Option<Rc<ReissueCharges>>,
}

impl ProcessTagPermutation {
    pub fn new(number: u32) -> Self {
        ProcessTagPermutation {
            number,
            ..ProcessTagPermutation::default()
        }
    }

    pub fn with_tags(number: u32, tags: Vec<Rc<ProcessTagInfo>>) -> Self {
        let mut perm = ProcessTagPermutation::new(number);
        for tag in tags {
            perm.add_process_tag(tag);
        }
        perm
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn add_process_tag(&mut self, tag: Rc<ProcessTagInfo>) {
        if let Some(first) = self.process_tags.first() {
            if first.process_tag() != tag.process_tag() {
                self.mixed_tags = true;
            }
        }
        self.process_tags.push(tag);
    }

    pub fn process_tags(&self) -> &[Rc<ProcessTagInfo>] {
        &self.process_tags
    }

    /// More than one distinct process tag participates.
    pub fn has_mixed_tags(&self) -> bool {
        self.mixed_tags
    }

    pub fn fare_appl(&self, status: FcChangeStatus) -> FareApplication {
        self.fare_appl.get(status)
    }

    pub fn set_fare_appl(&mut self, status: FcChangeStatus, fa: FareApplication) {
        self.fare_appl.set(status, fa);
    }

    pub fn rebook_fare_appl(&self, status: FcChangeStatus) -> FareApplication {
        self.rebook_fare_appl.get(status)
    }

    pub fn set_rebook_fare_appl(&mut self, status: FcChangeStatus, fa: FareApplication) {
        self.rebook_fare_appl.set(status, fa);
    }

    pub fn fare_appl_map(&self) -> &FareApplMap {
        &self.fare_appl
    }

    pub fn rebook_fare_appl_map(&self) -> &FareApplMap {
        &self.rebook_fare_appl
    }

    /// Winning process tag per fare application outcome.
    pub fn fare_appl_winner_tags(&self) -> &BTreeMap<FareApplication, Rc<ProcessTagInfo>> {
        &self.fare_appl_winner_tags
    }

    pub(crate) fn record_winner(&mut self, fa: FareApplication, winner: Rc<ProcessTagInfo>) {
        self.fare_appl_winner_tags.insert(fa, winner);
    }

    /// Process tag matched for `fare_market`, compared by identity.
    pub fn find_process_tag_info(&self, fare_market: &FareMarket) -> Option<&Rc<ProcessTagInfo>> {
        self.process_tags
            .iter()
            .find(|pti| std::ptr::eq(Rc::as_ptr(pti.fare_market()), fare_market))
    }

    pub fn need_expnd_keep_fare(&self, fare_market: &FareMarket) -> bool {
        self.find_process_tag_info(fare_market)
            .and_then(|pti| pti.sequence())
            .is_some_and(|seq| seq.expnd_keep == EXPND_KEEP_Y)
    }

    /// Only the front entry is checked.
    pub fn has_tag7_only(&self) -> bool {
        self.process_tags.first().is_some_and(|pti| {
            pti.has_sequence() && pti.process_tag() == ProcessTag::REISSUE_DOWN_TO_LOWER_FARE
        })
    }

    /// Every entry is KEEP_THE_FARES with stop indicator `Y`. True when empty.
    pub fn tag1_stop_y_only(&self) -> bool {
        self.process_tags.iter().all(|pti| {
            pti.has_sequence()
                && pti.process_tag() == ProcessTag::KEEP_THE_FARES
                && pti.stop_ind() == STOP_IND_Y
        })
    }

    pub fn first_with_t988(&self) -> Option<&Rc<ProcessTagInfo>> {
        self.process_tags.iter().find(|pti| pti.has_sequence())
    }

    pub fn has_zero_t988(&self) -> bool {
        self.process_tags.iter().any(|pti| !pti.has_sequence())
    }

    pub fn is_overriden(&self) -> bool {
        self.process_tags.iter().any(|pti| pti.record3().is_overriden())
    }

    pub fn need_keep_fare(&self) -> bool {
        self.fare_appl_winner_tags.contains_key(&FareApplication::Keep)
    }

    pub fn estimated_change_fee(&self) -> Option<&Money> {
        self.estimated_change_fee.as_ref()
    }

    pub fn set_estimated_change_fee(&mut self, fee: Money) {
        self.estimated_change_fee = Some(fee);
    }

    pub fn reissue_charges(&self) -> Option<&Rc<ReissueCharges>> {
        self.reissue_charges.as_ref()
    }

    pub fn set_reissue_charges(&mut self, charges: Rc<ReissueCharges>) {
        self.reissue_charges = Some(charges);
    }

    /// Electronic ticket requirement, resolved on first use.
    pub fn electronic_ticket(&self) -> char {
        *self
            .electronic_ticket
            .get_or_init(|| rule_bytes::electronic_ticket(&self.process_tags))
    }

    pub fn endorsement_byte(&self) -> char {
        rule_bytes::endorsement(&self.process_tags)
    }

    pub fn reissue_to_lower_byte(&self) -> char {
        rule_bytes::reissue_to_lower(&self.process_tags)
    }

    pub fn ticket_equal_or_higher_byte(&self) -> EqualOrHigherInd {
        rule_bytes::ticket_equal_or_higher(&self.process_tags)
    }

    pub fn residual_penalty_byte(&self) -> char {
        rule_bytes::residual_penalty(&self.process_tags)
    }

    pub fn form_of_refund_byte(&self) -> char {
        rule_bytes::form_of_refund(&self.process_tags)
    }

    pub fn stopover_connection_byte(&self) -> char {
        rule_bytes::stopover_connection(&self.process_tags)
    }
}
