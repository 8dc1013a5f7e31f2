//! Change fee estimate for a permutation.

use crate::model::{Money, NUC};
use crate::permutation::{ProcessTagInfo, ProcessTagPermutation, ReissueCharges};
use crate::validation::CurrencyConverter;
use serde::Serialize;
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::debug;

/// Fee application byte of the voluntary changes record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeApplScenario {
    HighestOfChangedFc,
    HighestFromChangedPu,
    EachOfChangedFc,
    HighestOfAllFc,
    HighestFromChangedPuAdds,
}

impl FeeApplScenario {
    pub fn from_byte(byte: char) -> Option<Self> {
        match byte {
            '1' => Some(FeeApplScenario::HighestOfChangedFc),
            '2' => Some(FeeApplScenario::HighestFromChangedPu),
            '3' => Some(FeeApplScenario::EachOfChangedFc),
            '4' => Some(FeeApplScenario::HighestOfAllFc),
            '5' => Some(FeeApplScenario::HighestFromChangedPuAdds),
            _ => None,
        }
    }

    pub fn byte(self) -> char {
        match self {
            FeeApplScenario::HighestOfChangedFc => '1',
            FeeApplScenario::HighestFromChangedPu => '2',
            FeeApplScenario::EachOfChangedFc => '3',
            FeeApplScenario::HighestOfAllFc => '4',
            FeeApplScenario::HighestFromChangedPuAdds => '5',
        }
    }
}

use FeeApplScenario::{
    EachOfChangedFc, HighestFromChangedPu, HighestFromChangedPuAdds, HighestOfAllFc,
    HighestOfChangedFc,
};

/// Scenario picked when the tags disagree: the first probe byte present
/// among the tags selects its scenario.
///
/// The third entry repeats the ADDS probe, so a lone HIGHEST_FROM_CHANGED_PU
/// byte among mixed tags is never selected here.
const MIXED_PRIORITY: [(FeeApplScenario, FeeApplScenario); 4] = [
    (HighestOfAllFc, HighestOfAllFc),
    (HighestFromChangedPuAdds, HighestFromChangedPuAdds),
    (HighestFromChangedPuAdds, HighestFromChangedPu),
    (HighestOfChangedFc, HighestOfChangedFc),
];

pub struct PenaltyEstimator<V> {
    converter: V,
    payment_currency: String,
}

impl<V: CurrencyConverter> PenaltyEstimator<V> {
    pub fn new(converter: V, payment_currency: &str) -> Self {
        PenaltyEstimator {
            converter,
            payment_currency: payment_currency.to_string(),
        }
    }

    pub fn payment_currency(&self) -> &str {
        &self.payment_currency
    }

    pub fn scenario(&self, perm: &ProcessTagPermutation) -> FeeApplScenario {
        let bytes: Vec<char> = perm
            .process_tags()
            .iter()
            .map(|pti| pti.record3().fee_appl())
            .collect();

        if let Some(&first) = bytes.first() {
            if bytes.iter().all(|&b| b == first) {
                return FeeApplScenario::from_byte(first).unwrap_or(EachOfChangedFc);
            }
        }

        MIXED_PRIORITY
            .iter()
            .find(|(probe, _)| bytes.contains(&probe.byte()))
            .map_or(EachOfChangedFc, |(_, scenario)| *scenario)
    }

    /// Penalty of one tag in the payment currency: the first penalty amount
    /// when above the minimum, else the minimum.
    pub fn tag_amount(&self, pti: &ProcessTagInfo) -> Money {
        let record3 = pti.record3();
        let penalty = record3.penalty_amt1();
        let min = record3.min_amt();
        let min_is_zero = min.is_zero();
        let amount = if penalty.amount > min.amount { penalty } else { min };

        if amount.currency != self.payment_currency
            && self.payment_currency != NUC
            && !min_is_zero
        {
            if let Some(converted) = self.converter.convert(&amount, &self.payment_currency) {
                return converted;
            }
            debug!(
                fare_comp = pti.fare_comp_number(),
                from = %amount.currency,
                to = %self.payment_currency,
                "no conversion rate; amount kept"
            );
        }
        amount
    }

    /// Picks the scenario, computes the fee and stores both on `perm`.
    ///
    /// `unmatched` holds the numbers of exchanged fare components that did
    /// not match the new itinerary.
    pub fn estimate(
        &self,
        perm: &mut ProcessTagPermutation,
        unmatched: &BTreeSet<u16>,
    ) -> Rc<ReissueCharges> {
        let scenario = self.scenario(perm);
        let amounts: Vec<(u16, Money)> = perm
            .process_tags()
            .iter()
            .filter(|pti| {
                scenario != HighestOfChangedFc || unmatched.contains(&pti.fare_comp_number())
            })
            .map(|pti| (pti.fare_comp_number(), self.tag_amount(pti)))
            .collect();

        let total = match scenario {
            EachOfChangedFc => self.sum(&amounts),
            HighestOfChangedFc | HighestOfAllFc | HighestFromChangedPu | HighestFromChangedPuAdds => {
                self.highest(&amounts)
            }
        };

        debug!(
            permutation = perm.number(),
            scenario = ?scenario,
            total = %total,
            "change fee estimated"
        );

        let charges = Rc::new(ReissueCharges {
            scenario,
            per_fare_component: amounts,
            total: total.clone(),
        });
        perm.set_estimated_change_fee(total);
        perm.set_reissue_charges(Rc::clone(&charges));
        charges
    }

    fn highest(&self, amounts: &[(u16, Money)]) -> Money {
        amounts
            .iter()
            .map(|(_, m)| m)
            .fold(None::<&Money>, |best, m| match best {
                Some(b) if b.amount >= m.amount => Some(b),
                _ => Some(m),
            })
            .cloned()
            .unwrap_or_else(|| Money::zero(&self.payment_currency))
    }

    /// Labels the total with the first amount's currency. Amounts left
    /// unconverted (zero minimum) are added as they are.
    fn sum(&self, amounts: &[(u16, Money)]) -> Money {
        let currency = amounts
            .first()
            .map_or(self.payment_currency.as_str(), |(_, m)| m.currency.as_str());
        if let Some((fc, other)) = amounts.iter().find(|(_, m)| m.currency != currency) {
            debug!(
                total_currency = currency,
                fare_component = *fc,
                currency = %other.currency,
                "summing change fees in different currencies"
            );
        }
        Money::new(amounts.iter().map(|(_, m)| m.amount).sum(), currency)
    }
}
