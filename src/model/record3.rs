//! Record 3 (voluntary changes) rule data and its override wrapper.

use crate::model::{CurrencyCode, Money, BLANK};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Residual hierarchy byte value meaning "most restrictive".
pub const RESIDUAL_HIERARCHY_MAX: char = 'X';

/// One Record 3 voluntary changes provision, as published by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoluntaryChangesInfo {
    pub vendor: String,
    pub item_no: u32,

    /// Endorsement byte: BLANK, X, W or Y.
    pub endorsement: char,

    /// Residual / penalty indicator.
    pub residual_ind: char,

    /// Residual hierarchy; `X` marks the most restrictive level.
    pub residual_hierarchy: char,

    /// Form of refund: S, V, M or BLANK.
    pub form_of_refund: char,

    /// Fee application scenario byte.
    pub fee_appl: char,

    pub penalty_amt1: Decimal,
    pub penalty_cur1: CurrencyCode,

    pub min_amt: Decimal,
    pub min_cur: CurrencyCode,

    /// Item number of the reissue table (988) this record points at.
    pub reissue_table_item_no: u32,
}

impl Default for VoluntaryChangesInfo {
    fn default() -> Self {
        VoluntaryChangesInfo {
            vendor: "ATP".to_string(),
            item_no: 0,
            endorsement: BLANK,
            residual_ind: BLANK,
            residual_hierarchy: BLANK,
            form_of_refund: BLANK,
            fee_appl: BLANK,
            penalty_amt1: Decimal::ZERO,
            penalty_cur1: String::new(),
            min_amt: Decimal::ZERO,
            min_cur: String::new(),
            reissue_table_item_no: 0,
        }
    }
}

/// Byte groups of a Record 3 that an overriding record may take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Record3Byte {
    Endorsement,
    ResidualInd,
    ResidualHierarchy,
    FormOfRefund,
    FeeAppl,
    PenaltyAmount,
    MinAmount,
}

impl Record3Byte {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Set of conditionally overridden byte groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverriddenBytes(u16);

impl OverriddenBytes {
    pub fn new() -> Self {
        OverriddenBytes(0)
    }

    pub fn with(mut self, byte: Record3Byte) -> Self {
        self.set(byte);
        self
    }

    pub fn set(&mut self, byte: Record3Byte) {
        self.0 |= byte.bit();
    }

    pub fn contains(&self, byte: Record3Byte) -> bool {
        self.0 & byte.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Record3Byte> for OverriddenBytes {
    fn from_iter<I: IntoIterator<Item = Record3Byte>>(iter: I) -> Self {
        iter.into_iter().fold(OverriddenBytes::new(), OverriddenBytes::with)
    }
}

/// Record 3 as seen by a fare component.
///
/// Cross-border fare components may carry an overriding record; only the
/// byte groups marked in `overridden` are read from it, everything else
/// still comes from the original record.
#[derive(Debug, Clone)]
pub struct VoluntaryChangesInfoW {
    orig: Rc<VoluntaryChangesInfo>,
    overriding: Option<Rc<VoluntaryChangesInfo>>,
    overridden: OverriddenBytes,
}

impl VoluntaryChangesInfoW {
    pub fn new(orig: Rc<VoluntaryChangesInfo>) -> Self {
        VoluntaryChangesInfoW {
            orig,
            overriding: None,
            overridden: OverriddenBytes::new(),
        }
    }

    pub fn with_overriding(
        orig: Rc<VoluntaryChangesInfo>,
        overriding: Rc<VoluntaryChangesInfo>,
        overridden: OverriddenBytes,
    ) -> Self {
        VoluntaryChangesInfoW {
            orig,
            overriding: Some(overriding),
            overridden,
        }
    }

    pub fn orig(&self) -> &VoluntaryChangesInfo {
        &self.orig
    }

    pub fn overriding(&self) -> Option<&VoluntaryChangesInfo> {
        self.overriding.as_deref()
    }

    pub fn overridden_bytes(&self) -> OverriddenBytes {
        self.overridden
    }

    /// True when an overriding record is attached.
    pub fn is_overriden(&self) -> bool {
        self.overriding.is_some()
    }

    fn source(&self, byte: Record3Byte) -> &VoluntaryChangesInfo {
        match &self.overriding {
            Some(rec) if self.overridden.contains(byte) => rec,
            _ => &self.orig,
        }
    }

    pub fn item_no(&self) -> u32 {
        self.orig.item_no
    }

    pub fn vendor(&self) -> &str {
        &self.orig.vendor
    }

    pub fn endorsement(&self) -> char {
        self.source(Record3Byte::Endorsement).endorsement
    }

    pub fn residual_ind(&self) -> char {
        self.source(Record3Byte::ResidualInd).residual_ind
    }

    pub fn residual_hierarchy(&self) -> char {
        self.source(Record3Byte::ResidualHierarchy).residual_hierarchy
    }

    pub fn form_of_refund(&self) -> char {
        self.source(Record3Byte::FormOfRefund).form_of_refund
    }

    pub fn fee_appl(&self) -> char {
        self.source(Record3Byte::FeeAppl).fee_appl
    }

    pub fn penalty_amt1(&self) -> Money {
        let rec = self.source(Record3Byte::PenaltyAmount);
        Money::new(rec.penalty_amt1, &rec.penalty_cur1)
    }

    pub fn min_amt(&self) -> Money {
        let rec = self.source(Record3Byte::MinAmount);
        Money::new(rec.min_amt, &rec.min_cur)
    }
}
