//! Reissue table ("988") sequences.

use crate::model::{ProcessTag, BLANK};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Stop byte: no later sequence may be used for this fare component.
pub const STOP_BYTE: char = 'X';

/// Stop indicator value required by the keep-the-fares-only check.
pub const STOP_IND_Y: char = 'Y';

/// Expanded keep fare byte.
pub const EXPND_KEEP_Y: char = 'Y';

/// Electronic ticket byte resolved from conflicting non-blank values.
pub const ELECTRONIC_TKT_MIXED: char = 'M';

/// Ticket/reservation byte: ticketing must be simultaneous with the
/// reservation of the changed segments.
pub const TKT_RESV_SIMULTANEOUS: char = 'X';

/// Departure byte: ticketing must precede the first changed departure.
pub const TKT_PRIOR_DEPARTURE: char = 'X';

/// From advance reservation indicator values (bytes 93-106).
pub mod from_adv_res {
    /// New ticket date if the outbound fare component changed, else the
    /// original ticket date.
    pub const OUTBOUND_CHANGED: char = ' ';
    /// Depends on the retrieval type of the repriced fare.
    pub const RETRIEVAL_TYPE: char = 'R';
    /// Always the new ticket date.
    pub const NEW_TICKET_DATE: char = 'N';
    /// Always the original ticket date.
    pub const ORIGINAL_TICKET_DATE: char = 'O';
}

/// To advance reservation indicator values (bytes 93-106).
pub mod to_adv_res {
    pub const JOURNEY: char = 'J';
    pub const PRICING_UNIT: char = 'P';
    pub const FARE_COMPONENT: char = 'F';
}

/// Identity of a sequence within its table.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SequenceKey {
    pub item_no: u32,
    pub seq_no: u32,
}

/// One reissue table sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReissueSequence {
    pub item_no: u32,
    pub seq_no: u32,
    pub process_tag: ProcessTag,
    pub stop_ind: char,
    pub expnd_keep: char,
    /// BLANK, F or R.
    pub reissue_to_lower: char,
    /// Byte 156: BLANK, B or N.
    pub ticket_equal_or_higher: char,
    pub electronic_tkt_ind: char,
    /// BLANK, C, B or S.
    pub stopover_connect_ind: char,
    pub ticket_resv_ind: char,
    pub departure_ind: char,
    pub from_adv_res_ind: char,
    pub to_adv_res_ind: char,
}

impl Default for ReissueSequence {
    fn default() -> Self {
        ReissueSequence {
            item_no: 0,
            seq_no: 0,
            process_tag: ProcessTag::NO_PROCESS_TAG,
            stop_ind: BLANK,
            expnd_keep: BLANK,
            reissue_to_lower: BLANK,
            ticket_equal_or_higher: BLANK,
            electronic_tkt_ind: BLANK,
            stopover_connect_ind: BLANK,
            ticket_resv_ind: BLANK,
            departure_ind: BLANK,
            from_adv_res_ind: BLANK,
            to_adv_res_ind: BLANK,
        }
    }
}

impl ReissueSequence {
    pub fn key(&self) -> SequenceKey {
        SequenceKey {
            item_no: self.item_no,
            seq_no: self.seq_no,
        }
    }

    /// Bytes 93-106 carry advance reservation override data.
    pub fn has_adv_res_data(&self) -> bool {
        self.from_adv_res_ind != BLANK || self.to_adv_res_ind != BLANK
    }
}

/// Sequence matched by a fare component. An overriding sequence, when
/// present, replaces the original one as a whole.
#[derive(Debug, Clone, Default)]
pub struct ReissueSequenceW {
    orig: Option<Rc<ReissueSequence>>,
    overriding: Option<Rc<ReissueSequence>>,
}

impl ReissueSequenceW {
    pub fn new(orig: Option<Rc<ReissueSequence>>) -> Self {
        ReissueSequenceW {
            orig,
            overriding: None,
        }
    }

    pub fn with_overriding(orig: Rc<ReissueSequence>, overriding: Rc<ReissueSequence>) -> Self {
        ReissueSequenceW {
            orig: Some(orig),
            overriding: Some(overriding),
        }
    }

    pub fn orig(&self) -> Option<&ReissueSequence> {
        self.orig.as_deref()
    }

    /// Effective sequence, or `None` when the fare component matched a
    /// Record 3 without a reissue table.
    pub fn get(&self) -> Option<&ReissueSequence> {
        self.overriding.as_deref().or(self.orig.as_deref())
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_wrapper_prefers_overriding() {
        let orig = Rc::new(ReissueSequence {
            seq_no: 100,
            ..ReissueSequence::default()
        });
        let over = Rc::new(ReissueSequence {
            seq_no: 200,
            ..ReissueSequence::default()
        });
        let w = ReissueSequenceW::with_overriding(orig, over);
        assert_eq!(w.get().map(|s| s.seq_no), Some(200));
        assert_eq!(w.orig().map(|s| s.seq_no), Some(100));
    }

    #[test]
    fn test_missing_sequence() {
        let w = ReissueSequenceW::new(None);
        assert!(!w.is_present());
        assert!(w.get().is_none());
    }

    #[test]
    fn test_adv_res_data() {
        let mut seq = ReissueSequence::default();
        assert!(!seq.has_adv_res_data());
        seq.to_adv_res_ind = to_adv_res::JOURNEY;
        assert!(seq.has_adv_res_data());
        assert_eq!(seq.key(), SequenceKey { item_no: 0, seq_no: 0 });
    }
}
