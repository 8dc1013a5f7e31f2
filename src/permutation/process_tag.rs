use crate::model::{
    FareCompInfo, FareMarket, ProcessTag, ReissueSequence, ReissueSequenceW, VoluntaryChangesInfoW,
    BLANK,
};
use std::rc::Rc;

/// One fare component's match against one Record 3 (and its optional
/// reissue sequence).
///
/// Built once per (fare component, matching rule) pair and shared by every
/// permutation that uses it. The rule records themselves are owned by the
/// pricing transaction.
#[derive(Debug, Clone)]
pub struct ProcessTagInfo {
    fare_comp: Rc<FareCompInfo>,
    record3: VoluntaryChangesInfoW,
    reissue_sequence: ReissueSequenceW,
    valid: bool,
}

impl ProcessTagInfo {
    pub fn new(
        fare_comp: Rc<FareCompInfo>,
        record3: VoluntaryChangesInfoW,
        reissue_sequence: ReissueSequenceW,
    ) -> Self {
        ProcessTagInfo {
            fare_comp,
            record3,
            reissue_sequence,
            valid: true,
        }
    }

    pub fn with_validity(mut self, valid: bool) -> Self {
        self.valid = valid;
        self
    }

    pub fn fare_comp_info(&self) -> &Rc<FareCompInfo> {
        &self.fare_comp
    }

    pub fn fare_market(&self) -> &Rc<FareMarket> {
        &self.fare_comp.fare_market
    }

    pub fn fare_comp_number(&self) -> u16 {
        self.fare_comp.number
    }

    pub fn record3(&self) -> &VoluntaryChangesInfoW {
        &self.record3
    }

    pub fn reissue_sequence(&self) -> &ReissueSequenceW {
        &self.reissue_sequence
    }

    /// Effective 988 sequence, if the Record 3 carried one.
    pub fn sequence(&self) -> Option<&ReissueSequence> {
        self.reissue_sequence.get()
    }

    pub fn has_sequence(&self) -> bool {
        self.reissue_sequence.is_present()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Process tag of the sequence; `NO_PROCESS_TAG` without one.
    pub fn process_tag(&self) -> ProcessTag {
        self.sequence()
            .map_or(ProcessTag::NO_PROCESS_TAG, |seq| seq.process_tag)
    }

    pub fn seq_no(&self) -> Option<u32> {
        self.sequence().map(|seq| seq.seq_no)
    }

    pub fn stop_ind(&self) -> char {
        self.sequence().map_or(BLANK, |seq| seq.stop_ind)
    }
}
