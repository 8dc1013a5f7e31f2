//! Stop byte tracking across permutations processed in priority order.

use crate::model::reissue::STOP_BYTE;
use crate::model::ProcessTag;
use crate::permutation::ProcessTagPermutation;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use tracing::debug;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct StopByteKey {
    process_tag: ProcessTag,
    fare_comp: u16,
}

/// Sequence numbers that carried a stop byte, per (process tag, fare
/// component), each with the permutation that recorded it.
#[derive(Debug, Clone, Default)]
pub struct StopByteTracker {
    stops: HashMap<StopByteKey, BTreeMap<u32, u32>>,
}

impl StopByteTracker {
    pub fn new() -> Self {
        StopByteTracker::default()
    }

    /// Records every stop byte sequence of `perm`. The first permutation to
    /// record a sequence number keeps it.
    pub fn save_stop_byte_info(&mut self, perm: &ProcessTagPermutation) {
        for pti in perm.process_tags() {
            let Some(seq) = pti.sequence() else {
                continue;
            };
            if seq.stop_ind != STOP_BYTE {
                continue;
            }
            let key = StopByteKey {
                process_tag: pti.process_tag(),
                fare_comp: pti.fare_comp_number(),
            };
            self.stops
                .entry(key)
                .or_default()
                .entry(seq.seq_no)
                .or_insert(perm.number());
        }
    }

    /// Permutation whose stop byte excludes `perm`, if any.
    pub fn stopped_by(&self, perm: &ProcessTagPermutation) -> Option<u32> {
        perm.process_tags().iter().find_map(|pti| {
            let seq = pti.sequence()?;
            let key = StopByteKey {
                process_tag: pti.process_tag(),
                fare_comp: pti.fare_comp_number(),
            };
            self.stops
                .get(&key)?
                .range((Bound::Excluded(seq.seq_no), Bound::Unbounded))
                .next()
                .map(|(_, perm_no)| *perm_no)
        })
    }

    /// True when a recorded stop byte sequence for one of this permutation's
    /// (process tag, fare component) pairs is numbered above its own.
    pub fn skip_by_stop_byte(&self, perm: &ProcessTagPermutation) -> bool {
        match self.stopped_by(perm) {
            Some(stopper) => {
                debug!(permutation = perm.number(), stopped_by = stopper, "skipped by stop byte");
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
