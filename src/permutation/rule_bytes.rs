//! Resolution of rule bytes that the fare components of one permutation
//! publish with conflicting values.
//!
//! Every function is total over any tag list: an empty or all-blank input
//! resolves to the documented sentinel.

use crate::model::record3::RESIDUAL_HIERARCHY_MAX;
use crate::model::reissue::ELECTRONIC_TKT_MIXED;
use crate::model::{EqualOrHigherInd, ReissueSequence, BLANK};
use crate::permutation::ProcessTagInfo;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::rc::Rc;

pub const ENDORSEMENT_X: char = 'X';
pub const ENDORSEMENT_W: char = 'W';
pub const ENDORSEMENT_Y: char = 'Y';

/// Least restrictive first.
pub const ENDORSEMENT_HIERARCHY: [char; 4] = [BLANK, ENDORSEMENT_X, ENDORSEMENT_W, ENDORSEMENT_Y];

pub const REISSUE_TO_LOWER_F: char = 'F';
pub const REISSUE_TO_LOWER_R: char = 'R';

pub const FORM_OF_REFUND_S: char = 'S';
pub const FORM_OF_REFUND_V: char = 'V';
pub const FORM_OF_REFUND_M: char = 'M';

pub const STOPOVER_CONNECTION_C: char = 'C';
pub const STOPOVER_CONNECTION_B: char = 'B';
pub const STOPOVER_CONNECTION_S: char = 'S';

/// Search order for the stopover/connection byte.
pub const STOPOVER_CONNECTION_HIERARCHY: [char; 3] =
    [STOPOVER_CONNECTION_C, STOPOVER_CONNECTION_B, STOPOVER_CONNECTION_S];

fn sequences(tags: &[Rc<ProcessTagInfo>]) -> impl Iterator<Item = &ReissueSequence> {
    tags.iter().filter_map(|pti| pti.sequence())
}

/// First hierarchy value present among the endorsement bytes; `Y` when
/// none is.
pub fn endorsement(tags: &[Rc<ProcessTagInfo>]) -> char {
    let present: BTreeSet<char> = tags.iter().map(|pti| pti.record3().endorsement()).collect();
    ENDORSEMENT_HIERARCHY
        .iter()
        .copied()
        .find(|byte| present.contains(byte))
        .unwrap_or(ENDORSEMENT_Y)
}

/// `F` beats `R`, even when `F` appears after the first `R`.
pub fn reissue_to_lower(tags: &[Rc<ProcessTagInfo>]) -> char {
    let mut seqs = sequences(tags).map(|seq| seq.reissue_to_lower);
    let first = seqs.find(|byte| *byte == REISSUE_TO_LOWER_F || *byte == REISSUE_TO_LOWER_R);

    match first {
        None => BLANK,
        Some(REISSUE_TO_LOWER_F) => REISSUE_TO_LOWER_F,
        Some(_) => {
            if seqs.any(|byte| byte == REISSUE_TO_LOWER_F) {
                REISSUE_TO_LOWER_F
            } else {
                REISSUE_TO_LOWER_R
            }
        }
    }
}

/// Byte 156 of the reissue table.
pub fn ticket_equal_or_higher(tags: &[Rc<ProcessTagInfo>]) -> EqualOrHigherInd {
    let mut has_b = false;
    let mut has_n = false;
    for seq in sequences(tags) {
        match EqualOrHigherInd::from_byte(seq.ticket_equal_or_higher) {
            EqualOrHigherInd::B => has_b = true,
            EqualOrHigherInd::N => has_n = true,
            _ => {}
        }
    }

    match (has_b, has_n) {
        (true, true) => EqualOrHigherInd::BN,
        (true, false) => EqualOrHigherInd::B,
        (false, true) => EqualOrHigherInd::N,
        (false, false) => EqualOrHigherInd::Blank,
    }
}

/// Single non-blank value, or MIXED when two differ.
pub fn electronic_ticket(tags: &[Rc<ProcessTagInfo>]) -> char {
    let mut found = BLANK;
    for byte in sequences(tags).map(|seq| seq.electronic_tkt_ind) {
        if byte == BLANK {
            continue;
        }
        if found == BLANK {
            found = byte;
        } else if byte != found {
            return ELECTRONIC_TKT_MIXED;
        }
    }
    found
}

/// Blank orders above every other value.
fn residual_order(left: &char, right: &char) -> Ordering {
    match (*left == BLANK, *right == BLANK) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => left.cmp(right),
    }
}

/// Residual / penalty indicator.
///
/// Unanimous values win outright. Otherwise only fare components without a
/// real segment change are considered (all of them if every one changed);
/// when all considered records sit at the most restrictive hierarchy the
/// maximum value is taken, else the minimum.
pub fn residual_penalty(tags: &[Rc<ProcessTagInfo>]) -> char {
    let Some(first) = tags.first() else {
        return BLANK;
    };
    let first_value = first.record3().residual_ind();
    if tags.iter().all(|pti| pti.record3().residual_ind() == first_value) {
        return first_value;
    }

    let unchanged: Vec<&Rc<ProcessTagInfo>> = tags
        .iter()
        .filter(|pti| !pti.fare_market().change_status.is_changed())
        .collect();
    let considered = if unchanged.is_empty() {
        tags.iter().collect()
    } else {
        unchanged
    };

    let all_at_max = considered
        .iter()
        .all(|pti| pti.record3().residual_hierarchy() == RESIDUAL_HIERARCHY_MAX);
    let values = considered.iter().map(|pti| pti.record3().residual_ind());
    let picked = if all_at_max {
        values.max_by(residual_order)
    } else {
        values.min_by(residual_order)
    };
    picked.unwrap_or(BLANK)
}

/// `S` wins immediately; `V` outranks `M`.
pub fn form_of_refund(tags: &[Rc<ProcessTagInfo>]) -> char {
    let mut most_restrictive = BLANK;
    for pti in tags {
        match pti.record3().form_of_refund() {
            FORM_OF_REFUND_S => return FORM_OF_REFUND_S,
            FORM_OF_REFUND_V => most_restrictive = FORM_OF_REFUND_V,
            FORM_OF_REFUND_M if most_restrictive != FORM_OF_REFUND_V => {
                most_restrictive = FORM_OF_REFUND_M
            }
            _ => {}
        }
    }
    most_restrictive
}

/// Stopover/connection byte: `C` and `S` together merge into `B`.
pub fn stopover_connection(tags: &[Rc<ProcessTagInfo>]) -> char {
    let values: Vec<char> = sequences(tags).map(|seq| seq.stopover_connect_ind).collect();
    let Some(pos) = values
        .iter()
        .position(|byte| STOPOVER_CONNECTION_HIERARCHY.contains(byte))
    else {
        return BLANK;
    };
    let rest = &values[pos + 1..];

    match values[pos] {
        STOPOVER_CONNECTION_C => {
            if rest
                .iter()
                .any(|b| *b == STOPOVER_CONNECTION_B || *b == STOPOVER_CONNECTION_S)
            {
                STOPOVER_CONNECTION_B
            } else {
                STOPOVER_CONNECTION_C
            }
        }
        STOPOVER_CONNECTION_S => {
            if rest
                .iter()
                .any(|b| *b == STOPOVER_CONNECTION_C || *b == STOPOVER_CONNECTION_B)
            {
                STOPOVER_CONNECTION_B
            } else {
                STOPOVER_CONNECTION_S
            }
        }
        _ => STOPOVER_CONNECTION_B,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReissueSequence, SegmentChange, VoluntaryChangesInfo};
    use crate::test_support::{dt, fare_comp, market, market_with, record3, seg, tag_info, tag_info_no_seq};
    use proptest::prelude::*;

    fn endorsement_tags(values: &[char]) -> Vec<Rc<ProcessTagInfo>> {
        values
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let fc = fare_comp(i as u16 + 1, market("DFW", "LAX"));
                tag_info_no_seq(&fc, record3(*e))
            })
            .collect()
    }

    fn seq_tags(build: impl Fn(char) -> ReissueSequence, values: &[char]) -> Vec<Rc<ProcessTagInfo>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let fc = fare_comp(i as u16 + 1, market("DFW", "LAX"));
                tag_info(&fc, record3(BLANK), build(*v))
            })
            .collect()
    }

    fn reissue_to_lower_tags(values: &[char]) -> Vec<Rc<ProcessTagInfo>> {
        seq_tags(
            |v| ReissueSequence {
                reissue_to_lower: v,
                ..ReissueSequence::default()
            },
            values,
        )
    }

    fn stopover_tags(values: &[char]) -> Vec<Rc<ProcessTagInfo>> {
        seq_tags(
            |v| ReissueSequence {
                stopover_connect_ind: v,
                ..ReissueSequence::default()
            },
            values,
        )
    }

    fn residual_tag(residual: char, hierarchy: char, change: SegmentChange) -> Rc<ProcessTagInfo> {
        let fc = fare_comp(1, market_with(vec![seg("DFW", "LAX", dt(6, 1, 9, 0))], change));
        tag_info_no_seq(
            &fc,
            VoluntaryChangesInfo {
                residual_ind: residual,
                residual_hierarchy: hierarchy,
                ..VoluntaryChangesInfo::default()
            },
        )
    }

    fn refund_tags(values: &[char]) -> Vec<Rc<ProcessTagInfo>> {
        values
            .iter()
            .map(|v| {
                let fc = fare_comp(1, market("DFW", "LAX"));
                tag_info_no_seq(
                    &fc,
                    VoluntaryChangesInfo {
                        form_of_refund: *v,
                        ..VoluntaryChangesInfo::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_endorsement_blank_has_top_priority() {
        assert_eq!(endorsement(&endorsement_tags(&[BLANK, 'X', 'W'])), BLANK);
        assert_eq!(endorsement(&endorsement_tags(&[BLANK, 'W'])), BLANK);
        assert_eq!(endorsement(&endorsement_tags(&[BLANK])), BLANK);
        assert_eq!(endorsement(&endorsement_tags(&['W', 'X', BLANK])), BLANK);
    }

    #[test]
    fn test_endorsement_single_values() {
        assert_eq!(endorsement(&endorsement_tags(&['X', 'X', 'X'])), 'X');
        assert_eq!(endorsement(&endorsement_tags(&['W', 'W', 'W'])), 'W');
        assert_eq!(endorsement(&endorsement_tags(&['W', 'X'])), 'X');
        assert_eq!(endorsement(&endorsement_tags(&['Y', 'W'])), 'W');
    }

    #[test]
    fn test_endorsement_fallback_is_y() {
        assert_eq!(endorsement(&[]), ENDORSEMENT_Y);
        assert_eq!(endorsement(&endorsement_tags(&['Q'])), ENDORSEMENT_Y);
        // All-Y input falls through to the fallback; kept unconfirmed.
        assert_eq!(endorsement(&endorsement_tags(&['Y', 'Y', 'Y'])), ENDORSEMENT_Y);
    }

    #[test]
    fn test_reissue_to_lower() {
        assert_eq!(reissue_to_lower(&reissue_to_lower_tags(&[BLANK, 'F', 'R'])), 'F');
        assert_eq!(reissue_to_lower(&reissue_to_lower_tags(&[BLANK, 'R', 'F', BLANK])), 'F');
        assert_eq!(reissue_to_lower(&reissue_to_lower_tags(&[BLANK, 'R', BLANK])), 'R');
        assert_eq!(reissue_to_lower(&reissue_to_lower_tags(&[BLANK, BLANK, BLANK])), BLANK);
        assert_eq!(reissue_to_lower(&[]), BLANK);
    }

    #[test]
    fn test_reissue_to_lower_ignores_tags_without_sequence() {
        let fc = fare_comp(1, market("DFW", "LAX"));
        let mut tags = reissue_to_lower_tags(&['R']);
        tags.push(tag_info_no_seq(&fc, record3(BLANK)));
        assert_eq!(reissue_to_lower(&tags), 'R');
    }

    #[test]
    fn test_ticket_equal_or_higher() {
        let build = |v| ReissueSequence {
            ticket_equal_or_higher: v,
            ..ReissueSequence::default()
        };
        assert_eq!(ticket_equal_or_higher(&seq_tags(build, &['B', BLANK, 'N'])), EqualOrHigherInd::BN);
        assert_eq!(ticket_equal_or_higher(&seq_tags(build, &['B', 'B'])), EqualOrHigherInd::B);
        assert_eq!(ticket_equal_or_higher(&seq_tags(build, &[BLANK, 'N'])), EqualOrHigherInd::N);
        assert_eq!(ticket_equal_or_higher(&seq_tags(build, &[BLANK])), EqualOrHigherInd::Blank);
    }

    #[test]
    fn test_electronic_ticket() {
        let build = |v| ReissueSequence {
            electronic_tkt_ind: v,
            ..ReissueSequence::default()
        };
        assert_eq!(electronic_ticket(&seq_tags(build, &[BLANK, 'Y', 'Y'])), 'Y');
        assert_eq!(electronic_ticket(&seq_tags(build, &['Y', BLANK, 'N'])), ELECTRONIC_TKT_MIXED);
        assert_eq!(electronic_ticket(&seq_tags(build, &[BLANK, BLANK])), BLANK);
        assert_eq!(electronic_ticket(&[]), BLANK);
    }

    #[test]
    fn test_residual_penalty_empty_and_single() {
        assert_eq!(residual_penalty(&[]), BLANK);
        let single = vec![residual_tag('N', BLANK, SegmentChange::Changed)];
        assert_eq!(residual_penalty(&single), 'N');
    }

    #[test]
    fn test_residual_penalty_prefers_unchanged_components() {
        let tags = vec![
            residual_tag('A', BLANK, SegmentChange::Changed),
            residual_tag('N', BLANK, SegmentChange::Unchanged),
            residual_tag('R', BLANK, SegmentChange::Unchanged),
        ];
        // Changed 'A' is excluded; min of {N, R}.
        assert_eq!(residual_penalty(&tags), 'N');
    }

    #[test]
    fn test_residual_penalty_all_changed_considers_everything() {
        let tags = vec![
            residual_tag('R', BLANK, SegmentChange::Changed),
            residual_tag('N', BLANK, SegmentChange::Changed),
        ];
        assert_eq!(residual_penalty(&tags), 'N');
    }

    #[test]
    fn test_residual_penalty_max_hierarchy_takes_maximum() {
        let tags = vec![
            residual_tag('N', 'X', SegmentChange::Unchanged),
            residual_tag('R', 'X', SegmentChange::Unchanged),
        ];
        assert_eq!(residual_penalty(&tags), 'R');

        let with_blank = vec![
            residual_tag('N', 'X', SegmentChange::Unchanged),
            residual_tag(BLANK, 'X', SegmentChange::Unchanged),
        ];
        assert_eq!(residual_penalty(&with_blank), BLANK);
    }

    #[test]
    fn test_residual_penalty_minimum_never_picks_blank_over_value() {
        let tags = vec![
            residual_tag(BLANK, BLANK, SegmentChange::Unchanged),
            residual_tag('R', 'X', SegmentChange::Unchanged),
        ];
        assert_eq!(residual_penalty(&tags), 'R');
    }

    #[test]
    fn test_form_of_refund() {
        assert_eq!(form_of_refund(&refund_tags(&['M', 'V', 'S'])), 'S');
        assert_eq!(form_of_refund(&refund_tags(&['M', 'V', 'M'])), 'V');
        assert_eq!(form_of_refund(&refund_tags(&['V', 'M'])), 'V');
        assert_eq!(form_of_refund(&refund_tags(&[BLANK, 'M'])), 'M');
        assert_eq!(form_of_refund(&refund_tags(&[BLANK, BLANK])), BLANK);
    }

    #[test]
    fn test_stopover_connection() {
        assert_eq!(stopover_connection(&stopover_tags(&[BLANK, BLANK])), BLANK);
        assert_eq!(stopover_connection(&stopover_tags(&[BLANK, 'B', 'C'])), 'B');
        assert_eq!(stopover_connection(&stopover_tags(&['C', 'C'])), 'C');
        assert_eq!(stopover_connection(&stopover_tags(&['C', BLANK, 'S'])), 'B');
        assert_eq!(stopover_connection(&stopover_tags(&['S', 'S'])), 'S');
        assert_eq!(stopover_connection(&stopover_tags(&['S', 'C'])), 'B');
        assert_eq!(stopover_connection(&stopover_tags(&[BLANK, 'S'])), 'S');
    }

    fn endorsement_byte() -> impl Strategy<Value = char> {
        prop::sample::select(vec![BLANK, 'X', 'W', 'Y'])
    }

    proptest! {
        #[test]
        fn prop_endorsement_is_first_present_in_hierarchy(values in prop::collection::vec(endorsement_byte(), 0..6)) {
            let expected = ENDORSEMENT_HIERARCHY
                .iter()
                .copied()
                .find(|b| values.contains(b))
                .unwrap_or(ENDORSEMENT_Y);
            prop_assert_eq!(endorsement(&endorsement_tags(&values)), expected);
        }

        #[test]
        fn prop_reissue_to_lower_f_wins_when_present(values in prop::collection::vec(prop::sample::select(vec![BLANK, 'F', 'R']), 0..6)) {
            let expected = if values.contains(&'F') {
                'F'
            } else if values.contains(&'R') {
                'R'
            } else {
                BLANK
            };
            prop_assert_eq!(reissue_to_lower(&reissue_to_lower_tags(&values)), expected);
        }

        #[test]
        fn prop_residual_unanimous_is_identity(
            value in prop::sample::select(vec![BLANK, 'N', 'R', 'S']),
            hierarchies in prop::collection::vec(prop::sample::select(vec![BLANK, 'X', '1']), 1..5),
            changed in prop::collection::vec(any::<bool>(), 5),
        ) {
            let tags: Vec<_> = hierarchies
                .iter()
                .zip(changed.iter())
                .map(|(h, c)| {
                    let change = if *c { SegmentChange::Changed } else { SegmentChange::Unchanged };
                    residual_tag(value, *h, change)
                })
                .collect();
            prop_assert_eq!(residual_penalty(&tags), value);
        }
    }
}
