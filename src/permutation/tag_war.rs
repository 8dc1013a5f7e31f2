//! Tag war: one fare application per change status category, picked from
//! the process tags of a permutation through a fixed priority matrix.

use crate::model::{FareApplication, FcChangeStatus, ProcessTag};
use crate::permutation::{ProcessTagInfo, ProcessTagPermutation};
use std::rc::Rc;
use tracing::trace;

use crate::model::FareApplication::{
    Cancel as CX, Current as CU, Historical as HI, Keep as KP, TravelCommencement as TC,
    UnknownFa as UK,
};

/// Rows are process tags 0-11; columns are UU, UN, FL, UC.
const FARE_APPL_MATRIX: [[FareApplication; 4]; 12] = [
    [UK, UK, UK, UK], // 0: not supported
    [KP, KP, KP, KP], // 1: keep the fares
    [HI, HI, HI, HI], // 2: guaranteed air fare
    [CU, CU, KP, CU], // 3: keep fares for traveled fare components
    [KP, HI, KP, HI], // 4: keep fares for unchanged fare components
    [CU, CU, CU, CU], // 5: no guaranteed fares
    [TC, TC, TC, TC], // 6: travel commencement air fares
    [HI, HI, KP, HI], // 7: reissue down to lower fare
    [UK, UK, UK, UK], // 8: not supported
    [CU, CU, HI, CU], // 9: historical fares for traveled fare components
    [KP, CU, KP, CU], // 10: keep for unchanged, current for changed
    [CX, CX, CX, CX], // 11: cancel and start over
];

fn column(status: FcChangeStatus) -> Option<usize> {
    match status {
        FcChangeStatus::Uu => Some(0),
        FcChangeStatus::Un => Some(1),
        FcChangeStatus::Fl => Some(2),
        FcChangeStatus::Uc => Some(3),
        FcChangeStatus::Unknown => None,
    }
}

/// Raw matrix lookup; unknown tags and statuses give `UnknownFa`.
pub fn matrix_value(tag: ProcessTag, status: FcChangeStatus) -> FareApplication {
    let Some(col) = column(status) else {
        return FareApplication::UnknownFa;
    };
    FARE_APPL_MATRIX
        .get(usize::from(tag.number()))
        .map_or(FareApplication::UnknownFa, |row| row[col])
}

fn tag_value(tag: ProcessTag, status: FcChangeStatus, travel_commenced: bool) -> FareApplication {
    if tag == ProcessTag::TRAVEL_COMENCEMENT_AIR_FARES && !travel_commenced {
        FareApplication::Current
    } else {
        matrix_value(tag, status)
    }
}

/// Fare application for `status`, recording the winning tag in the
/// permutation's winner map.
///
/// Only tags with a reissue sequence take part. Among tied HISTORICAL
/// results the higher numbered tag is recorded as the winner.
pub fn fare_application(
    perm: &mut ProcessTagPermutation,
    status: FcChangeStatus,
    travel_commenced: bool,
) -> FareApplication {
    let mut result = FareApplication::UnknownFa;
    let mut winner: Option<Rc<ProcessTagInfo>> = None;

    for pti in perm.process_tags().iter().filter(|pti| pti.has_sequence()) {
        let tag = pti.process_tag();
        let fa = tag_value(tag, status, travel_commenced);
        let historical_tie = fa == FareApplication::Historical
            && result == FareApplication::Historical
            && winner
                .as_ref()
                .is_some_and(|w| tag.number() > w.process_tag().number());

        if fa > result || historical_tie {
            result = fa;
            winner = Some(Rc::clone(pti));
        }
    }

    trace!(
        permutation = perm.number(),
        status = %status,
        fare_appl = %result,
        winner_fc = winner.as_ref().map(|w| w.fare_comp_number()),
        winner_tag = winner.as_ref().map(|w| w.process_tag().number()),
        "tag war resolved"
    );

    if let Some(w) = winner {
        perm.record_winner(result, w);
    }
    result
}

/// Which fare application map of the permutation is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareApplTarget {
    Actual,
    Rebook,
}

/// Runs the tag war for UU, UC, UN and FL and stores the results.
pub fn apply_tag_war(perm: &mut ProcessTagPermutation, travel_commenced: bool, target: FareApplTarget) {
    for status in FcChangeStatus::ALL {
        let fa = fare_application(perm, status, travel_commenced);
        match target {
            FareApplTarget::Actual => perm.set_fare_appl(status, fa),
            FareApplTarget::Rebook => perm.set_rebook_fare_appl(status, fa),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReissueSequence, BLANK};
    use crate::test_support::{fare_comp, market, record3, tag_info, tag_info_no_seq};
    use proptest::prelude::*;

    fn perm_of(tags: &[ProcessTag]) -> ProcessTagPermutation {
        let infos = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let fc = fare_comp(i as u16 + 1, market("DFW", "LAX"));
                tag_info(
                    &fc,
                    record3(BLANK),
                    ReissueSequence {
                        process_tag: *tag,
                        seq_no: i as u32 + 1,
                        ..ReissueSequence::default()
                    },
                )
            })
            .collect();
        ProcessTagPermutation::with_tags(1, infos)
    }

    #[test]
    fn test_keep_the_fares() {
        let mut perm = perm_of(&[ProcessTag::KEEP_THE_FARES, ProcessTag::KEEP_THE_FARES]);
        assert_eq!(fare_application(&mut perm, FcChangeStatus::Uu, false), FareApplication::Keep);
        assert_eq!(fare_application(&mut perm, FcChangeStatus::Fl, false), FareApplication::Keep);
        assert!(perm.need_keep_fare());
    }

    #[test]
    fn test_travel_commencement() {
        let tags = [
            ProcessTag::TRAVEL_COMENCEMENT_AIR_FARES,
            ProcessTag::TRAVEL_COMENCEMENT_AIR_FARES,
        ];
        let mut commenced = perm_of(&tags);
        assert_eq!(
            fare_application(&mut commenced, FcChangeStatus::Uu, true),
            FareApplication::TravelCommencement
        );
        let mut not_commenced = perm_of(&tags);
        assert_eq!(
            fare_application(&mut not_commenced, FcChangeStatus::Uu, false),
            FareApplication::Current
        );
    }

    #[test]
    fn test_no_sequence_gives_unknown_and_no_winner() {
        let fc = fare_comp(1, market("DFW", "LAX"));
        let mut perm = ProcessTagPermutation::with_tags(1, vec![tag_info_no_seq(&fc, record3(BLANK))]);
        assert_eq!(fare_application(&mut perm, FcChangeStatus::Uu, false), FareApplication::UnknownFa);
        assert!(perm.fare_appl_winner_tags().is_empty());
    }

    #[test]
    fn test_unsupported_tags() {
        for status in FcChangeStatus::ALL {
            assert_eq!(matrix_value(ProcessTag::NO_PROCESS_TAG, status), FareApplication::UnknownFa);
            assert_eq!(matrix_value(ProcessTag::UNSUPPORTED_TAG_8, status), FareApplication::UnknownFa);
            assert_eq!(matrix_value(ProcessTag(42), status), FareApplication::UnknownFa);
        }
        assert_eq!(
            matrix_value(ProcessTag::KEEP_THE_FARES, FcChangeStatus::Unknown),
            FareApplication::UnknownFa
        );
    }

    #[test]
    fn test_matrix_column_order() {
        let tag = ProcessTag::KEEP_FARES_FOR_UNCHANGED_FC;
        assert_eq!(matrix_value(tag, FcChangeStatus::Uu), FareApplication::Keep);
        assert_eq!(matrix_value(tag, FcChangeStatus::Un), FareApplication::Historical);
        assert_eq!(matrix_value(tag, FcChangeStatus::Fl), FareApplication::Keep);
        assert_eq!(matrix_value(tag, FcChangeStatus::Uc), FareApplication::Historical);
    }

    #[test]
    fn test_higher_priority_wins() {
        let mut perm = perm_of(&[ProcessTag::KEEP_THE_FARES, ProcessTag::NO_GUARANTEED_FARES]);
        assert_eq!(fare_application(&mut perm, FcChangeStatus::Uu, false), FareApplication::Current);
        let winner = &perm.fare_appl_winner_tags()[&FareApplication::Current];
        assert_eq!(winner.fare_comp_number(), 2);
    }

    #[test]
    fn test_historical_tie_prefers_higher_tag_number() {
        let tags = [ProcessTag::REISSUE_DOWN_TO_LOWER_FARE, ProcessTag::GUARANTEED_AIR_FARE];
        let mut perm = perm_of(&tags);
        assert_eq!(fare_application(&mut perm, FcChangeStatus::Uu, false), FareApplication::Historical);
        let winner = &perm.fare_appl_winner_tags()[&FareApplication::Historical];
        assert_eq!(winner.process_tag(), ProcessTag::REISSUE_DOWN_TO_LOWER_FARE);

        let mut reversed = perm_of(&[tags[1], tags[0]]);
        fare_application(&mut reversed, FcChangeStatus::Uu, false);
        let winner = &reversed.fare_appl_winner_tags()[&FareApplication::Historical];
        assert_eq!(winner.process_tag(), ProcessTag::REISSUE_DOWN_TO_LOWER_FARE);
    }

    #[test]
    fn test_apply_tag_war_fills_selected_map() {
        let mut perm = perm_of(&[ProcessTag::KEEP_FARES_FOR_UNCHANGED_FC]);
        apply_tag_war(&mut perm, false, FareApplTarget::Actual);
        assert_eq!(perm.fare_appl(FcChangeStatus::Uu), FareApplication::Keep);
        assert_eq!(perm.fare_appl(FcChangeStatus::Uc), FareApplication::Historical);
        assert_eq!(perm.rebook_fare_appl(FcChangeStatus::Uu), FareApplication::UnknownFa);

        apply_tag_war(&mut perm, false, FareApplTarget::Rebook);
        assert_eq!(perm.rebook_fare_appl(FcChangeStatus::Un), FareApplication::Historical);
        assert!(perm.fare_appl_winner_tags().contains_key(&FareApplication::Keep));
        assert!(perm.fare_appl_winner_tags().contains_key(&FareApplication::Historical));
    }

    fn supported_tag() -> impl Strategy<Value = ProcessTag> {
        (1u8..=11).prop_filter("tag 8 unsupported", |t| *t != 8).prop_map(ProcessTag)
    }

    fn status() -> impl Strategy<Value = FcChangeStatus> {
        prop::sample::select(FcChangeStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_adding_stronger_tag_takes_over(
            tags in prop::collection::vec(supported_tag(), 1..5),
            extra in supported_tag(),
            status in status(),
        ) {
            let mut base = perm_of(&tags);
            let before = fare_application(&mut base, status, true);
            let extra_value = matrix_value(extra, status);

            let mut all = tags.clone();
            all.push(extra);
            let mut grown = perm_of(&all);
            let after = fare_application(&mut grown, status, true);

            if extra_value > before {
                prop_assert_eq!(after, extra_value);
                let winner = &grown.fare_appl_winner_tags()[&after];
                prop_assert_eq!(usize::from(winner.fare_comp_number()), all.len());
            } else if extra_value < before {
                prop_assert_eq!(after, before);
            }
        }
    }
}
