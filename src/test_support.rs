//! Builders shared by unit tests.

use crate::model::{
    FareCompInfo, FareMarket, ReissueSequence, ReissueSequenceW, SegmentChange, TravelSeg,
    VoluntaryChangesInfo, VoluntaryChangesInfoW,
};
use crate::permutation::ProcessTagInfo;
use chrono::{NaiveDate, NaiveDateTime};
use std::rc::Rc;

pub fn dt(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap()
}

pub fn seg(board: &str, off: &str, departure: NaiveDateTime) -> TravelSeg {
    TravelSeg {
        board: board.to_string(),
        off: off.to_string(),
        carrier: "AA".to_string(),
        departure,
        booking_date: None,
        stopover: false,
        change: SegmentChange::Unchanged,
    }
}

pub fn market_with(segments: Vec<TravelSeg>, change_status: SegmentChange) -> Rc<FareMarket> {
    let board = segments.first().map(|s| s.board.clone()).unwrap_or_default();
    let off = segments.last().map(|s| s.off.clone()).unwrap_or_default();
    Rc::new(FareMarket {
        board,
        off,
        governing_carrier: "AA".to_string(),
        segments,
        change_status,
    })
}

pub fn market(board: &str, off: &str) -> Rc<FareMarket> {
    market_with(vec![seg(board, off, dt(6, 1, 9, 0))], SegmentChange::Unchanged)
}

pub fn fare_comp(number: u16, fare_market: Rc<FareMarket>) -> Rc<FareCompInfo> {
    Rc::new(FareCompInfo::new(number, fare_market))
}

pub fn record3(endorsement: char) -> VoluntaryChangesInfo {
    VoluntaryChangesInfo {
        endorsement,
        ..VoluntaryChangesInfo::default()
    }
}

pub fn tag_info(
    fc: &Rc<FareCompInfo>,
    rec: VoluntaryChangesInfo,
    seq: ReissueSequence,
) -> Rc<ProcessTagInfo> {
    Rc::new(ProcessTagInfo::new(
        Rc::clone(fc),
        VoluntaryChangesInfoW::new(Rc::new(rec)),
        ReissueSequenceW::new(Some(Rc::new(seq))),
    ))
}

pub fn tag_info_no_seq(fc: &Rc<FareCompInfo>, rec: VoluntaryChangesInfo) -> Rc<ProcessTagInfo> {
    Rc::new(ProcessTagInfo::new(
        Rc::clone(fc),
        VoluntaryChangesInfoW::new(Rc::new(rec)),
        ReissueSequenceW::new(None),
    ))
}
