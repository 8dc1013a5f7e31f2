//! Ticketing timing checks against the changed segments of the new itinerary.

use crate::model::{ExchangeTrx, FarePath};
use crate::validation::TriState;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Latest time the reissue may be ticketed to count as simultaneous with
/// the reservation of the changed segments.
///
/// Starts from the most recently booked changed segment. Domestic-like
/// journeys get `grace_minutes`; international ones get the rest of the
/// booking day. `None` when no changed segment carries a booking date.
pub fn latest_ticketing_time(
    trx: &ExchangeTrx,
    fare_path: &FarePath,
    grace_minutes: i64,
) -> Option<NaiveDateTime> {
    let booked = fare_path
        .travel_segs()
        .filter(|seg| seg.change.is_changed())
        .filter_map(|seg| seg.booking_date)
        .max()?;

    if trx.is_domestic_like() {
        Some(booked + Duration::minutes(grace_minutes))
    } else {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)?;
        Some(booked.date().and_time(end_of_day))
    }
}

/// Earliest departure date among changed segments.
pub fn earliest_changed_departure(fare_path: &FarePath) -> Option<NaiveDate> {
    fare_path
        .travel_segs()
        .filter(|seg| seg.change.is_changed())
        .map(|seg| seg.departure.date())
        .min()
}

/// Both checks, each computed at most once per validator.
#[derive(Debug, Clone, Default)]
pub struct TicketingChecks {
    simultaneous: TriState,
    prior_of_departure: TriState,
}

impl TicketingChecks {
    pub fn new() -> Self {
        TicketingChecks::default()
    }

    /// Ticket issued on or before the latest simultaneous ticketing time.
    pub fn simultaneous(&mut self, trx: &ExchangeTrx, fare_path: &FarePath, grace_minutes: i64) -> bool {
        self.simultaneous.resolve(|| {
            latest_ticketing_time(trx, fare_path, grace_minutes)
                .map_or(true, |latest| trx.ticketing.date <= latest)
        })
    }

    /// Ticket issued strictly before the first changed departure date.
    pub fn prior_of_departure(&mut self, trx: &ExchangeTrx, fare_path: &FarePath) -> bool {
        self.prior_of_departure.resolve(|| {
            earliest_changed_departure(fare_path)
                .map_or(true, |first| trx.ticketing.date.date() < first)
        })
    }

    pub fn simultaneous_state(&self) -> TriState {
        self.simultaneous
    }

    pub fn prior_of_departure_state(&self) -> TriState {
        self.prior_of_departure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        FareUsage, GeoTravelType, PricingUnit, SegmentChange, TicketingPoint, TravelSeg,
    };
    use crate::test_support::{dt, market_with, seg};

    fn changed(board: &str, off: &str, departure: NaiveDateTime, booked: NaiveDateTime) -> TravelSeg {
        TravelSeg {
            booking_date: Some(booked),
            change: SegmentChange::Changed,
            ..seg(board, off, departure)
        }
    }

    fn path(segments: Vec<TravelSeg>) -> FarePath {
        let fm = market_with(segments, SegmentChange::Changed);
        FarePath::new(vec![PricingUnit::new(vec![FareUsage::new(fm)])])
    }

    fn trx(ticketed: NaiveDateTime, geo: GeoTravelType) -> ExchangeTrx {
        ExchangeTrx {
            ticketing: TicketingPoint {
                date: ticketed,
                location: "DFW".to_string(),
            },
            original_ticketing: TicketingPoint {
                date: dt(1, 10, 8, 0),
                location: "DFW".to_string(),
            },
            previous_exchange: None,
            geo_travel_type: geo,
            origin_nation: "US".to_string(),
            travel_commenced: false,
            exc_fare_components: Vec::new(),
        }
    }

    #[test]
    fn test_domestic_grace_window() {
        let fp = path(vec![
            changed("DFW", "ORD", dt(5, 1, 9, 0), dt(4, 1, 10, 0)),
            changed("ORD", "BOS", dt(5, 1, 14, 0), dt(4, 1, 11, 0)),
        ]);
        let t = trx(dt(4, 1, 11, 30), GeoTravelType::Domestic);
        assert_eq!(latest_ticketing_time(&t, &fp, 30), Some(dt(4, 1, 11, 30)));
        assert!(TicketingChecks::new().simultaneous(&t, &fp, 30));

        let late = trx(dt(4, 1, 11, 31), GeoTravelType::Domestic);
        assert!(!TicketingChecks::new().simultaneous(&late, &fp, 30));
    }

    #[test]
    fn test_international_end_of_day() {
        let fp = path(vec![changed("DFW", "LHR", dt(5, 1, 18, 0), dt(4, 1, 10, 0))]);
        let t = trx(dt(4, 1, 23, 0), GeoTravelType::International);
        assert!(TicketingChecks::new().simultaneous(&t, &fp, 30));
        let next_day = trx(dt(4, 2, 0, 5), GeoTravelType::International);
        assert!(!TicketingChecks::new().simultaneous(&next_day, &fp, 30));
    }

    #[test]
    fn test_canadian_foreign_domestic_uses_grace() {
        let fp = path(vec![changed("YYZ", "YVR", dt(5, 1, 9, 0), dt(4, 1, 10, 0))]);
        let mut t = trx(dt(4, 1, 12, 0), GeoTravelType::ForeignDomestic);
        t.origin_nation = "CA".to_string();
        assert!(!TicketingChecks::new().simultaneous(&t, &fp, 30));
        t.origin_nation = "MX".to_string();
        assert!(TicketingChecks::new().simultaneous(&t, &fp, 30));
    }

    #[test]
    fn test_prior_of_departure_is_strict() {
        let fp = path(vec![
            seg("DFW", "ORD", dt(4, 20, 9, 0)),
            changed("ORD", "BOS", dt(5, 1, 9, 0), dt(4, 1, 10, 0)),
        ]);
        assert!(TicketingChecks::new().prior_of_departure(&trx(dt(4, 30, 23, 0), GeoTravelType::Domestic), &fp));
        assert!(!TicketingChecks::new().prior_of_departure(&trx(dt(5, 1, 6, 0), GeoTravelType::Domestic), &fp));
    }

    #[test]
    fn test_no_changed_segments_pass() {
        let fp = path(vec![seg("DFW", "ORD", dt(5, 1, 9, 0))]);
        let t = trx(dt(6, 1, 9, 0), GeoTravelType::Domestic);
        let mut checks = TicketingChecks::new();
        assert!(checks.simultaneous(&t, &fp, 30));
        assert!(checks.prior_of_departure(&t, &fp));
    }

    #[test]
    fn test_results_are_memoized() {
        let fp = path(vec![changed("DFW", "ORD", dt(5, 1, 9, 0), dt(4, 1, 10, 0))]);
        let mut checks = TicketingChecks::new();
        assert_eq!(checks.simultaneous_state(), TriState::NotProcessed);
        assert!(!checks.simultaneous(&trx(dt(4, 3, 9, 0), GeoTravelType::Domestic), &fp, 30));
        assert_eq!(checks.simultaneous_state(), TriState::Invalid);
        // a later transaction that would pass still sees the stored outcome
        assert!(!checks.simultaneous(&trx(dt(4, 1, 10, 0), GeoTravelType::Domestic), &fp, 30));
        assert_eq!(checks.prior_of_departure_state(), TriState::NotProcessed);
    }
}
