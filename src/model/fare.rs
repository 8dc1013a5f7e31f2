//! Itinerary and pricing structures consumed by the engine.
//!
//! These are read-mostly inputs built by the pricing transaction; the engine
//! never mutates them.

use crate::model::{CarrierCode, LocCode};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Change status of a segment or fare market relative to the exchanged ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentChange {
    #[default]
    Unchanged,
    Changed,
    Flown,
}

impl SegmentChange {
    pub fn is_changed(self) -> bool {
        self == SegmentChange::Changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelSeg {
    pub board: LocCode,
    pub off: LocCode,
    pub carrier: CarrierCode,
    /// Local departure time at `board`.
    pub departure: NaiveDateTime,
    /// When the segment was booked, if known.
    #[serde(default)]
    pub booking_date: Option<NaiveDateTime>,
    /// The boarding point of this segment is a stopover (not a connection).
    #[serde(default)]
    pub stopover: bool,
    #[serde(default)]
    pub change: SegmentChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareMarket {
    pub board: LocCode,
    pub off: LocCode,
    pub governing_carrier: CarrierCode,
    pub segments: Vec<TravelSeg>,
    #[serde(default)]
    pub change_status: SegmentChange,
}

impl FareMarket {
    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.segments.first().map(|seg| seg.departure)
    }

    pub fn origin(&self) -> &str {
        &self.board
    }
}

/// A fare component of the exchanged ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareCompInfo {
    /// 1-based fare component number on the exchanged ticket.
    pub number: u16,
    pub fare_market: Rc<FareMarket>,
}

impl FareCompInfo {
    pub fn new(number: u16, fare_market: Rc<FareMarket>) -> Self {
        FareCompInfo {
            number,
            fare_market,
        }
    }
}

/// How the repriced fare was retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareRetrieval {
    #[default]
    Current,
    Historical,
    Keep,
    TravelCommencement,
}

/// One fare of the new fare path.
#[derive(Debug, Clone)]
pub struct FareUsage {
    pub fare_market: Rc<FareMarket>,
    /// Exchanged fare component this fare was mapped to.
    pub mapped_exc_fc: Option<u16>,
    pub retrieval: FareRetrieval,
    /// Advance reservation category marked as ignored by keep fare logic.
    pub cat5_ignored_for_keep_fare: bool,
    /// Fare break points and governing carrier match the exchanged ticket.
    pub same_fare_break_and_carrier: bool,
}

impl FareUsage {
    pub fn new(fare_market: Rc<FareMarket>) -> Self {
        FareUsage {
            fare_market,
            mapped_exc_fc: None,
            retrieval: FareRetrieval::Current,
            cat5_ignored_for_keep_fare: false,
            same_fare_break_and_carrier: true,
        }
    }

    pub fn is_current_retrieved(&self) -> bool {
        self.retrieval == FareRetrieval::Current
    }

    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.fare_market.departure()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PricingUnit {
    pub fare_usages: Vec<FareUsage>,
}

impl PricingUnit {
    pub fn new(fare_usages: Vec<FareUsage>) -> Self {
        PricingUnit { fare_usages }
    }

    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.fare_usages.first().and_then(FareUsage::departure)
    }

    pub fn origin(&self) -> Option<&str> {
        self.fare_usages.first().map(|fu| fu.fare_market.origin())
    }
}

/// The repriced (new) fare path.
#[derive(Debug, Clone, Default)]
pub struct FarePath {
    pub pricing_units: Vec<PricingUnit>,
}

impl FarePath {
    pub fn new(pricing_units: Vec<PricingUnit>) -> Self {
        FarePath { pricing_units }
    }

    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.pricing_units.first().and_then(PricingUnit::departure)
    }

    pub fn origin(&self) -> Option<&str> {
        self.pricing_units.first().and_then(PricingUnit::origin)
    }

    pub fn fare_usages(&self) -> impl Iterator<Item = &FareUsage> {
        self.pricing_units.iter().flat_map(|pu| pu.fare_usages.iter())
    }

    /// Segments of the new itinerary in travel order.
    pub fn travel_segs(&self) -> impl Iterator<Item = &TravelSeg> {
        self.fare_usages().flat_map(|fu| fu.fare_market.segments.iter())
    }
}

/// A ticketing event: when and where the ticket was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketingPoint {
    pub date: NaiveDateTime,
    pub location: LocCode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoTravelType {
    Domestic,
    Transborder,
    ForeignDomestic,
    #[default]
    International,
}

/// Exchange transaction context.
#[derive(Debug, Clone)]
pub struct ExchangeTrx {
    /// The reissue being priced now.
    pub ticketing: TicketingPoint,
    pub original_ticketing: TicketingPoint,
    /// Most recent earlier reissue, when the ticket was exchanged before.
    pub previous_exchange: Option<TicketingPoint>,
    pub geo_travel_type: GeoTravelType,
    /// Nation of the journey origin.
    pub origin_nation: String,
    pub travel_commenced: bool,
    /// Fare components of the exchanged ticket, in journey order.
    pub exc_fare_components: Vec<Rc<FareCompInfo>>,
}

impl ExchangeTrx {
    pub fn exc_fare_component(&self, number: u16) -> Option<&Rc<FareCompInfo>> {
        self.exc_fare_components.iter().find(|fc| fc.number == number)
    }

    /// Outbound fare component of the exchanged ticket was changed.
    pub fn outbound_changed(&self) -> bool {
        self.exc_fare_components
            .first()
            .is_some_and(|fc| fc.fare_market.change_status.is_changed())
    }

    /// Domestic, transborder or Canadian foreign domestic journey.
    pub fn is_domestic_like(&self) -> bool {
        match self.geo_travel_type {
            GeoTravelType::Domestic | GeoTravelType::Transborder => true,
            GeoTravelType::ForeignDomestic => self.origin_nation == "CA",
            GeoTravelType::International => false,
        }
    }
}
