//! Domain vocabulary shared by the permutation and validation layers.
//!
//! Rule bytes are carried as `char` the way the rule tables publish them; the
//! blank byte is a literal space.

pub mod fare;
pub mod record3;
pub mod reissue;

pub use fare::{
    ExchangeTrx, FareCompInfo, FareMarket, FarePath, FareRetrieval, FareUsage, GeoTravelType,
    PricingUnit, SegmentChange, TicketingPoint, TravelSeg,
};
pub use record3::{OverriddenBytes, Record3Byte, VoluntaryChangesInfo, VoluntaryChangesInfoW};
pub use reissue::{ReissueSequence, ReissueSequenceW, SequenceKey};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Blank rule byte.
pub const BLANK: char = ' ';

/// Neutral unit of construction; never converted into.
pub const NUC: &str = "NUC";

pub type LocCode = String;
pub type CurrencyCode = String;
pub type CarrierCode = String;

/// Process tag published on a reissue sequence (1-11).
///
/// Kept as a raw number: the tag war tie-break compares tag numbers, and
/// tables may publish values the matrix does not support.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessTag(pub u8);

impl ProcessTag {
    pub const NO_PROCESS_TAG: ProcessTag = ProcessTag(0);
    pub const KEEP_THE_FARES: ProcessTag = ProcessTag(1);
    pub const GUARANTEED_AIR_FARE: ProcessTag = ProcessTag(2);
    pub const KEEP_FARES_FOR_TRAVELED_FC: ProcessTag = ProcessTag(3);
    pub const KEEP_FARES_FOR_UNCHANGED_FC: ProcessTag = ProcessTag(4);
    pub const NO_GUARANTEED_FARES: ProcessTag = ProcessTag(5);
    pub const TRAVEL_COMENCEMENT_AIR_FARES: ProcessTag = ProcessTag(6);
    pub const REISSUE_DOWN_TO_LOWER_FARE: ProcessTag = ProcessTag(7);
    /// Published but not handled by the tag war.
    pub const UNSUPPORTED_TAG_8: ProcessTag = ProcessTag(8);
    pub const HISTORICAL_FARES_FOR_TRAVELED_FC: ProcessTag = ProcessTag(9);
    pub const KEEP_FOR_UNCH_CURRENT_FOR_CHNG: ProcessTag = ProcessTag(10);
    pub const CANCEL_AND_START_OVER: ProcessTag = ProcessTag(11);

    pub fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ProcessTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fare application outcome of the tag war. Declaration order is priority:
/// a later variant beats an earlier one.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FareApplication {
    #[default]
    UnknownFa = 0,
    TravelCommencement,
    Historical,
    Keep,
    Current,
    Cancel,
}

impl FareApplication {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownFa => "UNKNOWN_FA",
            Self::TravelCommencement => "TRAVEL_COMMENCEMENT",
            Self::Historical => "HISTORICAL",
            Self::Keep => "KEEP",
            Self::Current => "CURRENT",
            Self::Cancel => "CANCEL",
        }
    }
}

impl fmt::Display for FareApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a fare component's segments changed between the exchanged and the
/// new itinerary.
#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum FcChangeStatus {
    /// Unchanged / unchanged.
    #[serde(rename = "UU")]
    Uu,
    /// Unchanged / changed.
    #[serde(rename = "UC")]
    Uc,
    /// Unchanged / new.
    #[serde(rename = "UN")]
    Un,
    /// Flown.
    #[serde(rename = "FL")]
    Fl,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl FcChangeStatus {
    /// The four categories the tag war is run for.
    pub const ALL: [FcChangeStatus; 4] = [
        FcChangeStatus::Uu,
        FcChangeStatus::Uc,
        FcChangeStatus::Un,
        FcChangeStatus::Fl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uu => "UU",
            Self::Uc => "UC",
            Self::Un => "UN",
            Self::Fl => "FL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for FcChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved value of 988 byte 156 (new ticket equal or higher).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqualOrHigherInd {
    #[default]
    Blank,
    B,
    N,
    /// Both `B` and `N` were published across the permutation.
    BN,
}

impl EqualOrHigherInd {
    pub fn from_byte(byte: char) -> Self {
        match byte {
            'B' => Self::B,
            'N' => Self::N,
            _ => Self::Blank,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blank => " ",
            Self::B => "B",
            Self::N => "N",
            Self::BN => "BN",
        }
    }
}

/// Amount in a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Money {
            amount,
            currency: currency.to_string(),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Money::new(Decimal::ZERO, currency)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fare_application_priority_order() {
        assert!(FareApplication::Cancel > FareApplication::Current);
        assert!(FareApplication::Current > FareApplication::Keep);
        assert!(FareApplication::Keep > FareApplication::Historical);
        assert!(FareApplication::Historical > FareApplication::TravelCommencement);
        assert!(FareApplication::TravelCommencement > FareApplication::UnknownFa);
        assert_eq!(FareApplication::UnknownFa as u8, 0);
    }

    #[test]
    fn test_change_status_serde_names() {
        let json = serde_json::to_string(&FcChangeStatus::Uc).unwrap();
        assert_eq!(json, "\"UC\"");
        let back: FcChangeStatus = serde_json::from_str("\"FL\"").unwrap();
        assert_eq!(back, FcChangeStatus::Fl);
    }

    #[test]
    fn test_equal_or_higher_from_byte() {
        assert_eq!(EqualOrHigherInd::from_byte('B'), EqualOrHigherInd::B);
        assert_eq!(EqualOrHigherInd::from_byte('N'), EqualOrHigherInd::N);
        assert_eq!(EqualOrHigherInd::from_byte(BLANK), EqualOrHigherInd::Blank);
        assert_eq!(EqualOrHigherInd::BN.as_str(), "BN");
    }
}
