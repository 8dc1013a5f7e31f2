//! Scenario files: a JSON description of one exchange, its matched rules
//! and the permutations to evaluate.
//!
//! Records are referenced by id and resolved into shared `Rc` values, so a
//! fare market used by both itineraries is the same object and permutations
//! that pick the same rule for a fare component share one `ProcessTagInfo`.

use crate::error::{Error, Result};
use crate::model::{
    ExchangeTrx, FareCompInfo, FareMarket, FarePath, FareRetrieval, FareUsage, GeoTravelType,
    PricingUnit, Record3Byte, ReissueSequence, ReissueSequenceW, TicketingPoint,
    VoluntaryChangesInfo, VoluntaryChangesInfoW,
};
use crate::permutation::{ProcessTagInfo, ProcessTagPermutation};
use crate::validation::{FixedOffsets, RateTableConverter};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub ticketing: TicketingPoint,
    pub original_ticketing: TicketingPoint,
    #[serde(default)]
    pub previous_exchange: Option<TicketingPoint>,
    #[serde(default)]
    pub geo_travel_type: GeoTravelType,
    #[serde(default)]
    pub origin_nation: String,
    #[serde(default)]
    pub travel_commenced: bool,
    pub fare_markets: HashMap<String, FareMarket>,
    pub fare_components: Vec<FareComponentEntry>,
    #[serde(default)]
    pub record3s: HashMap<String, VoluntaryChangesInfo>,
    #[serde(default)]
    pub sequences: HashMap<String, ReissueSequence>,
    #[serde(default)]
    pub permutations: Vec<PermutationEntry>,
    #[serde(default)]
    pub unmatched_fare_components: BTreeSet<u16>,
    pub fare_path: Vec<Vec<FareUsageEntry>>,
    #[serde(default)]
    pub utc_offsets: HashMap<String, i64>,
    #[serde(default)]
    pub currency_rates: Vec<RateEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FareComponentEntry {
    pub number: u16,
    pub fare_market: String,
}

#[derive(Debug, Deserialize)]
pub struct PermutationEntry {
    pub number: u32,
    pub tags: Vec<TagEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TagEntry {
    pub fare_component: u16,
    pub record3: String,
    #[serde(default)]
    pub overriding_record3: Option<String>,
    #[serde(default)]
    pub overridden_bytes: Vec<Record3Byte>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub overriding_sequence: Option<String>,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FareUsageEntry {
    pub fare_market: String,
    #[serde(default)]
    pub mapped_exc_fc: Option<u16>,
    #[serde(default)]
    pub retrieval: FareRetrieval,
    #[serde(default)]
    pub cat5_ignored_for_keep_fare: bool,
    #[serde(default = "default_valid")]
    pub same_fare_break_and_carrier: bool,
}

#[derive(Debug, Deserialize)]
pub struct RateEntry {
    pub from: String,
    pub to: String,
    pub rate: Decimal,
}

/// A loaded scenario with every reference resolved.
#[derive(Debug)]
pub struct Scenario {
    pub trx: ExchangeTrx,
    pub fare_path: FarePath,
    pub permutations: Vec<ProcessTagPermutation>,
    pub unmatched_fare_components: BTreeSet<u16>,
    pub offsets: FixedOffsets,
    pub rates: RateTableConverter,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        Builder::default().build(file)
    }
}

#[derive(Default)]
struct Builder {
    markets: HashMap<String, Rc<FareMarket>>,
    fare_comps: HashMap<u16, Rc<FareCompInfo>>,
    record3s: HashMap<String, Rc<VoluntaryChangesInfo>>,
    sequences: HashMap<String, Rc<ReissueSequence>>,
    tag_infos: HashMap<TagEntry, Rc<ProcessTagInfo>>,
}

impl Builder {
    fn build(mut self, file: ScenarioFile) -> Result<Scenario> {
        self.markets = file
            .fare_markets
            .into_iter()
            .map(|(id, fm)| (id, Rc::new(fm)))
            .collect();
        self.record3s = file
            .record3s
            .into_iter()
            .map(|(id, rec)| (id, Rc::new(rec)))
            .collect();
        self.sequences = file
            .sequences
            .into_iter()
            .map(|(id, seq)| (id, Rc::new(seq)))
            .collect();

        let mut exc_fare_components = Vec::with_capacity(file.fare_components.len());
        for entry in &file.fare_components {
            let fc = Rc::new(FareCompInfo::new(entry.number, self.market(&entry.fare_market)?));
            if self.fare_comps.insert(entry.number, Rc::clone(&fc)).is_some() {
                return Err(Error::Scenario(format!("duplicate fare component {}", entry.number)));
            }
            exc_fare_components.push(fc);
        }

        let pricing_units = file
            .fare_path
            .iter()
            .map(|pu| {
                pu.iter()
                    .map(|fu| self.fare_usage(fu))
                    .collect::<Result<Vec<_>>>()
                    .map(PricingUnit::new)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut permutations = Vec::with_capacity(file.permutations.len());
        for entry in &file.permutations {
            let mut perm = ProcessTagPermutation::new(entry.number);
            for tag in &entry.tags {
                perm.add_process_tag(self.tag_info(tag)?);
            }
            permutations.push(perm);
        }

        let offsets = file
            .utc_offsets
            .iter()
            .fold(FixedOffsets::new(), |acc, (loc, minutes)| acc.with_location(loc, *minutes));
        let rates = file
            .currency_rates
            .iter()
            .fold(RateTableConverter::new(), |acc, r| acc.with_rate(&r.from, &r.to, r.rate));

        debug!(
            fare_components = exc_fare_components.len(),
            permutations = permutations.len(),
            shared_tag_infos = self.tag_infos.len(),
            "scenario loaded"
        );

        Ok(Scenario {
            trx: ExchangeTrx {
                ticketing: file.ticketing,
                original_ticketing: file.original_ticketing,
                previous_exchange: file.previous_exchange,
                geo_travel_type: file.geo_travel_type,
                origin_nation: file.origin_nation,
                travel_commenced: file.travel_commenced,
                exc_fare_components,
            },
            fare_path: FarePath::new(pricing_units),
            permutations,
            unmatched_fare_components: file.unmatched_fare_components,
            offsets,
            rates,
        })
    }

    fn market(&self, id: &str) -> Result<Rc<FareMarket>> {
        self.markets
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Scenario(format!("unknown fare market '{}'", id)))
    }

    fn record3(&self, id: &str) -> Result<Rc<VoluntaryChangesInfo>> {
        self.record3s
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Scenario(format!("unknown record3 '{}'", id)))
    }

    fn sequence(&self, id: &str) -> Result<Rc<ReissueSequence>> {
        self.sequences
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Scenario(format!("unknown sequence '{}'", id)))
    }

    fn fare_usage(&self, entry: &FareUsageEntry) -> Result<FareUsage> {
        if let Some(n) = entry.mapped_exc_fc {
            if !self.fare_comps.contains_key(&n) {
                return Err(Error::Scenario(format!("fare usage mapped to unknown fare component {}", n)));
            }
        }
        Ok(FareUsage {
            fare_market: self.market(&entry.fare_market)?,
            mapped_exc_fc: entry.mapped_exc_fc,
            retrieval: entry.retrieval,
            cat5_ignored_for_keep_fare: entry.cat5_ignored_for_keep_fare,
            same_fare_break_and_carrier: entry.same_fare_break_and_carrier,
        })
    }

    fn tag_info(&mut self, entry: &TagEntry) -> Result<Rc<ProcessTagInfo>> {
        if let Some(shared) = self.tag_infos.get(entry) {
            return Ok(Rc::clone(shared));
        }

        let fare_comp = self
            .fare_comps
            .get(&entry.fare_component)
            .cloned()
            .ok_or_else(|| Error::Scenario(format!("unknown fare component {}", entry.fare_component)))?;

        let orig = self.record3(&entry.record3)?;
        let record3 = match &entry.overriding_record3 {
            Some(id) => VoluntaryChangesInfoW::with_overriding(
                orig,
                self.record3(id)?,
                entry.overridden_bytes.iter().copied().collect(),
            ),
            None => VoluntaryChangesInfoW::new(orig),
        };

        let reissue_sequence = match (&entry.sequence, &entry.overriding_sequence) {
            (Some(id), Some(over)) => ReissueSequenceW::with_overriding(self.sequence(id)?, self.sequence(over)?),
            (Some(id), None) => ReissueSequenceW::new(Some(self.sequence(id)?)),
            (None, Some(_)) => {
                return Err(Error::Scenario(format!(
                    "fare component {}: overriding sequence without a sequence",
                    entry.fare_component
                )))
            }
            (None, None) => ReissueSequenceW::new(None),
        };

        let info = Rc::new(ProcessTagInfo::new(fare_comp, record3, reissue_sequence).with_validity(entry.valid));
        self.tag_infos.insert(entry.clone(), Rc::clone(&info));
        Ok(info)
    }
}
