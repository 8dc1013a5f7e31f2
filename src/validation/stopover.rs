//! Stopover and connection point match between the exchanged and the new
//! itinerary.
//!
//! Only points inside a fare component count: the boarding point of each
//! fare component's first segment is a fare break, not a stopover or
//! connection of that component.

use crate::diag::{Diagnostic, NoOpDiagnostic};
use crate::model::{ExchangeTrx, FareMarket, FarePath, LocCode, BLANK};
use crate::permutation::ProcessTagPermutation;
use crate::validation::TriState;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Which points must match, from the resolved stopover/connection byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointKind {
    Stopovers,
    Connections,
    Both,
}

impl PointKind {
    pub fn from_byte(byte: char) -> Option<Self> {
        match byte {
            'S' => Some(PointKind::Stopovers),
            'C' => Some(PointKind::Connections),
            'B' => Some(PointKind::Both),
            _ => None,
        }
    }
}

/// Cities left over on each side after matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopoverMismatch {
    pub kind: PointKind,
    pub only_in_old: Vec<LocCode>,
    pub only_in_new: Vec<LocCode>,
}

/// City multiset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cities(BTreeMap<LocCode, usize>);

impl Cities {
    fn insert(&mut self, city: &str) {
        *self.0.entry(city.to_string()).or_default() += 1;
    }

    /// Entries of `self` not matched by `other`, with multiplicity.
    fn difference(&self, other: &Cities) -> Vec<LocCode> {
        self.0
            .iter()
            .flat_map(|(city, &count)| {
                let matched = other.0.get(city).copied().unwrap_or(0);
                std::iter::repeat(city.clone()).take(count.saturating_sub(matched))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct Points {
    stopovers: Cities,
    connections: Cities,
}

impl Points {
    fn collect<'m>(markets: impl Iterator<Item = &'m FareMarket>) -> Self {
        let mut points = Points::default();
        for seg in markets.flat_map(|fm| fm.segments.iter().skip(1)) {
            if seg.stopover {
                points.stopovers.insert(&seg.board);
            } else {
                points.connections.insert(&seg.board);
            }
        }
        points
    }
}

pub struct StopoverConnectionValidator<D = NoOpDiagnostic> {
    old: Points,
    new: Points,
    stopovers: TriState,
    connections: TriState,
    both: TriState,
    diag: D,
}

impl StopoverConnectionValidator<NoOpDiagnostic> {
    pub fn new(trx: &ExchangeTrx, fare_path: &FarePath) -> Self {
        Self::with_diagnostic(trx, fare_path, NoOpDiagnostic)
    }
}

impl<D: Diagnostic> StopoverConnectionValidator<D> {
    pub fn with_diagnostic(trx: &ExchangeTrx, fare_path: &FarePath, diag: D) -> Self {
        StopoverConnectionValidator {
            old: Points::collect(trx.exc_fare_components.iter().map(|fc| fc.fare_market.as_ref())),
            new: Points::collect(fare_path.fare_usages().map(|fu| fu.fare_market.as_ref())),
            stopovers: TriState::NotProcessed,
            connections: TriState::NotProcessed,
            both: TriState::NotProcessed,
            diag,
        }
    }

    pub fn diagnostic(&self) -> &D {
        &self.diag
    }

    fn state(&mut self, kind: PointKind) -> &mut TriState {
        match kind {
            PointKind::Stopovers => &mut self.stopovers,
            PointKind::Connections => &mut self.connections,
            PointKind::Both => &mut self.both,
        }
    }

    /// Leftover cities for `kind`, or `None` when both sides match.
    pub fn mismatch(&self, kind: PointKind) -> Option<StopoverMismatch> {
        let (mut only_in_old, mut only_in_new) = (Vec::new(), Vec::new());
        if matches!(kind, PointKind::Stopovers | PointKind::Both) {
            only_in_old.extend(self.old.stopovers.difference(&self.new.stopovers));
            only_in_new.extend(self.new.stopovers.difference(&self.old.stopovers));
        }
        if matches!(kind, PointKind::Connections | PointKind::Both) {
            only_in_old.extend(self.old.connections.difference(&self.new.connections));
            only_in_new.extend(self.new.connections.difference(&self.old.connections));
        }
        if only_in_old.is_empty() && only_in_new.is_empty() {
            None
        } else {
            Some(StopoverMismatch {
                kind,
                only_in_old,
                only_in_new,
            })
        }
    }

    /// Checks the permutation's resolved stopover/connection byte.
    pub fn validate(&mut self, perm: &ProcessTagPermutation) -> bool {
        let byte = perm.stopover_connection_byte();
        if byte == BLANK {
            return true;
        }
        let Some(kind) = PointKind::from_byte(byte) else {
            debug!(permutation = perm.number(), byte = %byte, "unknown stopover/connection byte");
            return true;
        };
        self.validate_kind(perm.number(), kind)
    }

    pub fn validate_kind(&mut self, permutation: u32, kind: PointKind) -> bool {
        if let Some(done) = self.state(kind).get() {
            return done;
        }
        let mismatch = self.mismatch(kind);
        if let Some(m) = &mismatch {
            self.diag.on_stopover_mismatch(permutation, m);
        }
        let valid = mismatch.is_none();
        *self.state(kind) = TriState::from(valid);
        valid
    }
}
