//! Per-domain accumulators of viewing seconds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// A persistent map of canonical domain to accumulated seconds.
///
/// Grows monotonically within a day and is reset by the day rollover.
/// Backed by a `BTreeMap` so serialization order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger(BTreeMap<String, f64>);

impl Ledger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `seconds` to the accumulator for `domain`.
    pub fn add(&mut self, domain: &Domain, seconds: f64) {
        *self.0.entry(domain.as_str().to_string()).or_insert(0.0) += seconds;
    }

    /// Accumulated seconds for `domain`, zero if absent.
    #[must_use]
    pub fn seconds_for(&self, domain: &Domain) -> f64 {
        self.0.get(domain.as_str()).copied().unwrap_or(0.0)
    }

    /// Deletes the entry for `domain`. Returns true if one existed.
    pub fn remove(&mut self, domain: &Domain) -> bool {
        self.0.remove(domain.as_str()).is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(domain, seconds)| (domain.as_str(), *seconds))
    }

    /// Sum of all accumulated seconds.
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.0.values().sum()
    }
}
