use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-day tap counts keyed by calendar date.
///
/// The mapping is purely associative: a date with no recorded activity reads
/// as 0, and an explicitly stored 0 is equivalent to the date being absent.
/// Serialized form is a flat JSON object keyed by `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TallyStore {
    counts: BTreeMap<NaiveDate, u64>,
}

impl TallyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count recorded for a date. Never fails; missing dates read as 0.
    pub fn get(&self, date: NaiveDate) -> u64 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    /// Applies `delta` to the count for `date` and returns the stored result.
    /// Decrementing past zero clamps at zero instead of failing.
    pub fn adjust(&mut self, date: NaiveDate, delta: i64) -> u64 {
        let next = self.get(date).saturating_add_signed(delta);
        self.counts.insert(date, next);
        next
    }

    /// Wholesale replacement used by import and clear. The previous mapping
    /// is discarded, never merged.
    pub fn replace_all(&mut self, counts: BTreeMap<NaiveDate, u64>) {
        self.counts = counts;
    }

    /// Sum of every recorded day. 0 for a store that never saw activity.
    pub fn lifetime_total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Sum of counts over the given dates. Dates without activity add 0.
    pub fn range_total(&self, dates: impl IntoIterator<Item = NaiveDate>) -> u64 {
        dates.into_iter().map(|date| self.get(date)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &BTreeMap<NaiveDate, u64> {
        &self.counts
    }
}

impl From<BTreeMap<NaiveDate, u64>> for TallyStore {
    fn from(counts: BTreeMap<NaiveDate, u64>) -> Self {
        Self { counts }
    }
}
