//! ==============================================================================
//! stats.rs - statistics aggregator
//! ==============================================================================
//!
//! purpose:
//!     scans the store and computes min / max / average per requested metric,
//!     optionally restricted to the half-open range [fromDateTime, toDateTime).
//!
//! leniency:
//!     the query surface never fails. unknown stat names are dropped, bounds
//!     that are absent or unparsable leave that side of the range open, and
//!     metrics with no observations produce no output at all.
//!
//! output order:
//!     grouped by metric in request order (duplicates kept), then
//!     min, max, average within each group.
//!
//! ==============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::MeasurementStore;
use crate::timestamp::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Min,
    Max,
    Average,
}

impl StatKind {
    pub const ALL: [StatKind; 3] = [StatKind::Min, StatKind::Max, StatKind::Average];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "min" => Some(StatKind::Min),
            "max" => Some(StatKind::Max),
            "average" => Some(StatKind::Average),
            _ => None,
        }
    }
}

/// one line of stats output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatResult {
    pub metric: String,
    pub stat: StatKind,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsQuery {
    pub metrics: Vec<String>,
    pub stats: Vec<StatKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl StatsQuery {
    /// build from raw query pairs in the order they appeared
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = StatsQuery::default();
        for (name, value) in pairs {
            match name {
                "metric" => query.metrics.push(value.to_string()),
                "stat" => match StatKind::parse(value) {
                    Some(kind) => query.stats.push(kind),
                    None => tracing::debug!(stat = value, "ignoring unsupported stat"),
                },
                "fromDateTime" => query.from = parse_bound(name, value),
                "toDateTime" => query.to = parse_bound(name, value),
                _ => {}
            }
        }
        query
    }

    fn wants(&self, kind: StatKind) -> bool {
        self.stats.contains(&kind)
    }

    fn in_range(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at < to)
    }
}

fn parse_bound(name: &str, value: &str) -> Option<DateTime<Utc>> {
    match Timestamp::parse(value) {
        Ok(ts) => Some(ts.instant()),
        Err(_) => {
            tracing::debug!(bound = name, value, "ignoring unparsable range bound");
            None
        }
    }
}

/// running aggregate for one metric
#[derive(Debug, Default)]
struct Accumulator {
    min: Option<f64>,
    max: Option<f64>,
    values: Vec<f64>,
}

impl Accumulator {
    fn observe(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.values.push(value);
    }

    fn get(&self, kind: StatKind) -> Option<f64> {
        match kind {
            StatKind::Min => self.min,
            StatKind::Max => self.max,
            StatKind::Average if self.values.is_empty() => None,
            StatKind::Average => {
                Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
            }
        }
    }
}

pub fn compute_stats(store: &MeasurementStore, query: &StatsQuery) -> Vec<StatResult> {
    let bounded = query.from.is_some() || query.to.is_some();

    let mut accumulators: Vec<Accumulator> =
        query.metrics.iter().map(|_| Accumulator::default()).collect();

    for record in store.keys().filter_map(|key| store.get(key)) {
        if bounded {
            // keys in the store were normalized on write
            let Ok(ts) = Timestamp::parse(&record.timestamp) else {
                continue;
            };
            if !query.in_range(ts.instant()) {
                continue;
            }
        }

        for (metric, acc) in query.metrics.iter().zip(accumulators.iter_mut()) {
            if let Some(value) = record.get(metric) {
                acc.observe(value);
            }
        }
    }

    query
        .metrics
        .iter()
        .zip(accumulators.iter())
        .flat_map(move |(metric, acc)| {
            StatKind::ALL
                .into_iter()
                .filter(move |kind| query.wants(*kind))
                .filter_map(move |kind| {
                    acc.get(kind).map(|value| StatResult {
                        metric: metric.clone(),
                        stat: kind,
                        value,
                    })
                })
        })
        .collect()
}
