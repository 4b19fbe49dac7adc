//! Per-source admission counts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// What an admitted plant is counted under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TallyKey {
    /// A national feed, by country name.
    National(String),
    Wri,
    WriViaGeo,
    WriViaCarma,
    Geo,
    SourceWatch,
}

impl fmt::Display for TallyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::National(country) => f.write_str(country),
            Self::Wri => f.write_str("WRI"),
            Self::WriViaGeo => f.write_str("WRI with GEO lat/long data"),
            Self::WriViaCarma => f.write_str("WRI with CARMA lat/long data"),
            Self::Geo => f.write_str("GEO"),
            Self::SourceWatch => f.write_str("SourceWatch"),
        }
    }
}

impl Serialize for TallyKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    pub count: usize,
    pub capacity_mw: f64,
}

/// One line of the tally report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyRow {
    pub source: TallyKey,
    pub count: usize,
    pub capacity_mw: f64,
}

/// Counts and cumulative capacity per [`TallyKey`].
///
/// Every key starts at zero so sources that contributed nothing still show up.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyReport {
    tallies: BTreeMap<TallyKey, Tally>,
}

impl TallyReport {
    /// Seed the report with the national-feed countries and the fixed keys.
    pub fn new<I, S>(national_countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tallies: BTreeMap<TallyKey, Tally> = national_countries
            .into_iter()
            .map(|country| (TallyKey::National(country.into()), Tally::default()))
            .collect();
        for key in [
            TallyKey::Wri,
            TallyKey::WriViaGeo,
            TallyKey::WriViaCarma,
            TallyKey::Geo,
            TallyKey::SourceWatch,
        ] {
            tallies.insert(key, Tally::default());
        }
        Self { tallies }
    }

    /// Count one plant. A missing capacity bumps the count only.
    pub fn record(&mut self, key: TallyKey, capacity_mw: Option<f64>) {
        let tally = self.tallies.entry(key).or_default();
        tally.count += 1;
        if let Some(capacity) = capacity_mw {
            tally.capacity_mw += capacity;
        }
    }

    pub fn get(&self, key: &TallyKey) -> Tally {
        self.tallies.get(key).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Tally {
        self.tallies.values().fold(Tally::default(), |acc, tally| Tally {
            count: acc.count + tally.count,
            capacity_mw: acc.capacity_mw + tally.capacity_mw,
        })
    }

    pub fn rows(&self) -> Vec<TallyRow> {
        self.tallies
            .iter()
            .map(|(key, tally)| TallyRow {
                source: key.clone(),
                count: tally.count,
                capacity_mw: tally.capacity_mw,
            })
            .collect()
    }
}

impl Serialize for TallyReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}
