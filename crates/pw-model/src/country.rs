use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Where a country's canonical plants come from.
///
/// Replaces the independent `has_api` / `use_geo` flags of the input table
/// so a country can only ever be handled by one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryRoute {
    /// Dedicated national data feed; handled by the national tier.
    NationalApi,
    /// Plants and coordinates come from the GEO inventory.
    GeoRouted,
    /// WRI with concordance fallbacks.
    Default,
}

impl CountryRoute {
    /// Resolve the input flags with precedence `has_api > use_geo > default`.
    pub fn from_flags(has_api: bool, use_geo: bool) -> Self {
        if has_api {
            Self::NationalApi
        } else if use_geo {
            Self::GeoRouted
        } else {
            Self::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalApi => "national API",
            Self::GeoRouted => "GEO",
            Self::Default => "WRI",
        }
    }
}

impl fmt::Display for CountryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a boolean column value from the country table.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" => Ok(true),
        _ => Err(ModelError::InvalidFlag {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPolicy {
    pub name: String,
    /// Selects the national source file for `NationalApi` countries.
    pub iso_code: String,
    pub route: CountryRoute,
}

impl CountryPolicy {
    pub fn new(name: impl Into<String>, iso_code: impl Into<String>, route: CountryRoute) -> Self {
        Self {
            name: name.into(),
            iso_code: iso_code.into(),
            route,
        }
    }
}

/// Country name to routing policy.
#[derive(Debug, Clone, Default)]
pub struct CountryPolicyTable {
    countries: BTreeMap<String, CountryPolicy>,
}

impl CountryPolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a policy, rejecting a second entry for the same country name.
    pub fn try_insert(&mut self, policy: CountryPolicy) -> Result<()> {
        if self.countries.contains_key(&policy.name) {
            return Err(ModelError::DuplicateCountry { name: policy.name });
        }
        self.countries.insert(policy.name.clone(), policy);
        Ok(())
    }

    /// `None` means the country is unrecognized.
    pub fn lookup(&self, country: &str) -> Option<&CountryPolicy> {
        self.countries.get(country)
    }

    /// Countries with a national data feed, in name order.
    pub fn national_api(&self) -> impl Iterator<Item = &CountryPolicy> {
        self.countries
            .values()
            .filter(|policy| policy.route == CountryRoute::NationalApi)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryPolicy> {
        self.countries.values()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl FromIterator<CountryPolicy> for CountryPolicyTable {
    /// Later duplicates replace earlier ones; use `try_insert` to reject them.
    fn from_iter<I: IntoIterator<Item = CountryPolicy>>(iter: I) -> Self {
        let countries = iter
            .into_iter()
            .map(|policy| (policy.name.clone(), policy))
            .collect();
        Self { countries }
    }
}
