use std::collections::BTreeMap;

/// Known cross-references from one WRI plant into the GEO and CARMA
/// inventories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcordanceEntry {
    pub geo_id: Option<String>,
    pub carma_id: Option<String>,
}

impl ConcordanceEntry {
    /// Blank identifiers are stored as `None`.
    pub fn new(geo_id: Option<&str>, carma_id: Option<&str>) -> Self {
        Self {
            geo_id: non_blank(geo_id),
            carma_id: non_blank(carma_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.geo_id.is_none() && self.carma_id.is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Concordance keyed by WRI plant id. Read-only once fusion starts.
#[derive(Debug, Clone, Default)]
pub struct ConcordanceIndex {
    entries: BTreeMap<String, ConcordanceEntry>,
}

impl ConcordanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, wri_id: impl Into<String>, entry: ConcordanceEntry) {
        self.entries.insert(wri_id.into(), entry);
    }

    pub fn lookup(&self, wri_id: &str) -> Option<&ConcordanceEntry> {
        self.entries.get(wri_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ConcordanceEntry)> for ConcordanceIndex {
    fn from_iter<I: IntoIterator<Item = (String, ConcordanceEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
