//! JSON build summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use pw_fusion::{FusionOutcome, Tally, TallyRow};
use pw_model::{IssueKind, RunLog};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueCounts {
    pub errors: usize,
    pub warnings: usize,
    pub by_kind: BTreeMap<IssueKind, usize>,
}

impl IssueCounts {
    pub fn from_log(log: &RunLog) -> Self {
        let mut by_kind = BTreeMap::new();
        for issue in log.iter() {
            *by_kind.entry(issue.kind).or_insert(0) += 1;
        }
        Self {
            errors: log.error_count(),
            warnings: log.warning_count(),
            by_kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSummary {
    /// RFC 3339, UTC.
    pub generated_at: String,
    pub min_capacity_mw: f64,
    pub canonical_plants: usize,
    pub estimated_generation: usize,
    /// Present when the audit dump was written.
    pub dumped_plants: Option<usize>,
    pub tallies: Vec<TallyRow>,
    /// Sum of the tallies. A SourceWatch overwrite is counted again, so this
    /// can exceed `canonical_plants`.
    pub total: Tally,
    pub issues: IssueCounts,
}

impl BuildSummary {
    pub fn from_outcome(
        generated_at: impl Into<String>,
        min_capacity_mw: f64,
        outcome: &FusionOutcome,
        estimated_generation: usize,
    ) -> Self {
        Self {
            generated_at: generated_at.into(),
            min_capacity_mw,
            canonical_plants: outcome.canonical.len(),
            estimated_generation,
            dumped_plants: None,
            tallies: outcome.tallies.rows(),
            total: outcome.tallies.total(),
            issues: IssueCounts::from_log(&outcome.log),
        }
    }

    #[must_use]
    pub fn with_dumped_plants(mut self, dumped: usize) -> Self {
        self.dumped_plants = Some(dumped);
        self
    }
}

pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn write_summary_json(path: &Path, summary: &BuildSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(summary).context("serialize build summary")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "build summary written");
    Ok(())
}
