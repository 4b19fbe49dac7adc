//! Load, fuse, estimate, write.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use pw_fusion::{DumpStats, FusionEngine, GenerationEstimator, tag_dump};
use pw_ingest::{CsvSourceLoader, load_sources, read_concordance, read_country_table};
use pw_model::{CountryPolicyTable, RunLog};
use pw_report::{
    BuildSummary, append_build_log, timestamp_now, write_canonical_csv, write_dump_csv,
    write_summary_json,
};
use tracing::{info, info_span};

use crate::config::BuildConfig;

/// Files written by a build. Empty on a dry run.
#[derive(Debug, Clone, Default)]
pub struct BuildOutputs {
    pub canonical: Option<PathBuf>,
    pub dump: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub build_log: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BuildResult {
    pub summary: BuildSummary,
    pub log: RunLog,
    pub dump_stats: Option<DumpStats>,
    pub outputs: BuildOutputs,
    pub dry_run: bool,
}

pub fn load_countries(config: &BuildConfig) -> Result<CountryPolicyTable> {
    let path = config.country_path();
    read_country_table(&path).with_context(|| format!("load country table {}", path.display()))
}

/// Run a full build. Recoverable issues end up in [`BuildResult::log`]; any
/// returned error is fatal.
pub fn run_pipeline(config: &BuildConfig, dry_run: bool) -> Result<BuildResult> {
    let started_at = Local::now().naive_local();
    let generated_at = timestamp_now();
    let build_span = info_span!(
        "build",
        min_capacity_mw = config.build.min_capacity_mw,
        dump = config.build.dump,
        dry_run
    );
    let _build_guard = build_span.enter();
    let start = Instant::now();

    let countries = load_countries(config)?;
    let concordance_path = config.concordance_path();
    let concordance = read_concordance(&concordance_path)
        .with_context(|| format!("load concordance {}", concordance_path.display()))?;
    info!(
        countries = countries.len(),
        concordance_entries = concordance.len(),
        "reference data loaded"
    );

    let loader = CsvSourceLoader::new(config.source_layout());
    let sources = load_sources(&loader, &countries).with_context(|| {
        format!("load plant sources from {}", config.sources.data_dir.display())
    })?;

    let mut outcome =
        FusionEngine::new(config.fusion_config(), &countries, &concordance).run(&sources);

    let estimated = info_span!("estimate").in_scope(|| {
        let estimated = config.estimator().estimate(&mut outcome.canonical);
        info!(estimated, "generation estimated");
        estimated
    });

    let dump_stats = config.build.dump.then(|| {
        info_span!("dump").in_scope(|| {
            tag_dump(
                &mut outcome.dump,
                &outcome.canonical,
                &sources.carma,
                &outcome.claimed,
            )
        })
    });

    let mut summary = BuildSummary::from_outcome(
        generated_at,
        config.build.min_capacity_mw,
        &outcome,
        estimated,
    );
    if dump_stats.is_some() {
        summary = summary.with_dumped_plants(outcome.dump.len());
    }

    let mut outputs = BuildOutputs::default();
    if !dry_run {
        let output_span = info_span!("output", dir = %config.output.dir.display());
        let _output_guard = output_span.enter();

        let canonical_path = config.canonical_path();
        write_canonical_csv(&canonical_path, &outcome.canonical)?;
        outputs.canonical = Some(canonical_path);

        if dump_stats.is_some() {
            let dump_path = config.dump_path();
            write_dump_csv(&dump_path, &outcome.dump)?;
            outputs.dump = Some(dump_path);
        }

        let summary_path = config.summary_path();
        write_summary_json(&summary_path, &summary)?;
        outputs.summary = Some(summary_path);

        let build_log_path = config.build_log_path();
        append_build_log(&build_log_path, started_at, &outcome.log)?;
        outputs.build_log = Some(build_log_path);
    }

    info!(
        canonical = outcome.canonical.len(),
        estimated,
        errors = outcome.log.error_count(),
        warnings = outcome.log.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "build complete"
    );

    Ok(BuildResult {
        summary,
        log: outcome.log,
        dump_stats,
        outputs,
        dry_run,
    })
}
