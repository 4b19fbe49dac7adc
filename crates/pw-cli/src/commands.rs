use std::path::Path;

use anyhow::{Context, Result};
use pw_cli::config::{BuildConfig, ConfigOverrides};
use pw_cli::pipeline::{BuildResult, load_countries, run_pipeline};
use pw_model::CountryPolicyTable;
use tracing::debug;

use crate::cli::{BuildArgs, CountriesArgs};

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let overrides = ConfigOverrides {
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
        min_capacity_mw: args.min_capacity,
        dump: args.dump,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;
    run_pipeline(&config, args.dry_run)
}

pub fn run_countries(args: &CountriesArgs) -> Result<CountryPolicyTable> {
    let overrides = ConfigOverrides {
        data_dir: args.data_dir.clone(),
        ..ConfigOverrides::default()
    };
    let config = resolve_config(args.config.as_deref(), &overrides)?;
    load_countries(&config)
}

/// File, then environment, then command line.
fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<BuildConfig> {
    let mut config = BuildConfig::load_or_default(path).context("load build config")?;
    config.apply_env(|key| std::env::var(key).ok());
    config
        .apply_overrides(overrides)
        .context("apply command-line overrides")?;
    debug!(
        data_dir = %config.sources.data_dir.display(),
        output_dir = %config.output.dir.display(),
        min_capacity_mw = config.build.min_capacity_mw,
        dump = config.build.dump,
        "configuration resolved"
    );
    Ok(config)
}
