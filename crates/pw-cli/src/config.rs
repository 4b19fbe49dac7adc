//! Build configuration.
//!
//! Settings come from a TOML file (every field optional), then the
//! `POWERWATCH_DATA_DIR` environment variable, then command-line overrides.
//!
//! ```toml
//! [build]
//! min_capacity_mw = 1.0
//! dump = false
//!
//! [sources]
//! data_dir = "data"
//! national_pattern = "{iso}-Database.csv"
//!
//! [output]
//! dir = "output"
//!
//! [estimation.capacity_factors]
//! coal = 0.59
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pw_fusion::{CapacityFactorEstimator, DEFAULT_CAPACITY_FACTORS, FusionConfig};
use pw_ingest::{ISO_PLACEHOLDER, SourceLayout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `[sources] data_dir`.
pub const DATA_DIR_ENV_VAR: &str = "POWERWATCH_DATA_DIR";

/// Picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "powerwatch.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub build: BuildSection,
    pub sources: SourcesSection,
    pub output: OutputSection,
    pub estimation: EstimationSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    pub min_capacity_mw: f64,
    /// Also write the audit dump.
    pub dump: bool,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            min_capacity_mw: pw_fusion::DEFAULT_MIN_CAPACITY_MW,
            dump: false,
        }
    }
}

/// Input locations. File names are relative to `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesSection {
    pub data_dir: PathBuf,
    pub country_file: String,
    pub concordance_file: String,
    pub national_pattern: String,
    pub wri: String,
    pub geo: String,
    pub carma: String,
    pub sourcewatch: String,
}

impl Default for SourcesSection {
    fn default() -> Self {
        let layout = SourceLayout::default();
        Self {
            data_dir: layout.data_dir,
            country_file: "countries.csv".to_string(),
            concordance_file: "plant_concordance.csv".to_string(),
            national_pattern: layout.national_pattern,
            wri: layout.wri,
            geo: layout.geo,
            carma: layout.carma,
            sourcewatch: layout.sourcewatch,
        }
    }
}

/// Output locations. File names are relative to `dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: PathBuf,
    pub canonical: String,
    pub dump: String,
    pub summary: String,
    pub build_log: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            canonical: "powerwatch_data.csv".to_string(),
            dump: "powerwatch_data_dump.csv".to_string(),
            summary: "powerwatch_summary.json".to_string(),
            build_log: "powerwatch_build_log.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimationSection {
    /// Fuel name to capacity factor. A table in the file replaces the
    /// defaults entirely.
    pub capacity_factors: BTreeMap<String, f64>,
}

impl Default for EstimationSection {
    fn default() -> Self {
        Self {
            capacity_factors: DEFAULT_CAPACITY_FACTORS
                .iter()
                .map(|(fuel, factor)| ((*fuel).to_string(), *factor))
                .collect(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub min_capacity_mw: Option<f64>,
    /// Only ever switches the dump on.
    pub dump: bool,
}

impl BuildConfig {
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load `path` if given, else `powerwatch.toml` from the working directory
    /// when it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV_VAR).filter(|dir| !dir.trim().is_empty()) {
            self.sources.data_dir = PathBuf::from(dir);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(dir) = &overrides.data_dir {
            self.sources.data_dir.clone_from(dir);
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.dir.clone_from(dir);
        }
        if let Some(min_capacity) = overrides.min_capacity_mw {
            self.build.min_capacity_mw = min_capacity;
        }
        if overrides.dump {
            self.build.dump = true;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_capacity = self.build.min_capacity_mw;
        if !min_capacity.is_finite() || min_capacity < 0.0 {
            return Err(invalid(
                "build.min_capacity_mw",
                format!("expected a non-negative number, got {min_capacity}"),
            ));
        }
        if !self.sources.national_pattern.contains(ISO_PLACEHOLDER) {
            return Err(invalid(
                "sources.national_pattern",
                format!("'{}' has no {ISO_PLACEHOLDER} placeholder", self.sources.national_pattern),
            ));
        }
        for (fuel, factor) in &self.estimation.capacity_factors {
            if !(0.0..=1.0).contains(factor) {
                return Err(invalid(
                    "estimation.capacity_factors",
                    format!("factor for '{fuel}' must be between 0 and 1, got {factor}"),
                ));
            }
        }
        Ok(())
    }

    pub fn fusion_config(&self) -> FusionConfig {
        FusionConfig {
            min_capacity_mw: self.build.min_capacity_mw,
        }
    }

    pub fn estimator(&self) -> CapacityFactorEstimator {
        CapacityFactorEstimator::new(
            self.estimation
                .capacity_factors
                .iter()
                .map(|(fuel, factor)| (fuel.as_str(), *factor)),
        )
    }

    pub fn source_layout(&self) -> SourceLayout {
        SourceLayout {
            data_dir: self.sources.data_dir.clone(),
            national_pattern: self.sources.national_pattern.clone(),
            wri: self.sources.wri.clone(),
            geo: self.sources.geo.clone(),
            carma: self.sources.carma.clone(),
            sourcewatch: self.sources.sourcewatch.clone(),
        }
    }

    pub fn country_path(&self) -> PathBuf {
        self.sources.data_dir.join(&self.sources.country_file)
    }

    pub fn concordance_path(&self) -> PathBuf {
        self.sources.data_dir.join(&self.sources.concordance_file)
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.canonical)
    }

    pub fn dump_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.dump)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.summary)
    }

    pub fn build_log_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.build_log)
    }
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_means_defaults() {
        let config = BuildConfig::from_toml_str("", Path::new("powerwatch.toml")).unwrap();
        assert_eq!(config, BuildConfig::default());
        assert_eq!(config.build.min_capacity_mw, 1.0);
        assert!(!config.build.dump);
        assert_eq!(config.estimation.capacity_factors.get("coal"), Some(&0.59));
        assert_eq!(config.canonical_path(), PathBuf::from("output/powerwatch_data.csv"));
    }

    #[test]
    fn parses_sections() {
        let text = r#"
[build]
min_capacity_mw = 5.0
dump = true

[sources]
data_dir = "/srv/powerwatch"
wri = "wri.csv"

[estimation.capacity_factors]
Coal = 0.5
"#;
        let config = BuildConfig::from_toml_str(text, Path::new("test.toml")).unwrap();
        assert_eq!(config.build.min_capacity_mw, 5.0);
        assert!(config.build.dump);
        assert_eq!(
            config.source_layout().path_for(&pw_model::SourceId::Wri),
            PathBuf::from("/srv/powerwatch/wri.csv")
        );
        assert_eq!(config.country_path(), PathBuf::from("/srv/powerwatch/countries.csv"));
        assert_eq!(config.estimation.capacity_factors.len(), 1);
        assert_eq!(config.estimator().factor("coal"), Some(0.5));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let err = BuildConfig::from_toml_str("[build]\nmin_mw = 1\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err =
            BuildConfig::from_toml_str("[build]\nmin_capacity_mw = -1.0\n", Path::new("x.toml"))
                .unwrap_err();
        assert!(err.to_string().contains("build.min_capacity_mw"));

        let err = BuildConfig::from_toml_str(
            "[sources]\nnational_pattern = \"national.csv\"\n",
            Path::new("x.toml"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { ref field, .. } if field == "sources.national_pattern"
        ));

        let err = BuildConfig::from_toml_str(
            "[estimation.capacity_factors]\ncoal = 1.5\n",
            Path::new("x.toml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("coal"));
    }

    #[test]
    fn env_then_overrides() {
        let mut config = BuildConfig::default();
        config.apply_env(|key| (key == DATA_DIR_ENV_VAR).then(|| "/env/data".to_string()));
        assert_eq!(config.sources.data_dir, PathBuf::from("/env/data"));

        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.sources.data_dir, PathBuf::from("/env/data"));

        let overrides = ConfigOverrides {
            data_dir: Some(PathBuf::from("/cli/data")),
            output_dir: Some(PathBuf::from("/cli/out")),
            min_capacity_mw: Some(2.5),
            dump: true,
        };
        config.apply_overrides(&overrides).unwrap();
        assert_eq!(config.sources.data_dir, PathBuf::from("/cli/data"));
        assert_eq!(config.dump_path(), PathBuf::from("/cli/out/powerwatch_data_dump.csv"));
        assert_eq!(config.build.min_capacity_mw, 2.5);
        assert!(config.build.dump);

        let bad = ConfigOverrides {
            min_capacity_mw: Some(f64::NAN),
            ..ConfigOverrides::default()
        };
        assert!(config.apply_overrides(&bad).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = BuildConfig::load(Path::new("/nonexistent/powerwatch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
