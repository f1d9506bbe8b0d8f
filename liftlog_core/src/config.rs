//! Configuration file support for Liftlog.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/liftlog/config.toml`.

use crate::aggregate::TotalMode;
use crate::catalog::CategoryCatalog;
use crate::{Error, Period, Result, Sex, Units};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub lifter: LifterConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Extra exercise -> category entries layered over the built-in catalog
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Lifter parameters for the strength score
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifterConfig {
    /// "F" selects the female coefficients; anything else the default set
    #[serde(default = "default_sex")]
    pub sex: String,

    /// "lb" for pounds; anything else is treated as kilograms
    #[serde(default = "default_units")]
    pub units: String,

    /// Bodyweight used when no bodyweight series is available
    #[serde(default = "default_bodyweight")]
    pub bodyweight: f64,
}

impl Default for LifterConfig {
    fn default() -> Self {
        Self {
            sex: default_sex(),
            units: default_units(),
            bodyweight: default_bodyweight(),
        }
    }
}

impl LifterConfig {
    pub fn sex(&self) -> Sex {
        Sex::from(self.sex.as_str())
    }

    pub fn units(&self) -> Units {
        Units::from_label(&self.units)
    }
}

/// Which lifts make up the total and how they are bucketed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_period")]
    pub period: Period,

    #[serde(default = "default_squat")]
    pub squat: String,

    #[serde(default = "default_bench")]
    pub bench: String,

    #[serde(default = "default_deadlift")]
    pub deadlift: String,

    #[serde(default)]
    pub total_mode: TotalMode,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            squat: default_squat(),
            bench: default_bench(),
            deadlift: default_deadlift(),
            total_mode: TotalMode::default(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("liftlog")
}

fn default_sex() -> String {
    "M".into()
}

fn default_units() -> String {
    "lb".into()
}

fn default_bodyweight() -> f64 {
    220.0
}

fn default_period() -> Period {
    Period::Month
}

fn default_squat() -> String {
    "Barbell Squat".into()
}

fn default_bench() -> String {
    "Flat Barbell Bench Press".into()
}

fn default_deadlift() -> String {
    "Deadlift".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("liftlog").join("config.toml")
    }

    /// Reject values that would make every strength score fail
    pub fn validate(&self) -> Result<()> {
        let bw = self.lifter.bodyweight;
        if !bw.is_finite() || bw <= 0.0 {
            return Err(Error::Config(format!(
                "lifter.bodyweight must be positive, got {}",
                bw
            )));
        }
        let errors = self.catalog().validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        Ok(())
    }

    /// Built-in catalog extended with the `[categories]` table
    pub fn catalog(&self) -> CategoryCatalog {
        crate::catalog::get_default_catalog().extended(&self.categories)
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// target.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(contents.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
