use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::{LedgerError, Result},
    utils::paths,
};

const TMP_SUFFIX: &str = "tmp";

/// User-tunable settings for the ledger engines and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Ledger snapshot location. Defaults to `ledger.json` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Share of a budget that must be spent before the alert fires.
    #[serde(default = "Config::default_alert_threshold_percent")]
    pub alert_threshold_percent: Decimal,
    #[serde(default = "Config::default_notification_signature")]
    pub notification_signature: String,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    /// Tracing directive used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            alert_threshold_percent: Self::default_alert_threshold_percent(),
            notification_signature: Self::default_notification_signature(),
            currency_symbol: Self::default_currency_symbol(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn default_alert_threshold_percent() -> Decimal {
        Decimal::new(90, 0)
    }

    pub fn default_notification_signature() -> String {
        "Budget Ledger Team".into()
    }

    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    /// Threshold as a fraction of the budgeted amount (90% → 0.9).
    pub fn alert_threshold(&self) -> Decimal {
        self.alert_threshold_percent / Decimal::ONE_HUNDRED
    }

    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| paths::ledger_file_in(base))
    }

    pub fn validate(&self) -> Result<()> {
        if self.alert_threshold_percent <= Decimal::ZERO
            || self.alert_threshold_percent > Decimal::ONE_HUNDRED
        {
            return Err(LedgerError::Config(format!(
                "alert_threshold_percent must be within (0, 100], got {}",
                self.alert_threshold_percent
            )));
        }
        Ok(())
    }
}

/// Loads and persists [`Config`] as JSON inside the application directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        let path = paths::config_file_in(&base);
        Ok(Self { base, path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| LedgerError::Config(err.to_string()))?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
