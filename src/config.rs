use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use monthbook::{Currency, LedgerError, PaymentMethod};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Currency the wallet and savings balances are kept in.
    pub primary_currency: String,

    /// Method used by `expense add` when `--method` is not given.
    #[serde(default = "default_method")]
    pub default_method: PaymentMethod,

    pub created_at: DateTime<Utc>,
}

fn default_method() -> PaymentMethod {
    PaymentMethod::Wallet
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            primary_currency: "KWD".to_string(),
            default_method: default_method(),
            created_at: now_utc(),
        }
    }
}

impl AppConfig {
    pub fn primary(&self) -> Result<Currency, LedgerError> {
        Currency::new(&self.primary_currency)
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("monthbook.sqlite3")
    }
}

pub fn app_paths(override_home: Option<PathBuf>) -> Result<AppPaths> {
    if let Some(home) = override_home {
        return Ok(AppPaths {
            config_dir: home.join("config"),
            data_dir: home.join("data"),
        });
    }

    let proj = ProjectDirs::from("com", "monthbook", "monthbook")
        .context("Failed to resolve platform directories")?;

    Ok(AppPaths {
        config_dir: proj.config_dir().to_path_buf(),
        data_dir: proj.data_dir().to_path_buf(),
    })
}

pub fn load_or_init_config(paths: &AppPaths) -> Result<(AppConfig, PathBuf)> {
    fs::create_dir_all(&paths.config_dir)
        .with_context(|| format!("Failed to create config dir {}", paths.config_dir.display()))?;

    let cfg_path = paths.config_dir.join("config.json");
    if !cfg_path.exists() {
        let cfg = AppConfig::default();
        write_config(&cfg_path, &cfg)?;
        return Ok((cfg, cfg_path));
    }

    let raw = fs::read_to_string(&cfg_path)
        .with_context(|| format!("Failed to read {}", cfg_path.display()))?;
    let cfg: AppConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", cfg_path.display()))?;

    Ok((cfg, cfg_path))
}

pub fn write_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
