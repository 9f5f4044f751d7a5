use anyhow::{Context, Result};
use haulplan_core::SchedulingPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_haulplan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduling: SchedulingPolicy,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter directive, e.g. "info" or "haulplan_core=debug". `RUST_LOG` wins.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_haulplan_home()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn load_config() -> Result<Config> {
    read_config(&config_path()?)
}

/// Write the default config unless one exists. Returns its path.
pub fn init_config() -> Result<PathBuf> {
    let p = config_path()?;
    if !p.exists() {
        write_config(&p, &Config::default())?;
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = read_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.scheduling.timezone = "America/Denver".to_string();
        cfg.logging.format = LogFormat::Json;
        write_config(&path, &cfg).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[scheduling]"));
        assert!(text.contains("default_start_time = \"09:00\""));

        assert_eq!(read_config(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scheduling]\nweekly_capacity_hours = 50\n\n[logging]\nlevel = \"debug\"\n").unwrap();

        let cfg = read_config(&path).unwrap();
        assert_eq!(cfg.scheduling.weekly_capacity_hours, 50.0);
        assert_eq!(cfg.scheduling.timezone, "America/Chicago");
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Compact);
    }
}
