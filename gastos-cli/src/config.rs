use anyhow::{Context, Result};
use gastos_finance::billing::DEFAULT_BILLING_DAY;
use gastos_finance::category_rules::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_SUGGESTION_LIMIT, DEFAULT_SUGGESTION_THRESHOLD,
};
use gastos_finance::{BillingCycle, Categorizer, MerchantRule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{ensure_parent_dir, gastos_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub billing: BillingSection,
    pub categorization: CategorizationSection,
    pub rules: Vec<MerchantRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSection {
    pub credit_card_billing_day: u32,
    /// IANA zone the notification timestamps are written in
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizationSection {
    pub fuzzy_threshold: f64,
    pub suggestion_threshold: f64,
    pub suggestion_limit: usize,
}

impl Default for BillingSection {
    fn default() -> Self {
        Self {
            credit_card_billing_day: DEFAULT_BILLING_DAY,
            timezone: "America/Santiago".to_string(),
        }
    }
}

impl Default for CategorizationSection {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl Config {
    pub fn billing_cycle(&self) -> Result<BillingCycle> {
        BillingCycle::new(self.billing.credit_card_billing_day).context("[billing] section")
    }

    pub fn categorizer(&self) -> Categorizer {
        let c = &self.categorization;
        Categorizer::new(self.rules.clone())
            .with_fuzzy_threshold(c.fuzzy_threshold)
            .with_suggestions(c.suggestion_threshold, c.suggestion_limit)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(gastos_home()?.join("config.toml"))
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    ensure_parent_dir(path)?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write the default config unless one exists. Returns whether it wrote.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(path, &Config::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.billing.credit_card_billing_day, 25);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(init_config(&path).unwrap());
        fs::write(&path, "[billing]\ncredit_card_billing_day = 10\n").unwrap();
        assert!(!init_config(&path).unwrap());
        assert_eq!(load_config(&path).unwrap().billing.credit_card_billing_day, 10);
    }

    #[test]
    fn test_partial_file_with_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[categorization]
fuzzy_threshold = 70.0

[[rules]]
pattern = "^jumbo"
category = "Supermercado"
is_regex = true
priority = 3

[[rules]]
pattern = "El Baco"
category = "Restaurantes"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.billing, BillingSection::default());
        assert_eq!(cfg.categorization.fuzzy_threshold, 70.0);
        assert_eq!(cfg.categorization.suggestion_limit, 5);
        assert_eq!(cfg.rules.len(), 2);
        assert!(cfg.rules[1].is_active);
        assert_eq!(cfg.rules[1].priority, 1);

        let c = cfg.categorizer();
        assert_eq!(c.categorize("Jumbo Bilbao").unwrap().category, "Supermercado");
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.rules.push(MerchantRule::regex("copec", "Transporte").with_priority(2));

        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn test_bad_billing_day() {
        let mut cfg = Config::default();
        cfg.billing.credit_card_billing_day = 40;
        assert!(cfg.billing_cycle().is_err());
    }
}
