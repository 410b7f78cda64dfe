use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub winnings_file: String,
    pub holdings_file: String,
    pub lookback_months: u32,
    // URL template with {month} and {year} placeholders
    pub report_url_template: String,
    pub currency_marker: char,
    pub id_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            winnings_file: "winnings.csv".to_string(),
            holdings_file: "holdings.csv".to_string(),
            lookback_months: 6,
            report_url_template:
                "https://www.nsandi.com/files/asset/zip/premium-bonds-winning-bond-numbers-{month}-{year}.zip"
                    .to_string(),
            currency_marker: '£',
            id_prefix: "P".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// One compact holding: every bond number between `start` and `end` inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondRange {
    pub start: String,
    pub end: String,
}

/// One row of the winnings ledger. `unique_id` is assigned once at creation
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WinningRecord {
    pub bond_number: String,
    pub draw_date: NaiveDate,
    pub winnings: u32,
    pub unique_id: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum AllocatorError {
    #[error("unique identifier {0} has a numeric suffix out of range")]
    SuffixOutOfRange(String),
}

/// Allocate the next unique identifier for a new ledger row.
///
/// Identifiers look like `P1`, `P2`, ... The result is the configured prefix
/// followed by one more than the highest suffix already in use, or
/// `<prefix>1` when no existing identifier matches. Callers adding several
/// rows must fold each new identifier back into `existing` before asking for
/// the next one.
pub fn next_unique_id(existing: &[String], prefix: &str) -> Result<String, AllocatorError> {
    let pattern = Regex::new(&format!(r"^{}(\d+)$", regex::escape(prefix))).unwrap();

    let mut max_seq: Option<u64> = None;
    for id in existing {
        if let Some(caps) = pattern.captures(id) {
            let seq: u64 = caps[1]
                .parse()
                .map_err(|_| AllocatorError::SuffixOutOfRange(id.clone()))?;
            max_seq = Some(max_seq.map_or(seq, |m| m.max(seq)));
        }
    }

    Ok(match max_seq {
        Some(max) => format!("{}{}", prefix, max + 1),
        None => format!("{}1", prefix),
    })
}
