use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("bond numbers listed before any prize tier: {line:?}")]
    PrizeBeforeTier { line: String },
    #[error("unreadable prize amount in tier line: {line:?}")]
    BadTierAmount { line: String },
}

/// Parse a monthly prize report into bond number -> prize amount.
///
/// The report mixes tier header lines (the currency marker followed by the
/// amount, e.g. "Prizes of £1,000") with listing lines of whitespace
/// separated bond numbers. A header sets the amount for every listing line
/// until the next header; a bond number repeated under a later tier keeps
/// the later amount. Tokens that do not start with a known range prefix are
/// page furniture and are skipped.
pub fn parse_report(
    content: &str,
    valid_prefixes: &HashSet<String>,
    currency_marker: char,
) -> Result<HashMap<String, u32>, ReportError> {
    let mut prizes = HashMap::new();
    let mut current_tier: Option<u32> = None;

    for line in content.lines() {
        if let Some(pos) = line.find(currency_marker) {
            let after_marker = &line[pos + currency_marker.len_utf8()..];
            let amount = after_marker
                .split_whitespace()
                .next()
                .map(|token| token.replace(',', ""))
                .and_then(|token| token.parse::<u32>().ok())
                .ok_or_else(|| ReportError::BadTierAmount {
                    line: line.to_string(),
                })?;
            current_tier = Some(amount);
            continue;
        }

        for token in line.split_whitespace() {
            if !valid_prefixes.iter().any(|p| token.starts_with(p.as_str())) {
                continue;
            }
            match current_tier {
                Some(amount) => {
                    prizes.insert(token.to_string(), amount);
                }
                None => {
                    return Err(ReportError::PrizeBeforeTier {
                        line: line.to_string(),
                    })
                }
            }
        }
    }

    Ok(prizes)
}
