use crate::models::{BondRange, WinningRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize)]
struct WinningRow {
    #[serde(rename = "Bond Number")]
    bond_number: String,
    #[serde(rename = "Draw Date")]
    draw_date: String,
    #[serde(rename = "Winnings")]
    winnings: u32,
    #[serde(rename = "Unique Identifier")]
    unique_id: String,
}

#[derive(Debug, Deserialize)]
struct HoldingRow {
    #[serde(rename = "Starting Bond Number")]
    start: String,
    #[serde(rename = "Ending Bond Number")]
    end: String,
}

/// Read the winnings ledger. Draw dates are stored day-first (`dd/mm/YYYY`);
/// a row that does not parse is fatal, since a corrupt ledger must not be
/// silently extended.
pub fn read_winnings(path: &str) -> Result<Vec<WinningRecord>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Failed to read file: {}", path))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: WinningRow = row.with_context(|| format!("Bad winnings row in {}", path))?;
        let draw_date = NaiveDate::parse_from_str(&row.draw_date, DATE_FORMAT)
            .with_context(|| format!("Bad draw date {:?} in {}", row.draw_date, path))?;
        records.push(WinningRecord {
            bond_number: row.bond_number,
            draw_date,
            winnings: row.winnings,
            unique_id: row.unique_id,
        });
    }
    Ok(records)
}

/// Read the holdings table of start/end bond-number ranges.
pub fn read_holdings(path: &str) -> Result<Vec<BondRange>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("Failed to read file: {}", path))?;

    let mut ranges = Vec::new();
    for row in reader.deserialize() {
        let row: HoldingRow = row.with_context(|| format!("Bad holdings row in {}", path))?;
        ranges.push(BondRange {
            start: row.start,
            end: row.end,
        });
    }
    Ok(ranges)
}

/// Rewrite the winnings ledger, including any rows appended this run.
pub fn write_winnings(path: &str, records: &[WinningRecord]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to write file: {}", path))?;

    writer.write_record(["Bond Number", "Draw Date", "Winnings", "Unique Identifier"])?;
    for record in records {
        let draw_date = record.draw_date.format(DATE_FORMAT).to_string();
        let winnings = record.winnings.to_string();
        writer.write_record([
            &record.bond_number,
            &draw_date,
            &winnings,
            &record.unique_id,
        ])?;
    }
    writer.flush()?;
    Ok(())
}
