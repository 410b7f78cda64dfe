use crate::models::{next_unique_id, WinningRecord};
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Append a winnings row for every held bond that appears in the month's
/// prize map, dated to the first day of the draw month.
///
/// Held bonds are visited in ascending order and each new identifier is
/// visible to the next allocation, so a batch never repeats an id and the
/// output is deterministic. Returns the number of rows added.
pub fn reconcile_month(
    held: &BTreeSet<String>,
    prizes: &HashMap<String, u32>,
    draw_date: NaiveDate,
    id_prefix: &str,
    ledger: &mut Vec<WinningRecord>,
) -> Result<usize> {
    let mut added = 0;

    for bond in held {
        if let Some(&amount) = prizes.get(bond) {
            let existing: Vec<String> = ledger.iter().map(|r| r.unique_id.clone()).collect();
            let unique_id = next_unique_id(&existing, id_prefix)?;

            ledger.push(WinningRecord {
                bond_number: bond.clone(),
                draw_date,
                winnings: amount,
                unique_id,
            });
            added += 1;
        }
    }

    Ok(added)
}
