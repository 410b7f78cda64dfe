use crate::models::BondRange;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("bond range {start}..{end}: sequence part is not numeric")]
    NonNumericSequence { start: String, end: String },
    #[error("bond range {start}..{end}: start is after end")]
    Inverted { start: String, end: String },
}

/// Longest common leading substring of `a` and `b`. If one string is a
/// prefix of the other, the shorter string is returned whole.
pub fn shared_prefix(a: &str, b: &str) -> String {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

/// Expand an inclusive start/end bond range into every bond number it
/// covers, ascending. Padding width comes from the original string length,
/// so `AB001..AB003` yields `AB001`, `AB002`, `AB003`.
pub fn expand_range(start: &str, end: &str) -> Result<Vec<String>, RangeError> {
    let prefix = shared_prefix(start, end);
    let width = start.len() - prefix.len();

    let non_numeric = || RangeError::NonNumericSequence {
        start: start.to_string(),
        end: end.to_string(),
    };
    let start_seq: u64 = start[prefix.len()..].parse().map_err(|_| non_numeric())?;
    let end_seq: u64 = end[prefix.len()..].parse().map_err(|_| non_numeric())?;

    if start_seq > end_seq {
        return Err(RangeError::Inverted {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    Ok((start_seq..=end_seq)
        .map(|seq| format!("{}{:0width$}", prefix, seq))
        .collect())
}

/// The full set of bond numbers covered by `ranges`. Overlapping ranges
/// collapse rather than double-count.
pub fn expand_holdings(ranges: &[BondRange]) -> Result<BTreeSet<String>, RangeError> {
    let mut held = BTreeSet::new();
    for range in ranges {
        held.extend(expand_range(&range.start, &range.end)?);
    }
    Ok(held)
}

/// Distinct shared prefixes across all held ranges, used to tell bond
/// numbers apart from formatting noise in the prize report.
pub fn valid_prefixes(ranges: &[BondRange]) -> HashSet<String> {
    ranges
        .iter()
        .map(|range| shared_prefix(&range.start, &range.end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> BondRange {
        BondRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[test]
    fn shared_prefix_stops_at_first_difference() {
        assert_eq!(shared_prefix("AB123", "AB456"), "AB");
        assert_eq!(shared_prefix("X", "X"), "X");
        assert_eq!(shared_prefix("", "ABC"), "");
        assert_eq!(shared_prefix("AB", "ABCD"), "AB");
    }

    #[test]
    fn expand_range_pads_to_original_width() {
        assert_eq!(
            expand_range("AB001", "AB003").unwrap(),
            vec!["AB001", "AB002", "AB003"]
        );
    }

    #[test]
    fn expand_range_handles_long_numeric_tails() {
        assert_eq!(
            expand_range("510VC944454", "510VC944456").unwrap(),
            vec!["510VC944454", "510VC944455", "510VC944456"]
        );
    }

    #[test]
    fn expand_range_rejects_non_numeric_sequences() {
        let err = expand_range("AB01", "AB0X").unwrap_err();
        assert!(matches!(err, RangeError::NonNumericSequence { .. }));

        // identical ids leave an empty sequence part, which is not numeric
        let err = expand_range("AB001", "AB001").unwrap_err();
        assert!(matches!(err, RangeError::NonNumericSequence { .. }));
    }

    #[test]
    fn expand_range_rejects_inverted_ranges() {
        let err = expand_range("AB005", "AB003").unwrap_err();
        assert_eq!(
            err,
            RangeError::Inverted {
                start: "AB005".to_string(),
                end: "AB003".to_string(),
            }
        );
    }

    #[test]
    fn disjoint_ranges_sum_their_sizes() {
        let ranges = vec![range("AB001", "AB003"), range("CD010", "CD012")];
        let held = expand_holdings(&ranges).unwrap();
        assert_eq!(held.len(), 6);
        assert!(held.contains("AB002"));
        assert!(held.contains("CD011"));
    }

    #[test]
    fn overlapping_ranges_collapse() {
        let ranges = vec![range("AB001", "AB003"), range("AB002", "AB004")];
        let held = expand_holdings(&ranges).unwrap();
        assert_eq!(held.len(), 4);
    }

    #[test]
    fn a_bad_range_fails_the_whole_expansion() {
        let ranges = vec![range("AB001", "AB003"), range("CD05", "CD0X")];
        assert!(expand_holdings(&ranges).is_err());
    }

    #[test]
    fn prefixes_are_deduplicated() {
        let ranges = vec![
            range("AB001", "AB003"),
            range("AB100", "AB200"),
            range("CD010", "CD012"),
        ];
        let prefixes = valid_prefixes(&ranges);
        assert_eq!(prefixes.len(), 2);
        assert!(prefixes.contains("AB"));
        assert!(prefixes.contains("CD"));
    }
}
