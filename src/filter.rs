// Filter Step - narrows the full record set to the current selection

use crate::market::{Month, TimeSeriesRecord};
use crate::selection::Selection;

/// Records for the selected company whose date falls in the selected month.
///
/// The year is not part of the match, and input order is kept.
pub fn filter_records(records: &[TimeSeriesRecord], selection: &Selection) -> Vec<TimeSeriesRecord> {
    records
        .iter()
        .filter(|r| matches_selection(r, selection))
        .cloned()
        .collect()
}

pub fn matches_selection(record: &TimeSeriesRecord, selection: &Selection) -> bool {
    record.company == selection.company && Month::from_date(record.date) == selection.month
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Company;
    use chrono::NaiveDate;

    fn record(company: Company, y: i32, m: u32, d: u32, open: f64) -> TimeSeriesRecord {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        TimeSeriesRecord::new(company, date, open, open + 1.0).unwrap()
    }

    fn sample() -> Vec<TimeSeriesRecord> {
        vec![
            record(Company::Apple, 2023, 3, 1, 1.0),
            record(Company::Apple, 2023, 4, 1, 2.0),
            record(Company::Microsoft, 2023, 3, 1, 3.0),
            record(Company::Apple, 2023, 3, 1, 4.0),
            record(Company::Apple, 2023, 4, 1, 5.0),
            record(Company::Apple, 2023, 3, 1, 6.0),
        ]
    }

    #[test]
    fn test_apple_march_keeps_three_in_order() {
        let selection = Selection::new(Company::Apple, Month::March);
        let result = filter_records(&sample(), &selection);

        let opens: Vec<f64> = result.iter().map(|r| r.open).collect();
        assert_eq!(opens, vec![1.0, 4.0, 6.0]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let selection = Selection::new(Company::Google, Month::January);
        assert!(filter_records(&sample(), &selection).is_empty());
        assert!(filter_records(&[], &selection).is_empty());
    }

    #[test]
    fn test_every_output_matches_and_is_subsequence() {
        let input = sample();
        for company in Company::ALL {
            for month in Month::ALL {
                let selection = Selection::new(company, month);
                let output = filter_records(&input, &selection);

                assert!(output.len() <= input.len());
                assert!(output
                    .iter()
                    .all(|r| r.company == company && r.month() == month));

                // Subsequence check: walk the input once
                let mut it = input.iter();
                for r in &output {
                    assert!(it.any(|x| x == r), "output is not an ordered subsequence");
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let input = sample();
        let selection = Selection::new(Company::Apple, Month::April);
        assert_eq!(filter_records(&input, &selection), filter_records(&input, &selection));
    }

    #[test]
    fn test_month_match_ignores_year() {
        let input = vec![
            record(Company::Meta, 2022, 11, 15, 1.0),
            record(Company::Meta, 2023, 11, 15, 2.0),
            record(Company::Meta, 2023, 10, 31, 3.0),
        ];
        let selection = Selection::new(Company::Meta, Month::November);
        assert_eq!(filter_records(&input, &selection).len(), 2);
    }
}
