// Error types for the stock chart library
// The chart pipeline itself cannot fail; only parsing and loading can.

use thiserror::Error;

/// A company name outside the fixed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown company {0:?} (expected Apple, Microsoft, Amazon, Google or Meta)")]
pub struct ParseCompanyError(pub String);

/// A month name that is not one of the twelve English long names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown month {0:?} (expected a full month name like \"November\")")]
pub struct ParseMonthError(pub String);

/// A CSV row that could not become a TimeSeriesRecord
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: {kind}")]
pub struct DataError {
    /// 1-based data row (the header is not counted)
    pub row: usize,
    pub kind: DataErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataErrorKind {
    #[error(transparent)]
    Company(#[from] ParseCompanyError),

    #[error("unrecognised date {0:?} (expected YYYY-MM-DD or MM/DD/YYYY)")]
    Date(String),

    #[error("{field} price {value} must be a finite, non-negative number")]
    Price { field: &'static str, value: f64 },
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_message_names_row() {
        let err = DataError {
            row: 7,
            kind: DataErrorKind::Price { field: "Open", value: -1.5 },
        };
        assert_eq!(
            err.to_string(),
            "row 7: Open price -1.5 must be a finite, non-negative number"
        );
    }

    #[test]
    fn test_company_error_is_transparent() {
        let kind: DataErrorKind = ParseCompanyError("Netflix".to_string()).into();
        assert!(kind.to_string().starts_with("unknown company \"Netflix\""));
    }
}
