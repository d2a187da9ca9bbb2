// 📈 Market Data - companies, months and daily Open/Close records
// Records are loaded once from CSV and never mutated afterwards.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DataError, DataErrorKind, ParseCompanyError, ParseMonthError};

// ============================================================================
// COMPANY
// ============================================================================

/// The fixed set of companies the chart can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Company {
    Apple,
    Microsoft,
    Amazon,
    Google,
    Meta,
}

impl Company {
    /// Display order of the company controls
    pub const ALL: [Company; 5] = [
        Company::Apple,
        Company::Microsoft,
        Company::Amazon,
        Company::Google,
        Company::Meta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Company::Apple => "Apple",
            Company::Microsoft => "Microsoft",
            Company::Amazon => "Amazon",
            Company::Google => "Google",
            Company::Meta => "Meta",
        }
    }

    /// Position in `Company::ALL`
    pub fn index(&self) -> usize {
        match self {
            Company::Apple => 0,
            Company::Microsoft => 1,
            Company::Amazon => 2,
            Company::Google => 3,
            Company::Meta => 4,
        }
    }

    pub fn next(&self) -> Self {
        Company::ALL[(self.index() + 1) % Company::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Company::ALL[(self.index() + Company::ALL.len() - 1) % Company::ALL.len()]
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Company {
    type Err = ParseCompanyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Company::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseCompanyError(s.to_string()))
    }
}

// ============================================================================
// MONTH
// ============================================================================

/// Calendar month, compared by name regardless of year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// English long name, e.g. "November"
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// 1 = January ... 12 = December
    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|i| Month::ALL.get(i as usize).copied())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        // chrono guarantees month() is in 1..=12
        Month::ALL[date.month0() as usize]
    }

    pub fn next(&self) -> Self {
        Month::ALL[(*self as usize + 1) % 12]
    }

    pub fn previous(&self) -> Self {
        Month::ALL[(*self as usize + 11) % 12]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

// ============================================================================
// TIME SERIES RECORD
// ============================================================================

/// One trading day for one company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRecord {
    pub company: Company,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl TimeSeriesRecord {
    /// Build a record, rejecting negative or non-finite prices
    pub fn new(company: Company, date: NaiveDate, open: f64, close: f64) -> Result<Self, DataErrorKind> {
        check_price("Open", open)?;
        check_price("Close", close)?;
        Ok(Self { company, date, open, close })
    }

    pub fn month(&self) -> Month {
        Month::from_date(self.date)
    }

    /// Close minus open
    pub fn difference(&self) -> f64 {
        self.close - self.open
    }
}

fn check_price(field: &'static str, value: f64) -> Result<(), DataErrorKind> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DataErrorKind::Price { field, value })
    }
}

/// Accepts ISO dates and US-style MM/DD/YYYY
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

// ============================================================================
// CSV LOADING
// ============================================================================

/// Raw CSV row; extra columns such as High/Low/Volume are ignored
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Company")]
    company: String,

    #[serde(rename = "Date")]
    date: String,

    #[serde(rename = "Open")]
    open: f64,

    #[serde(rename = "Close")]
    close: f64,
}

impl CsvRow {
    fn into_record(self) -> Result<TimeSeriesRecord, DataErrorKind> {
        let company: Company = self.company.parse()?;
        let date = parse_date(&self.date).ok_or(DataErrorKind::Date(self.date))?;
        TimeSeriesRecord::new(company, date, self.open, self.close)
    }
}

pub fn load_csv(csv_path: &Path) -> Result<Vec<TimeSeriesRecord>> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;
    read_csv(file).with_context(|| format!("Failed to load {}", csv_path.display()))
}

/// Parse records from any reader; input order is kept
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TimeSeriesRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (i, result) in rdr.deserialize().enumerate() {
        let row = i + 1;
        let raw: CsvRow = result.with_context(|| format!("Failed to deserialize row {}", row))?;
        let record = raw.into_record().map_err(|kind| DataError { row, kind })?;
        records.push(record);
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
