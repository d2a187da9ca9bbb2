// Command-line and environment configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::market::{Company, Month};
use crate::selection::Selection;

#[derive(Debug, Clone, Parser)]
#[command(name = "stock-chart", version, about = "Open/Close stock chart for one company and month")]
pub struct Config {
    /// CSV file with Company,Date,Open,Close columns
    #[arg(long, env = "STOCK_CHART_DATA", default_value = "data/stocks.csv")]
    pub data: PathBuf,

    /// Initial company (Apple, Microsoft, Amazon, Google or Meta)
    #[arg(long)]
    pub company: Option<Company>,

    /// Initial month, as a full English name
    #[arg(long)]
    pub month: Option<Month>,

    /// Where log output goes; the terminal belongs to the UI
    #[arg(long, env = "STOCK_CHART_LOG", default_value = "stock-chart.log")]
    pub log_file: PathBuf,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the filtered records and chart bounds as JSON and exit
    Show,
}

impl Config {
    /// Selection the chart mounts with; unset fields keep their defaults
    pub fn initial_selection(&self) -> Selection {
        let defaults = Selection::default();
        Selection::new(
            self.company.unwrap_or(defaults.company),
            self.month.unwrap_or(defaults.month),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["stock-chart"]).unwrap();
        assert_eq!(config.initial_selection(), Selection::default());
        assert!(config.command.is_none());
        assert!(!config.verbose);
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "stock-chart",
            "--data",
            "prices.csv",
            "--company",
            "google",
            "--month",
            "March",
            "-v",
            "show",
        ])
        .unwrap();

        assert_eq!(config.data, PathBuf::from("prices.csv"));
        assert_eq!(config.initial_selection(), Selection::new(Company::Google, Month::March));
        assert_eq!(config.command, Some(Command::Show));
        assert!(config.verbose);
    }

    #[test]
    fn test_company_keeps_default_month() {
        let config = Config::try_parse_from(["stock-chart", "--company", "Meta"]).unwrap();
        assert_eq!(config.initial_selection(), Selection::new(Company::Meta, Month::November));
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(Config::try_parse_from(["stock-chart", "--company", "Netflix"]).is_err());
        assert!(Config::try_parse_from(["stock-chart", "--month", "Smarch"]).is_err());
    }
}
