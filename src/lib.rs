// Stock Chart - Core Library
// Selection state, filtering, change detection and the chart model,
// shared by the TUI and the JSON `show` mode.

pub mod error;
pub mod market;
pub mod selection;
pub mod filter;
pub mod change;
pub mod chart;
pub mod component;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{DataError, DataErrorKind, ParseCompanyError, ParseMonthError};
pub use market::{Company, Month, TimeSeriesRecord, load_csv, read_csv, parse_date};
pub use selection::Selection;
pub use filter::{filter_records, matches_selection};
pub use change::{ChangeDetector, Inputs};
pub use chart::{
    Bounds, ChartModel, ChartSink, LineChart, RenderSink, Series, Tooltip, nice,
};
pub use component::StockChart;
pub use config::{Command, Config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
