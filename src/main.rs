// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use stock_chart::{
    load_csv, logging, Bounds, ChartModel, ChartSink, Command, Config, Selection, StockChart,
    TimeSeriesRecord,
};

fn main() -> Result<()> {
    let config = Config::parse();
    let _log_guard = logging::init(&config.log_file, config.verbose)?;
    info!(version = stock_chart::VERSION, "stock-chart starting");

    let records = load_csv(&config.data)?;
    info!(path = %config.data.display(), records = records.len(), "loaded dataset");
    let dataset = Arc::new(records);

    match config.command {
        Some(Command::Show) => run_show(dataset, config.initial_selection()),
        None => run_ui_mode(dataset, config.initial_selection()),
    }
}

/// JSON view of what the chart would draw
#[derive(Serialize)]
struct ShowOutput<'a> {
    selection: &'a Selection,
    records: &'a [TimeSeriesRecord],
    x_bounds: Option<Bounds>,
    y_bounds: Option<Bounds>,
}

fn run_show(dataset: Arc<Vec<TimeSeriesRecord>>, selection: Selection) -> Result<()> {
    let mut chart = StockChart::new(dataset, selection, ChartSink::new());
    chart.mount();

    let empty = ChartModel::Empty { selection };
    let model = chart.sink().model().unwrap_or(&empty);
    let lines = model.as_lines();

    let output = ShowOutput {
        selection: model.selection(),
        records: lines.map(|l| l.records.as_slice()).unwrap_or(&[]),
        x_bounds: lines.map(|l| l.x_bounds),
        y_bounds: lines.map(|l| l.y_bounds),
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize chart")?;
    println!("{}", json);

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(dataset: Arc<Vec<TimeSeriesRecord>>, selection: Selection) -> Result<()> {
    info!(company = %selection.company, month = %selection.month, "starting ui");

    let mut app = ui::App::new(dataset, selection);
    ui::run_ui(&mut app)?;

    info!("ui closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_dataset: Arc<Vec<TimeSeriesRecord>>, _selection: Selection) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print the chart data: stock-chart show");
    std::process::exit(1);
}
