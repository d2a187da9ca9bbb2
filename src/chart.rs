// 📊 Render Step - turns filtered records into a drawable chart model
//
// The model carries everything the TUI needs: axis bounds and labels,
// the Open and Close series, per-point tooltips and the legend.
// An empty record slice produces ChartModel::Empty instead of degenerate axes.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::market::TimeSeriesRecord;
use crate::selection::Selection;

/// Receives the filtered records every time the chart must be redrawn
pub trait RenderSink {
    fn render(&mut self, selection: &Selection, records: &[TimeSeriesRecord]);
}

// ============================================================================
// LEGEND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Series {
    Open,
    Close,
}

impl Series {
    pub const ALL: [Series; 2] = [Series::Open, Series::Close];

    pub fn label(&self) -> &'static str {
        match self {
            Series::Open => "Open",
            Series::Close => "Close",
        }
    }

    /// RGB color of the line, its markers and its legend swatch
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Series::Open => (0xb2, 0xdf, 0x8a),
            Series::Close => (0xe4, 0x1a, 0x1c),
        }
    }
}

// ============================================================================
// SCALES
// ============================================================================

const Y_TICK_TARGET: usize = 10;
const X_TICK_COUNT: usize = 6;
const Y_LABEL_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// `count` evenly spaced values from min to max inclusive
    fn ticks(&self, count: usize) -> Vec<f64> {
        if count < 2 {
            return vec![self.min];
        }
        let step = self.span() / (count - 1) as f64;
        (0..count).map(|i| self.min + step * i as f64).collect()
    }
}

/// Tick step for a domain, as 1, 2 or 5 times a power of ten.
///
/// Positive results are the step itself; negative results are the
/// inverse of a fractional step (-10 means 0.1), which keeps the
/// rounding in `nice` exact for small steps.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Extend a domain outward to round tick values.
///
/// The domain comes back unchanged when the step never settles.
pub fn nice(min: f64, max: f64, count: usize) -> Bounds {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let original = Bounds { min: lo, max: hi };
    if hi <= lo || !lo.is_finite() || !hi.is_finite() {
        return original;
    }

    let (mut start, mut stop) = (lo, hi);
    let mut previous_step = f64::NAN;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if step == previous_step {
            return Bounds { min: start, max: stop };
        }
        if !step.is_finite() || step == 0.0 {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        }
        previous_step = step;
    }

    original
}

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

// ============================================================================
// CHART MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ChartModel {
    /// Nothing matches the selection; drawn as a placeholder
    Empty { selection: Selection },
    Lines(LineChart),
}

impl ChartModel {
    pub fn build(selection: &Selection, records: &[TimeSeriesRecord]) -> Self {
        match LineChart::from_records(*selection, records) {
            Some(chart) => ChartModel::Lines(chart),
            None => ChartModel::Empty { selection: *selection },
        }
    }

    pub fn selection(&self) -> &Selection {
        match self {
            ChartModel::Empty { selection } => selection,
            ChartModel::Lines(chart) => &chart.selection,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChartModel::Empty { .. })
    }

    pub fn as_lines(&self) -> Option<&LineChart> {
        match self {
            ChartModel::Lines(chart) => Some(chart),
            ChartModel::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub selection: Selection,
    pub records: Vec<TimeSeriesRecord>,
    pub open: Vec<(f64, f64)>,
    pub close: Vec<(f64, f64)>,
    pub x_bounds: Bounds,
    pub y_bounds: Bounds,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
}

impl LineChart {
    /// None when there is nothing to plot
    pub fn from_records(selection: Selection, records: &[TimeSeriesRecord]) -> Option<Self> {
        let first = records.first()?;

        let (mut x_min, mut x_max) = (date_to_x(first.date), date_to_x(first.date));
        let (mut y_min, mut y_max) = (first.open.min(first.close), first.open.max(first.close));
        for r in records {
            let x = date_to_x(r.date);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(r.open.min(r.close));
            y_max = y_max.max(r.open.max(r.close));
        }

        // A single day or a flat price would give a zero-width axis
        if x_min == x_max {
            x_min -= 1.0;
            x_max += 1.0;
        }
        if y_min == y_max {
            y_min -= 1.0;
            y_max += 1.0;
        }

        let x_bounds = Bounds { min: x_min, max: x_max };
        let y_bounds = nice(y_min, y_max, Y_TICK_TARGET);

        let open = records.iter().map(|r| (date_to_x(r.date), r.open)).collect();
        let close = records.iter().map(|r| (date_to_x(r.date), r.close)).collect();

        Some(Self {
            selection,
            records: records.to_vec(),
            open,
            close,
            x_labels: x_labels(&x_bounds),
            y_labels: y_labels(&y_bounds),
            x_bounds,
            y_bounds,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn series(&self, series: Series) -> &[(f64, f64)] {
        match series {
            Series::Open => &self.open,
            Series::Close => &self.close,
        }
    }

    /// Tooltip lines for the point at `index`
    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        self.records.get(index).map(Tooltip::for_record)
    }

    /// Index of the record whose date is closest to `x`; first wins on ties
    pub fn nearest_index(&self, x: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (px, _)) in self.open.iter().enumerate() {
            let distance = (px - x).abs();
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Labels on whole days only: the largest step count up to X_TICK_COUNT - 1
/// that divides the day span evenly
fn x_labels(bounds: &Bounds) -> Vec<String> {
    let format = |x: f64| x_to_date(x).map(|d| d.format("%b %d").to_string()).unwrap_or_default();

    let span_days = bounds.span().round().max(0.0) as usize;
    if span_days == 0 {
        return vec![format(bounds.min)];
    }
    let steps = (1..X_TICK_COUNT)
        .rev()
        .find(|n| span_days % n == 0)
        .unwrap_or(1);
    let days_per_step = span_days / steps;

    (0..=steps)
        .map(|i| format(bounds.min + (i * days_per_step) as f64))
        .collect()
}

/// Fewest decimals (up to 6) that print `value` exactly
fn decimals_for(value: f64) -> usize {
    (0..=6)
        .find(|&d| {
            let scaled = value * 10f64.powi(d as i32);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(6)
}

fn y_labels(bounds: &Bounds) -> Vec<String> {
    let step = bounds.span() / (Y_LABEL_COUNT - 1) as f64;
    let decimals = decimals_for(step).max(decimals_for(bounds.min));
    bounds
        .ticks(Y_LABEL_COUNT)
        .into_iter()
        .map(|y| format!("{:.*}", decimals, y))
        .collect()
}

// ============================================================================
// TOOLTIP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub date: String,
    pub open: String,
    pub close: String,
    pub difference: String,
}

impl Tooltip {
    pub fn for_record(record: &TimeSeriesRecord) -> Self {
        Self {
            date: format!("Date: {}", record.date.format("%a %b %d %Y")),
            open: format!("Open: ${}", record.open),
            close: format!("Close: ${}", record.close),
            difference: format!("Difference: ${:.2}", record.difference()),
        }
    }

    pub fn lines(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.open.as_str(),
            self.close.as_str(),
            self.difference.as_str(),
        ]
    }
}

// ============================================================================
// SINK
// ============================================================================

/// RenderSink used by the TUI: keeps the latest model for drawing
#[derive(Debug, Default)]
pub struct ChartSink {
    model: Option<ChartModel>,
    renders: usize,
}

impl ChartSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> Option<&ChartModel> {
        self.model.as_ref()
    }

    /// How many times the chart has been rebuilt
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl RenderSink for ChartSink {
    fn render(&mut self, selection: &Selection, records: &[TimeSeriesRecord]) {
        self.model = Some(ChartModel::build(selection, records));
        self.renders += 1;
    }
}

// ============================================================================
// TESTS
// ============================================================================
