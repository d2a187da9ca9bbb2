// Stock chart component
// Owns the selection and the dataset, and redraws through a RenderSink
// only when the change detector says the inputs moved.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::change::{ChangeDetector, Inputs};
use crate::chart::RenderSink;
use crate::filter::filter_records;
use crate::market::{Company, Month, TimeSeriesRecord};
use crate::selection::Selection;

pub struct StockChart<S: RenderSink> {
    dataset: Arc<Vec<TimeSeriesRecord>>,
    selection: Selection,
    detector: ChangeDetector,
    sink: S,
    mounted: bool,
}

impl<S: RenderSink> StockChart<S> {
    pub fn new(dataset: Arc<Vec<TimeSeriesRecord>>, selection: Selection, sink: S) -> Self {
        Self {
            dataset,
            selection,
            detector: ChangeDetector::new(),
            sink,
            mounted: false,
        }
    }

    /// First draw. Returns true the first time, false on repeat calls.
    pub fn mount(&mut self) -> bool {
        self.mounted = true;
        self.refresh()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn set_company(&mut self, company: Company) -> bool {
        if self.selection.set_company(company) {
            debug!(company = %company, "company selected");
        }
        self.refresh()
    }

    pub fn set_month(&mut self, month: Month) -> bool {
        if self.selection.set_month(month) {
            debug!(month = %month, "month selected");
        }
        self.refresh()
    }

    pub fn select_next_company(&mut self) -> bool {
        self.set_company(self.selection.company.next())
    }

    pub fn select_previous_company(&mut self) -> bool {
        self.set_company(self.selection.company.previous())
    }

    pub fn select_next_month(&mut self) -> bool {
        self.set_month(self.selection.month.next())
    }

    pub fn select_previous_month(&mut self) -> bool {
        self.set_month(self.selection.month.previous())
    }

    /// Replace the record collection. A new Arc counts as a change even
    /// if its contents are equal to the old one.
    pub fn set_data(&mut self, dataset: Arc<Vec<TimeSeriesRecord>>) -> bool {
        self.dataset = dataset;
        self.refresh()
    }

    /// Re-evaluate the inputs and redraw if any of them changed.
    /// Returns whether the sink was invoked.
    pub fn refresh(&mut self) -> bool {
        if !self.mounted {
            return false;
        }

        let inputs = Inputs {
            dataset: &self.dataset,
            company: self.selection.company,
            month: self.selection.month,
        };
        if !self.detector.observe(inputs) {
            return false;
        }

        let records = filter_records(&self.dataset, &self.selection);
        if records.is_empty() {
            warn!(
                company = %self.selection.company,
                month = %self.selection.month,
                "no records match selection; drawing empty chart"
            );
        }
        debug!(
            company = %self.selection.company,
            month = %self.selection.month,
            records = records.len(),
            "rendering chart"
        );
        self.sink.render(&self.selection, &records);
        true
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dataset(&self) -> &Arc<Vec<TimeSeriesRecord>> {
        &self.dataset
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

// ============================================================================
// TESTS
// ============================================================================
