// Change-Detection Trigger
// Compares the current inputs against the immediately preceding ones only.

use std::sync::Arc;

use crate::market::{Company, Month, TimeSeriesRecord};

/// The three values a redraw depends on
#[derive(Debug, Clone, Copy)]
pub struct Inputs<'a> {
    pub dataset: &'a Arc<Vec<TimeSeriesRecord>>,
    pub company: Company,
    pub month: Month,
}

#[derive(Debug)]
struct Snapshot {
    // Holding the Arc keeps the allocation alive, so pointer identity stays meaningful
    dataset: Arc<Vec<TimeSeriesRecord>>,
    company: Company,
    month: Month,
}

impl Snapshot {
    fn differs_from(&self, inputs: &Inputs<'_>) -> bool {
        !Arc::ptr_eq(&self.dataset, inputs.dataset)
            || self.company != inputs.company
            || self.month != inputs.month
    }
}

#[derive(Debug, Default)]
pub struct ChangeDetector {
    previous: Option<Snapshot>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `inputs` and return true if a redraw is due.
    ///
    /// The first observation always fires. After that it fires only when
    /// the dataset identity, company or month differs from the last call.
    pub fn observe(&mut self, inputs: Inputs<'_>) -> bool {
        let changed = match &self.previous {
            None => true,
            Some(prev) => prev.differs_from(&inputs),
        };

        if changed {
            self.previous = Some(Snapshot {
                dataset: Arc::clone(inputs.dataset),
                company: inputs.company,
                month: inputs.month,
            });
        }

        changed
    }

    pub fn has_observed(&self) -> bool {
        self.previous.is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================
