// Selection State - the (company, month) pair driving the chart

use serde::Serialize;

use crate::market::{Company, Month};

/// The user's current view filter
///
/// Both fields are closed enums, so an out-of-set company or month cannot
/// be selected. Setters report whether the value actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub company: Company,
    pub month: Month,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            company: Company::Apple,
            month: Month::November,
        }
    }
}

impl Selection {
    pub fn new(company: Company, month: Month) -> Self {
        Self { company, month }
    }

    pub fn set_company(&mut self, company: Company) -> bool {
        let changed = self.company != company;
        self.company = company;
        changed
    }

    pub fn set_month(&mut self, month: Month) -> bool {
        let changed = self.month != month;
        self.month = month;
        changed
    }
}

// ============================================================================
// TESTS
// ============================================================================
