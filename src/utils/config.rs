//! Configuration and constants for the analyzer and CLI.

use crate::aggregator::flat_stats::Column;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

// Function pointers are 4 byte aligned, so an id with the low bits set can
// never collide with a real function. Used for synthetic "self" time.
pub const SELF_FUNCTION_ID: u32 = 0xFFFF_FFFF;
pub const SELF_FUNCTION_NAME: &str = "self";

/// Label of the synthetic root; never rendered
pub const ROOT_LABEL: &str = "Call Graph";

// Progress milestones on a 0-100 scale.
// Reading the stream maps to 0..=80, annotation and views to 80..=100.
pub const HEADER_PROGRESS_SPAN: u64 = 80;
pub const DECODED_PROGRESS: u8 = 80;
pub const ANNOTATED_PROGRESS: u8 = 90;
pub const COMPLETE_PROGRESS: u8 = 100;

// Fixed label widths (right aligned)
pub const PERCENT_WIDTH: usize = 5;
pub const USEC_WIDTH: usize = 9;
pub const CALLS_PER_FRAME_WIDTH: usize = 7;

/// Options controlling how the views are derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Sort siblings and flat rows by their formatted text rather than by
    /// value. "10.00%" sorts below "9.99%" in this mode.
    pub textual_sort_compat: bool,

    /// Initial sort column of the flat statistics view
    pub flat_sort: Column,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            textual_sort_compat: true,
            flat_sort: Column::InclusivePercent,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_textual_sort(mut self, textual: bool) -> Self {
        self.textual_sort_compat = textual;
        self
    }

    pub fn with_flat_sort(mut self, column: Column) -> Self {
        self.flat_sort = column;
        self
    }
}
