//! Flat per-function statistics with list-view style column sorting.
//!
//! One row per function that was called at least once. Sorting mirrors a
//! clickable list header:
//! - the name column toggles between ascending and descending on every
//!   click, and remembers its last direction across other columns
//! - any other column sorts descending when it becomes active and ignores
//!   further clicks while it stays active

use super::format::{
    calls_per_frame, compare_text, descending, format_calls_per_frame, format_percent,
    format_usecs, percent_of, usecs_per_call,
};
use crate::parser::registry::{FunctionId, FunctionRegistry};
use crate::utils::config::AnalysisOptions;
use crate::utils::error::OptionError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Columns of the flat view, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    InclusivePercent,
    ExclusivePercent,
    CallsPerFrame,
    InclusivePerCall,
    ExclusivePerCall,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Name,
        Column::InclusivePercent,
        Column::ExclusivePercent,
        Column::CallsPerFrame,
        Column::InclusivePerCall,
        Column::ExclusivePerCall,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text
    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Function Name",
            Self::InclusivePercent => "incl. %",
            Self::ExclusivePercent => "excl. %",
            Self::CallsPerFrame => "calls",
            Self::InclusivePerCall => "incl. per call",
            Self::ExclusivePerCall => "excl. per call",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::InclusivePercent => "incl",
            Self::ExclusivePercent => "excl",
            Self::CallsPerFrame => "calls",
            Self::InclusivePerCall => "incl-per-call",
            Self::ExclusivePerCall => "excl-per-call",
        };
        f.write_str(name)
    }
}

impl FromStr for Column {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "function" => Ok(Self::Name),
            "incl" | "inclusive" | "incl%" => Ok(Self::InclusivePercent),
            "excl" | "exclusive" | "excl%" => Ok(Self::ExclusivePercent),
            "calls" | "calls-per-frame" => Ok(Self::CallsPerFrame),
            "incl-per-call" | "inclusive-per-call" => Ok(Self::InclusivePerCall),
            "excl-per-call" | "exclusive-per-call" => Ok(Self::ExclusivePerCall),
            other => Err(OptionError::UnknownColumn(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One function's statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub function: FunctionId,
    pub name: String,
    pub calls: u32,
    pub inclusive_percent: f64,
    pub exclusive_percent: f64,
    pub calls_per_frame: f32,
    pub inclusive_usecs_per_call: f64,
    pub exclusive_usecs_per_call: f64,

    /// Formatted cells, indexed by `Column::index`
    pub cells: [String; 6],
}

impl FlatRow {
    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    /// Numeric value of a column, `None` for the name
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Name => None,
            Column::InclusivePercent => Some(self.inclusive_percent),
            Column::ExclusivePercent => Some(self.exclusive_percent),
            Column::CallsPerFrame => Some(f64::from(self.calls_per_frame)),
            Column::InclusivePerCall => Some(self.inclusive_usecs_per_call),
            Column::ExclusivePerCall => Some(self.exclusive_usecs_per_call),
        }
    }
}

/// Sortable flat statistics view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatView {
    rows: Vec<FlatRow>,
    sort_column: Column,
    sort_order: SortOrder,
    /// Direction the name column was last sorted in, if ever
    name_order: Option<SortOrder>,
    textual: bool,
}

impl FlatView {
    /// Build rows from the annotated registry, sorted descending by
    /// `options.flat_sort`
    pub fn build(
        registry: &FunctionRegistry,
        total_cycles: i64,
        frame_count: u32,
        usecs_per_cycle: f64,
        options: &AnalysisOptions,
    ) -> Self {
        let rows: Vec<FlatRow> = registry
            .iter()
            .filter(|record| record.calls > 0)
            .map(|record| {
                let inclusive_percent = percent_of(record.incl_cycles, total_cycles);
                let exclusive_percent = percent_of(record.excl_cycles, total_cycles);
                let per_frame = calls_per_frame(record.calls, frame_count);
                let incl_per_call = usecs_per_call(usecs_per_cycle, record.incl_cycles, record.calls);
                let excl_per_call = usecs_per_call(usecs_per_cycle, record.excl_cycles, record.calls);
                FlatRow {
                    function: record.id,
                    name: record.name.clone(),
                    calls: record.calls,
                    inclusive_percent,
                    exclusive_percent,
                    calls_per_frame: per_frame,
                    inclusive_usecs_per_call: incl_per_call,
                    exclusive_usecs_per_call: excl_per_call,
                    cells: [
                        record.name.clone(),
                        format_percent(inclusive_percent),
                        format_percent(exclusive_percent),
                        format_calls_per_frame(per_frame),
                        format_usecs(incl_per_call),
                        format_usecs(excl_per_call),
                    ],
                }
            })
            .collect();
        debug!("Flat view: {} called functions", rows.len());

        let mut view = Self {
            rows,
            sort_column: options.flat_sort,
            sort_order: SortOrder::Descending,
            name_order: None,
            textual: options.textual_sort_compat,
        };
        view.resort();
        view
    }

    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    pub fn sort_column(&self) -> Column {
        self.sort_column
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Handle a click on a column header
    ///
    /// Returns whether the rows were re-sorted.
    pub fn click(&mut self, column: Column) -> bool {
        if column == Column::Name {
            let order = match self.name_order {
                Some(SortOrder::Ascending) => SortOrder::Descending,
                _ => SortOrder::Ascending,
            };
            self.name_order = Some(order);
            self.sort_by(Column::Name, order);
            true
        } else if column != self.sort_column {
            self.sort_by(column, SortOrder::Descending);
            true
        } else {
            false
        }
    }

    /// Sort by an explicit column and direction
    pub fn sort_by(&mut self, column: Column, order: SortOrder) {
        self.sort_column = column;
        self.sort_order = order;
        self.resort();
    }

    fn resort(&mut self) {
        let (column, order, textual) = (self.sort_column, self.sort_order, self.textual);
        self.rows.sort_by(|a, b| {
            let desc = compare_descending(a, b, column, textual);
            match order {
                SortOrder::Descending => desc,
                SortOrder::Ascending => desc.reverse(),
            }
        });
    }
}

fn compare_descending(a: &FlatRow, b: &FlatRow, column: Column, textual: bool) -> Ordering {
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => descending(textual, (a.cell(column), x), (b.cell(column), y)),
        _ => compare_text(b.cell(column), a.cell(column)),
    }
}
