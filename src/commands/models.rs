use crate::aggregator::flat_stats::Column;
use crate::aggregator::metrics::DEFAULT_HOT_PATHS;
use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::AnalysisOptions;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to the .uprof trace
    pub input: PathBuf,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Initial sort column of the flat view
    pub sort: Column,

    /// Compare values instead of formatted text when sorting
    pub numeric_sort: bool,

    /// Number of hot paths to include in the report
    pub top_paths: usize,

    /// Deepest tree level to print, `None` for everything
    pub max_depth: Option<usize>,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print views to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: None,
            output_svg: None,
            sort: Column::InclusivePercent,
            numeric_sort: false,
            top_paths: DEFAULT_HOT_PATHS,
            max_depth: None,
            flamegraph_config: None,
            print_summary: false,
        }
    }
}

impl AnalyzeArgs {
    /// Analysis options implied by the arguments
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::new()
            .with_textual_sort(!self.numeric_sort)
            .with_flat_sort(self.sort)
    }
}

/// What an analyze run produced
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOutcome {
    pub complete: bool,
    pub functions: usize,
    pub frame_count: u32,
    pub total_cycles: i64,
    pub report_path: Option<PathBuf>,
    pub flamegraph_path: Option<PathBuf>,
}
