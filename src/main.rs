//! uprof CLI
//!
//! Analyzer for binary .uprof script profiler traces.
//! Prints the call graph, expensive functions, and flat statistics views,
//! and writes JSON reports and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use uprof_studio::aggregator::metrics::DEFAULT_HOT_PATHS;
use uprof_studio::aggregator::Column;
use uprof_studio::commands::{display_version, execute_analyze, validate_args, validate_report_file, AnalyzeArgs};
use uprof_studio::flamegraph::FlamegraphConfig;

/// uprof - script profiler trace analyzer
#[derive(Parser, Debug)]
#[command(name = "uprof")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a .uprof trace
    Analyze {
        /// Path to the trace file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "flamegraph.svg")]
        flamegraph: Option<PathBuf>,

        /// Initial flat statistics column (name, incl, excl, calls, incl-per-call, excl-per-call)
        #[arg(long, default_value = "incl")]
        sort: Column,

        /// Sort by value instead of by formatted text
        #[arg(long)]
        numeric_sort: bool,

        /// Number of hot paths to include
        #[arg(long, default_value_t = DEFAULT_HOT_PATHS)]
        top_paths: usize,

        /// Deepest tree level printed with --summary
        #[arg(long)]
        depth: Option<usize>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Print the views to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            flamegraph,
            sort,
            numeric_sort,
            top_paths,
            depth,
            title,
            width,
            summary,
        } => {
            let fg_config = flamegraph.as_ref().map(|_| {
                let config = FlamegraphConfig::new().with_width(width);
                match title {
                    Some(title) => config.with_title(title),
                    None => config,
                }
            });

            let args = AnalyzeArgs {
                input,
                output_json: output,
                output_svg: flamegraph,
                sort,
                numeric_sort,
                top_paths,
                max_depth: depth,
                flamegraph_config: fg_config,
                print_summary: summary,
            };

            validate_args(&args)?;

            let outcome = execute_analyze(args)?;
            if !outcome.complete {
                log::warn!("Results are partial; the trace ended early or is malformed");
            }
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
