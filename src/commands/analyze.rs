//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Decodes the trace and annotates the call tree
//! 2. Builds collapsed stacks
//! 3. Generates flamegraph
//! 4. Calculates hot paths
//! 5. Writes output files

use super::models::{AnalyzeArgs, AnalyzeOutcome};
use crate::aggregator::{analyze_file, build_collapsed_stacks, calculate_hot_paths, Analysis};
use crate::flamegraph::{generate_flamegraph, generate_text_summary};
use crate::output::{render_flat_table, render_tree, write_report, write_svg};
use crate::parser::schema::to_report;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// Summary of the run. A truncated or malformed trace is not an error: its
/// partial results are still written and `complete` is false.
///
/// # Errors
/// * Trace file cannot be opened
/// * Flamegraph rendering failures
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.input.display());

    // Step 1: Decode and annotate
    info!("Step 1/5: Decoding trace...");
    let mut progress = |percent: u8| debug!("Progress: {}%", percent);
    let analysis = analyze_file(&args.input, &args.analysis_options(), &mut progress)
        .with_context(|| format!("Failed to read trace {}", args.input.display()))?;

    if let Some(error) = analysis.status.error() {
        warn!("Trace is incomplete: {}", error);
    }
    debug!(
        "Decoded {} tokens, {} functions, {} frames, {} cycles",
        analysis.tokens_read,
        analysis.flat.rows().len(),
        analysis.frame_count,
        analysis.total_cycles
    );

    // Step 2: Build collapsed stacks
    info!("Step 2/5: Building collapsed stacks...");
    let stacks = build_collapsed_stacks(&analysis.call_graph, &analysis.registry);

    // Step 3: Generate flamegraph (if requested)
    let svg_content = if args.output_svg.is_some() && !stacks.is_empty() {
        info!("Step 3/5: Generating flamegraph...");
        let svg = generate_flamegraph(&stacks, args.flamegraph_config.as_ref())
            .context("Failed to generate flamegraph")?;
        Some(svg)
    } else {
        if args.output_svg.is_some() {
            warn!("No cycles recorded, skipping flamegraph");
        }
        info!("Step 3/5: Skipping flamegraph generation");
        None
    };

    // Step 4: Calculate hot paths
    info!("Step 4/5: Calculating top {} hot paths...", args.top_paths);
    let hot_paths = calculate_hot_paths(&stacks, analysis.total_cycles, args.top_paths);

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");
    if let Some(json_path) = &args.output_json {
        let report = to_report(&analysis, &args.input.display().to_string(), hot_paths);
        write_report(&report, json_path).context("Failed to write report JSON")?;
        info!("Report written to: {}", json_path.display());
    }

    let flamegraph_path = match (svg_content, &args.output_svg) {
        (Some(svg), Some(svg_path)) => {
            write_svg(&svg, svg_path).context("Failed to write flamegraph SVG")?;
            info!("Flamegraph written to: {}", svg_path.display());
            Some(svg_path.clone())
        }
        _ => None,
    };

    if args.print_summary {
        print_summary(&analysis, &args);
        println!("\n{}", generate_text_summary(&stacks, args.top_paths));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(AnalyzeOutcome {
        complete: analysis.status.is_complete(),
        functions: analysis.flat.rows().len(),
        frame_count: analysis.frame_count,
        total_cycles: analysis.total_cycles,
        report_path: args.output_json.clone(),
        flamegraph_path,
    })
}

fn print_summary(analysis: &Analysis, args: &AnalyzeArgs) {
    println!("\n{}", "=".repeat(80));
    println!("TRACE SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Trace:          {}", args.input.display());
    match analysis.status.error() {
        None => println!("Status:         complete"),
        Some(error) => println!("Status:         partial ({})", error),
    }
    println!("Frames:         {}", analysis.frame_count);
    println!("Total cycles:   {}", analysis.total_cycles);
    println!("Usec per cycle: {}", analysis.usecs_per_cycle);

    println!("\nCALL GRAPH");
    println!("{}", render_tree(&analysis.call_graph, args.max_depth));
    println!("\nEXPENSIVE FUNCTIONS");
    println!("{}", render_tree(&analysis.expensive_functions, args.max_depth));
    println!("\nFUNCTION STATISTICS");
    println!("{}", render_flat_table(&analysis.flat));
    println!("{}", "=".repeat(80));
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input trace not found: {}", args.input.display());
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    if args.max_depth == Some(0) {
        anyhow::bail!("depth must be greater than 0");
    }

    if let Some(config) = &args.flamegraph_config {
        if config.width == 0 {
            anyhow::bail!("Flamegraph width must be greater than 0");
        }
    }

    Ok(())
}
