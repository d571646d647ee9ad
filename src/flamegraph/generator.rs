//! SVG flamegraph generation with inferno.
//!
//! The call graph is first folded into collapsed stacks, then handed to
//! `inferno::flamegraph::from_lines`.

use crate::aggregator::format::{format_percent, percent_of};
use crate::aggregator::stack_builder::{total_weight, CollapsedStack};
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,

    /// Unit shown in the frame tooltips
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "Script Profile".to_string(),
            width: 1200,
            count_name: "cycles".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_count_name(mut self, count_name: impl Into<String>) -> Self {
        self.count_name = count_name.into();
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to draw
/// * `FlamegraphError::IoError` - inferno failed to render
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = config.count_name.clone();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::GenerationFailed(e.to_string()))?;

    let svg = String::from_utf8_lossy(&svg).into_owned();
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}

/// Text table of the heaviest call paths
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize) -> String {
    let total = total_weight(stacks) as i64;
    let mut lines = Vec::new();

    lines.push("  HOT PATHS".to_string());
    lines.push(format!("  {}", "-".repeat(72)));
    lines.push(format!("  {:<50} {:>12} {:>7}", "Call path (heaviest first)", "CYCLES", "%"));
    lines.push(format!("  {}", "-".repeat(72)));

    for stack in stacks.iter().take(max_lines) {
        let display_stack = if stack.stack.chars().count() > 50 {
            let tail: String = stack
                .stack
                .chars()
                .rev()
                .take(47)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };

        lines.push(format!(
            "  {:<50} {:>12} {}%",
            display_stack,
            stack.weight,
            format_percent(percent_of(stack.weight as i64, total))
        ));
    }

    lines.push(format!("  {}", "-".repeat(72)));

    if stacks.len() > max_lines {
        lines.push(format!("   (Showing top {} of {} call paths)", max_lines, stacks.len()));
    }

    lines.join("\n")
}
