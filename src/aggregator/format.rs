//! Label formatting and ordering shared by the views.

use crate::parser::call_tree::NodeKind;
use crate::parser::registry::FunctionRegistry;
use crate::utils::config::{CALLS_PER_FRAME_WIDTH, PERCENT_WIDTH, USEC_WIDTH};
use std::cmp::Ordering;

/// Percentage of `total`, 0 for an empty trace
pub fn percent_of(cycles: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * cycles as f64 / total as f64
    }
}

/// Microseconds for `cycles` spread over `calls`
pub fn usecs_per_call(usecs_per_cycle: f64, cycles: i64, calls: u32) -> f64 {
    usecs_per_cycle * cycles as f64 / f64::from(calls.max(1))
}

/// Calls per frame in single precision, 0 without frames
pub fn calls_per_frame(calls: u32, frame_count: u32) -> f32 {
    if frame_count == 0 {
        0.0
    } else {
        calls as f32 / frame_count as f32
    }
}

pub fn format_percent(percent: f64) -> String {
    format!("{:>width$.2}", percent, width = PERCENT_WIDTH)
}

pub fn format_usecs(usecs: f64) -> String {
    format!("{:>width$.2}", usecs, width = USEC_WIDTH)
}

pub fn format_calls_per_frame(calls: f32) -> String {
    format!("{:>width$.4}", calls, width = CALLS_PER_FRAME_WIDTH)
}

/// Call graph label, e.g. `" 9.99%  Pawn.Tick"`
pub fn percent_label(percent: f64, name: &str) -> String {
    format!("{}%  {}", format_percent(percent), name)
}

/// Expensive functions label, e.g. `"    12.50 usec  Pawn.Tick"`
pub fn usecs_label(usecs: f64, name: &str) -> String {
    format!("{} usec  {}", format_usecs(usecs), name)
}

/// Display name for a tree node
pub fn node_name(registry: &FunctionRegistry, kind: NodeKind) -> String {
    match kind.lookup_id() {
        Some(id) => registry.name_of(id),
        None => String::new(),
    }
}

/// Case-insensitive text order, lowercase first when only case differs
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<String>();
    folded(a).cmp(&folded(b)).then_with(|| b.cmp(a))
}

/// Descending order between two labelled values
///
/// Textual mode compares the formatted labels with `compare_text`; numeric
/// mode compares the values and falls back to the labels on ties.
pub fn descending(textual: bool, a: (&str, f64), b: (&str, f64)) -> Ordering {
    if textual {
        compare_text(b.0, a.0)
    } else {
        b.1.total_cmp(&a.1).then_with(|| compare_text(b.0, a.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_labels() {
        assert_eq!(percent_label(9.994, "A"), " 9.99%  A");
        assert_eq!(percent_label(100.0, "A"), "100.00%  A");
        assert_eq!(usecs_label(12.5, "B"), "    12.50 usec  B");
        assert_eq!(format_calls_per_frame(0.5), " 0.5000");
    }

    #[test]
    fn test_empty_totals_render_zero() {
        assert_eq!(percent_of(10, 0), 0.0);
        assert_eq!(calls_per_frame(3, 0), 0.0);
        assert_eq!(usecs_per_call(2.0, 10, 0), 20.0);
    }

    #[test]
    fn test_textual_order_differs_from_numeric() {
        let hundred = ("100.00%  Main", 100.0);
        let ninety = ("99.96%  Update", 99.96);
        // '9' > '1': the larger value sorts last as text
        assert_eq!(descending(true, hundred, ninety), Ordering::Greater);
        assert_eq!(descending(false, hundred, ninety), Ordering::Less);

        let ten = ("10.00%  A", 10.0);
        let nine = (" 9.99%  B", 9.99);
        // Padding keeps one and two digit values in order
        assert_eq!(descending(true, ten, nine), Ordering::Less);
    }

    #[test]
    fn test_text_order_ignores_case() {
        assert_eq!(compare_text("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_text("Zeta", "beta"), Ordering::Greater);
        assert_eq!(compare_text("main", "Main"), Ordering::Less);
        assert_eq!(compare_text("Main", "Main"), Ordering::Equal);

        let lower = (" 5.00%  alpha", 5.0);
        let upper = (" 5.00%  Beta", 5.0);
        assert_eq!(descending(true, upper, lower), Ordering::Less);
        assert_eq!(descending(false, upper, lower), Ordering::Less);
    }
}
