use pretty_assertions::assert_eq;
use tempfile::tempdir;
use uprof_studio::aggregator::{analyze_trace, build_collapsed_stacks, calculate_hot_paths, Analysis, Column};
use uprof_studio::output::{read_report, render_flat_table, render_tree, write_report, write_svg};
use uprof_studio::parser::{to_report, NodeKind, ParseStatus, TraceWriter};
use uprof_studio::utils::config::{AnalysisOptions, REPORT_SCHEMA_VERSION};
use uprof_studio::utils::error::{OutputError, ParseError};

fn sample_analysis() -> Analysis {
    let bytes = TraceWriter::new(2.0)
        .function(4, "Main")
        .function(8, "Update")
        .enter(4)
        .enter(8)
        .cycles(101)
        .cycles(501)
        .frame_end()
        .finish();
    analyze_trace(bytes.as_slice(), Some(bytes.len() as u64), &AnalysisOptions::default(), &mut |_: u8| {})
}

#[test]
fn test_report_round_trip() {
    let analysis = sample_analysis();
    let stacks = build_collapsed_stacks(&analysis.call_graph, &analysis.registry);
    let hot_paths = calculate_hot_paths(&stacks, analysis.total_cycles, 10);
    let report = to_report(&analysis, "level1.uprof", hot_paths);

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("report.json");
    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded.version, REPORT_SCHEMA_VERSION);
    assert_eq!(loaded.source, "level1.uprof");
    assert_eq!(loaded.status.parse, ParseStatus::Complete);
    assert_eq!(loaded.total_cycles, 501);
    assert_eq!(loaded.call_graph, report.call_graph);
    let cells: Vec<_> = loaded.flat.iter().map(|row| row.cells.clone()).collect();
    let expected: Vec<_> = report.flat.iter().map(|row| row.cells.clone()).collect();
    assert_eq!(cells, expected);
    assert_eq!(loaded.flat_sort, Column::InclusivePercent);
    assert_eq!(loaded.hot_paths.len(), 2);
}

#[test]
fn test_report_nests_self_nodes() {
    let analysis = sample_analysis();
    let report = to_report(&analysis, "level1.uprof", Vec::new());

    let main = &report.call_graph[0];
    assert_eq!(main.label, "100.00%  Main");
    let kinds: Vec<NodeKind> = main.children.iter().map(|c| c.kind).collect();
    assert!(kinds.iter().any(|kind| matches!(kind, NodeKind::SelfTime(_))));
    assert_eq!(main.node_count(), 3);

    assert_eq!(report.expensive_functions[0].label, "  1002.00 usec  Main");
}

#[test]
fn test_partial_status_serialized() {
    let bytes = TraceWriter::new(1.0).function(4, "Main").enter(4).into_bytes();
    let analysis = analyze_trace(bytes.as_slice(), None, &AnalysisOptions::default(), &mut |_: u8| {});
    let report = to_report(&analysis, "cut.uprof", Vec::new());

    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("nested/report.json");
    write_report(&report, &path).unwrap();

    let loaded = read_report(&path).unwrap();
    assert_eq!(
        loaded.status.parse.error(),
        Some(&ParseError::UnexpectedEndOfStream { offset: 28 })
    );
    assert_eq!(loaded.status.open_calls, 1);
}

#[test]
fn test_read_report_rejects_garbage() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(read_report(&path), Err(OutputError::SerializationFailed(_))));
}

#[test]
fn test_write_svg_to_directory_fails() {
    let temp_dir = tempdir().unwrap();
    assert!(matches!(
        write_svg("<svg/>", temp_dir.path()),
        Err(OutputError::InvalidPath(_))
    ));
}

#[test]
fn test_text_rendering() {
    let analysis = sample_analysis();

    let tree = render_tree(&analysis.call_graph, None);
    assert_eq!(tree, "100.00%  Main\n  79.84%  self\n  20.16%  Update");
    assert_eq!(render_tree(&analysis.call_graph, Some(1)), "100.00%  Main");

    let table = render_flat_table(&analysis.flat);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Function Name"));
    assert!(lines[2].starts_with("Update"));
    assert!(lines[3].starts_with("Main"));
}
