use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, Table};

use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format, print_block};

use super::part::{Segment, SegmentRow};

pub fn render_segment_table(segments: &[Segment]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_header(vec!["Name", "Start", "End", "Length"]);

    for row in segments.iter().map(Segment::row) {
        table.add_row(vec![
            Cell::new(row.name),
            Cell::new(row.start).set_alignment(CellAlignment::Right),
            Cell::new(row.end).set_alignment(CellAlignment::Right),
            Cell::new(row.length).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

/// Show the plan for one project: a table in text mode, a single event with
/// the rows attached in JSON mode.
pub fn emit_segment_report(project: &str, segments: &[Segment]) {
    match get_output_format() {
        OutputFormat::Text => {
            emit(
                Level::Info,
                "split.plan.report",
                &format!("Planned {} segment(s) for {project}", segments.len()),
                None,
            );
            print_block(&render_segment_table(segments));
        }
        OutputFormat::Json => {
            let rows: Vec<SegmentRow> = segments.iter().map(Segment::row).collect();
            emit(
                Level::Info,
                "split.plan.report",
                &format!("Planned {} segment(s) for {project}", segments.len()),
                Some(serde_json::json!({ "project": project, "segments": rows })),
            );
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ReportLine {
    pub(crate) level: Level,
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl ReportLine {
    pub(crate) fn new(level: Level, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            code,
            message: message.into(),
        }
    }
}

pub(crate) fn emit_report(lines: &[ReportLine]) {
    for line in lines {
        emit(line.level, line.code, &line.message, None);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn table_lists_every_segment_with_length() {
        let segments = vec![
            Segment::new("intro_part1", Duration::ZERO, Duration::from_secs(600)),
            Segment::new("intro_part2", Duration::from_secs(595), Duration::from_secs(1500)),
        ];
        let table = render_segment_table(&segments);

        for expected in [
            "Name",
            "Length",
            "intro_part1",
            "intro_part2",
            "0:09:55.000",
            "0:25:00.000",
            "0:15:05.000",
        ] {
            assert!(table.contains(expected), "missing {expected} in\n{table}");
        }
    }
}
