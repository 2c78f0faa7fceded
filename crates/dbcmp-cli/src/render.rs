//! Console rendering of a comparison

use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL_CONDENSED};
use dbcmp_schema_tools::{SchemaDiff, SchemaStatistics};

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold))
        .collect()
}

/// Table and schema counts for both sides
pub fn summary_table(stats: &SchemaStatistics) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["", "Source", "Target"]));
    table.add_row(vec![
        Cell::new("Tables"),
        Cell::new(stats.source_table_count),
        Cell::new(stats.target_table_count),
    ]);
    table.add_row(vec![
        Cell::new("Schemas"),
        Cell::new(stats.source_schema_count),
        Cell::new(stats.target_schema_count),
    ]);
    table
}

/// Per-table column counts; tables whose count differs are highlighted
pub fn column_count_table(stats: &SchemaStatistics) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header(&["Schema", "Table", "Source Columns", "Target Columns", "Change"]));

    for entry in &stats.tables {
        let target = entry
            .target_column_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "missing".to_string());
        let change = if entry.column_count_changed {
            Cell::new("Yes").fg(Color::Red)
        } else {
            Cell::new("No")
        };
        table.add_row(vec![
            Cell::new(&entry.source_schema),
            Cell::new(&entry.source_table),
            Cell::new(entry.source_column_count),
            Cell::new(target),
            change,
        ]);
    }
    table
}

/// The full console output: both statistics tables followed by the change log
pub fn render(diff: &SchemaDiff) -> String {
    let mut out = String::new();
    out.push_str(&summary_table(&diff.statistics).to_string());
    out.push('\n');
    if !diff.statistics.tables.is_empty() {
        out.push_str(&column_count_table(&diff.statistics).to_string());
        out.push('\n');
    }
    out.push('\n');
    for line in diff.change_log() {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
