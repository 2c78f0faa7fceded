//! Tests for report sinks

use chrono::{Local, TimeZone};
use pretty_assertions::assert_eq;

use super::*;
use crate::compare::{CompareConfig, SchemaComparator};
use crate::test_support::{column, indexed_column, snapshot, table};

fn sample_diff(check_indexes: bool) -> SchemaDiff {
    let source = snapshot(vec![
        table("dbo", "Audit", vec![column("Id", "int", None)]),
        table(
            "dbo",
            "Users",
            vec![
                indexed_column("Id", "int", &[("PK_Users", 1, "CLUSTERED")]),
                column("Name", "nvarchar", Some(100)),
            ],
        ),
    ]);
    let target = snapshot(vec![table(
        "dbo",
        "Users",
        vec![column("Id", "int", None), column("Name", "nvarchar", Some(50))],
    )]);
    let config = if check_indexes {
        CompareConfig::new().with_indexes()
    } else {
        CompareConfig::new()
    };
    SchemaComparator::with_config(config).compare(&source, &target)
}

fn fixed_time() -> chrono::DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
        .single()
        .unwrap()
}

#[test]
fn test_report_stem_format() {
    assert_eq!(report_stem(fixed_time()), "report_2024-03-09 14_05_07");
}

#[test]
fn test_csv_report_writes_report_and_statistics() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvReport::new(dir.path()).with_timestamp(fixed_time());

    let written = sink.write(&sample_diff(false)).unwrap();

    let out = dir.path().join("report_2024-03-09 14_05_07");
    assert_eq!(written, vec![out.join("report.csv"), out.join("statistics.csv")]);

    let report = std::fs::read_to_string(out.join("report.csv")).unwrap();
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(
        lines[0],
        "SourceSchema,TargetSchema,SourceTableName,TargetTableName,SourceColumnName,TargetColumnName,\
         SourceDataType,TargetDataType,SourceLength,TargetLength,SourceIndex,TargetIndex,Change"
    );
    assert_eq!(lines[1], "dbo,,Audit,,Id,,INT,,,,,,Yes");
    assert_eq!(lines[2], "dbo,dbo,Users,Users,Id,Id,INT,INT,,,,,No");
    assert_eq!(lines[3], "dbo,dbo,Users,Users,Name,Name,NVARCHAR,NVARCHAR,100,50,,,Yes");

    let statistics = std::fs::read_to_string(out.join("statistics.csv")).unwrap();
    let lines: Vec<_> = statistics.lines().collect();
    assert_eq!(
        lines[0],
        "SourceSchema,TargetSchema,SourceTableName,TargetTableName,SourceColumnCount,TargetColumnCount,Change"
    );
    assert_eq!(lines[1], "dbo,,Audit,,1,,Yes");
    assert_eq!(lines[2], "dbo,dbo,Users,Users,2,2,No");
}

#[test]
fn test_csv_report_adds_index_sheet_when_checked() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvReport::new(dir.path()).with_timestamp(fixed_time());

    let written = sink.write(&sample_diff(true)).unwrap();

    assert_eq!(written.len(), 3);
    let index = std::fs::read_to_string(sink.output_dir().join("index.csv")).unwrap();
    let lines: Vec<_> = index.lines().collect();
    assert_eq!(
        lines[0],
        "Schema,TableName,SourceColumnName,TargetColumnName,SourceIndex,TargetIndex,IndexType,Ordinal,Include,Highlight,Change"
    );
    assert_eq!(
        lines[1],
        "dbo,Users,Id,Id,PK_Users,MISSING/INVALID IN TARGET,CLUSTERED,1,No,clustered,Yes"
    );
}

#[test]
fn test_json_report_round_trips_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonReport::new(dir.path()).with_timestamp(fixed_time());

    let written = sink.write(&sample_diff(true)).unwrap();

    assert_eq!(written, vec![dir.path().join("report_2024-03-09 14_05_07.json")]);
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(value["check_indexes"], serde_json::json!(true));
    assert_eq!(value["tables"][0]["status"], serde_json::json!("MissingOnTarget"));
    let change = &value["tables"][1]["changes"][0];
    assert_eq!(change["kind"], serde_json::json!("MaxLengthChanged"));
    assert_eq!(change["column"], serde_json::json!("Name"));
    assert_eq!(change["source"], serde_json::json!(100));
    assert_eq!(change["target"], serde_json::json!(50));
    assert_eq!(value["statistics"]["source_table_count"], serde_json::json!(2));
}
