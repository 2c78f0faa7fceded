//! Tests for snapshot model and loading

use dbcmp_core::{ColumnRow, IndexColumnRow, TableRow};
use super::*;
use crate::test_support::{FailOn, StaticCatalog, column, indexed_column, table};

#[cfg(test)]
mod index_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_identity_uses_name_ordinal_and_type() {
        let a = Index::new("IX_Email", IndexType::NonClustered, 1);
        assert_eq!(a, Index::new("IX_Email", IndexType::NonClustered, 1));
        assert_ne!(a, Index::new("IX_Email", IndexType::Clustered, 1));
        assert_ne!(a, Index::new("IX_Email", IndexType::NonClustered, 2));
        assert_ne!(a, Index::new("IX_Mail", IndexType::NonClustered, 1));
    }

    #[test]
    fn test_ordinal_zero_is_include() {
        assert!(Index::new("IX_Cover", IndexType::NonClustered, 0).is_include());
        assert!(!Index::new("IX_Cover", IndexType::NonClustered, 1).is_include());
    }

    #[test]
    fn test_index_type_tags_are_exact() {
        assert_eq!(IndexType::from_tag("CLUSTERED"), IndexType::Clustered);
        assert_eq!(IndexType::from_tag("NONCLUSTERED"), IndexType::NonClustered);
        assert_eq!(
            IndexType::from_tag("clustered"),
            IndexType::Other("clustered".into())
        );
        assert_eq!(IndexType::from_tag("HEAP").highlight(), IndexHighlight::Neutral);
        assert_eq!(IndexType::Clustered.highlight(), IndexHighlight::Clustered);
    }

    #[test]
    fn test_formatted_index() {
        let index = Index::new("PK_Users", IndexType::Clustered, 1);
        assert_eq!(index.formatted(), "PK_Users - CLUSTERED");
    }
}

#[cfg(test)]
mod column_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_equality_ignores_indexes() {
        let plain = column("Email", "nvarchar", None);
        let indexed = indexed_column("Email", "nvarchar", &[("IX_Email", 1, "NONCLUSTERED")]);
        assert_eq!(plain, indexed);
        assert_ne!(plain, column("Email", "varchar", None));
        assert_ne!(plain, column("Email", "nvarchar", Some(256)));
    }

    #[test]
    fn test_add_index_rejects_duplicates() {
        let mut col = column("Id", "int", None);
        assert!(col.add_index(Index::new("PK", IndexType::Clustered, 1)));
        assert!(!col.add_index(Index::new("PK", IndexType::Clustered, 1)));
        assert!(col.add_index(Index::new("PK", IndexType::Clustered, 2)));
        assert_eq!(col.indexes().len(), 2);
    }

    #[test]
    fn test_index_subset_rule_is_one_directional() {
        let a = indexed_column("Id", "int", &[("X", 1, "CLUSTERED")]);
        let b = indexed_column("Id", "int", &[("X", 1, "CLUSTERED"), ("Y", 1, "NONCLUSTERED")]);
        assert!(a.is_index_same(&b));
        assert!(!b.is_index_same(&a));
    }

    #[test]
    fn test_missing_indexes_in_absent_column_returns_all() {
        let a = indexed_column("Id", "int", &[("X", 1, "CLUSTERED"), ("Y", 2, "NONCLUSTERED")]);
        assert_eq!(a.missing_indexes_in(None).len(), 2);
        let b = indexed_column("Id", "int", &[("X", 1, "CLUSTERED")]);
        assert_eq!(
            a.missing_indexes_in(Some(&b)),
            vec![Index::new("Y", IndexType::NonClustered, 2)]
        );
    }

    #[test]
    fn test_formatted_indexes_joins_names() {
        let a = indexed_column("Id", "int", &[("PK", 1, "CLUSTERED"), ("IX_A", 2, "NONCLUSTERED")]);
        assert_eq!(a.formatted_indexes(), "PK, IX_A");
        assert_eq!(column("Id", "int", None).formatted_indexes(), "");
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_column_keeps_first() {
        let mut t = table("dbo", "Users", vec![column("Id", "int", None)]);
        assert!(!t.add_column(column("Id", "bigint", None)));
        assert_eq!(t.find_column("Id").map(Column::data_type), Some("int"));
        assert_eq!(t.column_count(), 1);
    }

    #[test]
    fn test_type_display_and_qualified_name() {
        let t = table("dbo", "Users", vec![]);
        assert_eq!(t.type_display(), "Table");
        assert_eq!(t.qualified_name(), "[dbo].[Users]");
        let v = Table::new("ActiveUsers", "dbo", TableType::from_raw("VIEW"));
        assert_eq!(v.type_display(), "VIEW");
    }

    #[test]
    fn test_table_equality_covers_column_set() {
        let a = table("dbo", "Users", vec![column("Id", "int", None), column("Name", "nvarchar", Some(100))]);
        let b = table("dbo", "Users", vec![column("Name", "nvarchar", Some(100)), column("Id", "int", None)]);
        let c = table("dbo", "Users", vec![column("Id", "int", None)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_is_indexing_same_requires_every_source_column() {
        let a = table("dbo", "Users", vec![indexed_column("Id", "int", &[("PK", 1, "CLUSTERED")])]);
        let b = table("dbo", "Users", vec![indexed_column("Id", "int", &[("PK", 1, "CLUSTERED")])]);
        let c = table("dbo", "Users", vec![column("Id", "int", None)]);
        assert!(a.is_indexing_same(&b));
        assert!(!a.is_indexing_same(&c));
        assert!(c.is_indexing_same(&a));
    }
}

#[cfg(test)]
mod snapshot_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tables_iterate_by_schema_then_name() {
        let mut snapshot = Snapshot::new();
        snapshot.insert_table(table("sales", "Orders", vec![]));
        snapshot.insert_table(table("dbo", "Users", vec![]));
        snapshot.insert_table(table("dbo", "Audit", vec![]));
        let names: Vec<_> = snapshot.tables().map(Table::qualified_name).collect();
        assert_eq!(names, vec!["[dbo].[Audit]", "[dbo].[Users]", "[sales].[Orders]"]);
        assert_eq!(snapshot.schema_count(), 2);
        assert_eq!(snapshot.table_count(), 3);
    }

    #[test]
    fn test_same_name_in_different_schemas_are_distinct() {
        let mut snapshot = Snapshot::new();
        assert!(snapshot.insert_table(table("dbo", "Users", vec![])));
        assert!(snapshot.insert_table(table("hr", "Users", vec![])));
        assert!(!snapshot.insert_table(table("dbo", "Users", vec![])));
        assert!(snapshot.find_table("Users", "hr").is_some());
        assert!(snapshot.find_table("Users", "sales").is_none());
    }

    #[test]
    fn test_attach_index_outcomes() {
        let mut snapshot = Snapshot::new();
        snapshot.insert_table(table("dbo", "Users", vec![column("Id", "int", None)]));
        let pk = Index::new("PK", IndexType::Clustered, 1);

        assert_eq!(snapshot.attach_index("dbo", "Users", "Id", pk.clone()), IndexAttach::Attached);
        assert_eq!(snapshot.attach_index("dbo", "Users", "Id", pk.clone()), IndexAttach::Duplicate);
        assert_eq!(snapshot.attach_index("dbo", "Nope", "Id", pk.clone()), IndexAttach::UnknownTable);
        assert_eq!(snapshot.attach_index("dbo", "Users", "Nope", pk), IndexAttach::UnknownColumn);

        let users = snapshot.find_table("Users", "dbo");
        assert_eq!(users.map(|t| t.indexes().len()), Some(1));
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users_catalog() -> StaticCatalog {
        StaticCatalog::new()
            .table(
                "dbo",
                "Users",
                vec![
                    ColumnRow::new("Id", "int", None),
                    ColumnRow::new("Email", "nvarchar", Some(256)),
                ],
            )
            .index(IndexColumnRow::new("dbo", "Users", "Id", "PK_Users", "CLUSTERED", 1))
            .index(IndexColumnRow::new("dbo", "Users", "Email", "IX_Email", "NONCLUSTERED", 1))
    }

    #[tokio::test]
    async fn test_load_builds_tables_and_columns() {
        let catalog = users_catalog();
        let snapshot = SnapshotLoader::new(&catalog).load().await.unwrap();

        let users = snapshot.find_table("Users", "dbo").unwrap();
        let names: Vec<_> = users.columns().map(Column::name).collect();
        assert_eq!(names, vec!["Id", "Email"]);
        assert_eq!(users.find_column("Email").and_then(Column::max_length), Some(256));
        assert!(snapshot.skipped_rows().is_empty());
    }

    #[tokio::test]
    async fn test_index_pass_only_runs_when_requested() {
        let catalog = users_catalog();

        let without = SnapshotLoader::new(&catalog).load().await.unwrap();
        let id = without.find_table("Users", "dbo").and_then(|t| t.find_column("Id")).unwrap();
        assert!(id.indexes().is_empty());

        let with = SnapshotLoader::new(&catalog)
            .with_options(LoadOptions::default().with_indexes())
            .load()
            .await
            .unwrap();
        let id = with.find_table("Users", "dbo").and_then(|t| t.find_column("Id")).unwrap();
        assert_eq!(id.indexes(), &[Index::new("PK_Users", IndexType::Clustered, 1)]);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped_not_fatal() {
        let mut catalog = users_catalog();
        catalog.tables.push(TableRow {
            schema: Some("dbo".into()),
            name: None,
            table_type: Some("BASE TABLE".into()),
        });
        catalog.tables.push(TableRow {
            schema: Some("dbo".into()),
            name: Some("Broken".into()),
            table_type: None,
        });
        if let Some(columns) = catalog.columns.get_mut(&("dbo".into(), "Users".into())) {
            columns.push(ColumnRow {
                name: Some("Ghost".into()),
                data_type: None,
                max_length: None,
            });
        }
        catalog.index_columns.push(IndexColumnRow {
            ordinal: None,
            ..IndexColumnRow::new("dbo", "Users", "Id", "IX_Bad", "NONCLUSTERED", 0)
        });
        catalog
            .index_columns
            .push(IndexColumnRow::new("dbo", "Users", "Id", "IX_Neg", "NONCLUSTERED", -1));

        let snapshot = SnapshotLoader::new(&catalog)
            .with_options(LoadOptions::default().with_indexes())
            .load()
            .await
            .unwrap();

        assert_eq!(snapshot.table_count(), 1);
        let users = snapshot.find_table("Users", "dbo").unwrap();
        assert_eq!(users.column_count(), 2);
        assert!(users.columns().all(|c| !c.name().is_empty() && !c.data_type().is_empty()));

        let reasons: Vec<_> = snapshot.skipped_rows().iter().map(|r| r.reason.clone()).collect();
        assert_eq!(
            reasons,
            vec![
                MalformedReason::MissingField("name"),
                MalformedReason::MissingField("table_type"),
                MalformedReason::MissingField("data_type"),
                MalformedReason::MissingField("ordinal"),
                MalformedReason::InvalidOrdinal(-1),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_rows_keep_first() {
        let mut catalog = users_catalog();
        catalog.tables.push(TableRow::new("dbo", "Users", "VIEW"));
        if let Some(columns) = catalog.columns.get_mut(&("dbo".into(), "Users".into())) {
            columns.push(ColumnRow::new("Id", "bigint", None));
        }

        let snapshot = SnapshotLoader::new(&catalog).load().await.unwrap();
        let users = snapshot.find_table("Users", "dbo").unwrap();
        assert_eq!(users.type_display(), "Table");
        assert_eq!(users.find_column("Id").map(Column::data_type), Some("int"));
        assert_eq!(snapshot.skipped_rows().len(), 2);
        assert!(snapshot
            .skipped_rows()
            .iter()
            .all(|r| r.reason == MalformedReason::Duplicate));
    }

    #[tokio::test]
    async fn test_unknown_index_references_are_dropped() {
        let catalog = users_catalog()
            .index(IndexColumnRow::new("dbo", "Missing", "Id", "PK_Missing", "CLUSTERED", 1))
            .index(IndexColumnRow::new("dbo", "Users", "Nope", "IX_Nope", "NONCLUSTERED", 1));

        let snapshot = SnapshotLoader::new(&catalog)
            .with_options(LoadOptions::default().with_indexes())
            .load()
            .await
            .unwrap();

        assert_eq!(snapshot.table_count(), 1);
        assert!(snapshot.skipped_rows().is_empty());
        let users = snapshot.find_table("Users", "dbo").unwrap();
        assert_eq!(users.indexes().len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_fatal() {
        for fail_on in [FailOn::ListTables, FailOn::ListColumns, FailOn::ListIndexColumns] {
            let catalog = users_catalog().failing(fail_on);
            let result = SnapshotLoader::new(&catalog)
                .with_options(LoadOptions::default().with_indexes())
                .load()
                .await;
            assert!(result.is_err_and(|e| e.is_catalog()), "{:?}", fail_on);
        }
    }
}
