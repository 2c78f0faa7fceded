//! Builds a [`Snapshot`] from a catalog collaborator

use dbcmp_core::{Catalog, ColumnRow, IndexColumnRow, Result, TableRow};

use super::model::{
    Column, Index, IndexAttach, IndexType, MalformedReason, MalformedRow, RowSource, Snapshot,
    Table, TableType,
};

/// Which optional passes run while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Run the index-enumeration pass
    pub include_indexes: bool,
}

impl LoadOptions {
    pub fn with_indexes(mut self) -> Self {
        self.include_indexes = true;
        self
    }
}

/// Populates a snapshot in three passes: tables, columns per table, and
/// (optionally) index memberships.
///
/// A failed catalog call aborts the load. Rows with missing identity fields
/// are skipped, logged at warn and recorded on the snapshot.
pub struct SnapshotLoader<'a> {
    catalog: &'a dyn Catalog,
    options: LoadOptions,
}

impl<'a> SnapshotLoader<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self {
            catalog,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    #[tracing::instrument(skip(self), fields(include_indexes = self.options.include_indexes))]
    pub async fn load(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();

        for row in self.catalog.list_tables().await? {
            match table_from_row(&row) {
                Ok(table) => {
                    let context = table.qualified_name();
                    if !snapshot.insert_table(table) {
                        skip(&mut snapshot, RowSource::Table, MalformedReason::Duplicate, context);
                    }
                }
                Err((reason, context)) => skip(&mut snapshot, RowSource::Table, reason, context),
            }
        }

        let keys: Vec<_> = snapshot.table_keys().cloned().collect();
        for key in keys {
            let rows = self.catalog.list_columns(&key.schema, &key.name).await?;
            for row in rows {
                let outcome = match column_from_row(&row) {
                    Ok(column) => {
                        let name = column.name().to_string();
                        let added = snapshot
                            .find_table_mut(&key.name, &key.schema)
                            .is_some_and(|table| table.add_column(column));
                        if added {
                            Ok(())
                        } else {
                            Err((MalformedReason::Duplicate, format!("{}.[{}]", key, name)))
                        }
                    }
                    Err(reason) => Err((reason, key.to_string())),
                };
                if let Err((reason, context)) = outcome {
                    skip(&mut snapshot, RowSource::Column, reason, context);
                }
            }
        }

        if self.options.include_indexes {
            for row in self.catalog.list_index_columns().await? {
                attach_index_row(&mut snapshot, &row);
            }
        }

        tracing::debug!(
            tables = snapshot.table_count(),
            schemas = snapshot.schema_count(),
            skipped = snapshot.skipped_rows().len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

fn skip(snapshot: &mut Snapshot, source: RowSource, reason: MalformedReason, context: String) {
    let row = MalformedRow {
        source,
        reason,
        context,
    };
    tracing::warn!(row = %row, "skipping malformed catalog row");
    snapshot.record_skipped(row);
}

fn table_from_row(row: &TableRow) -> std::result::Result<Table, (MalformedReason, String)> {
    let context = row.name.clone().unwrap_or_default();
    let Some(schema) = row.schema.as_deref() else {
        return Err((MalformedReason::MissingField("schema"), context));
    };
    let Some(name) = row.name.as_deref() else {
        return Err((MalformedReason::MissingField("name"), format!("in [{}]", schema)));
    };
    let Some(table_type) = row.table_type.as_deref() else {
        return Err((
            MalformedReason::MissingField("table_type"),
            format!("[{}].[{}]", schema, name),
        ));
    };
    Ok(Table::new(name, schema, TableType::from_raw(table_type)))
}

fn column_from_row(row: &ColumnRow) -> std::result::Result<Column, MalformedReason> {
    let name = row.name.as_deref().ok_or(MalformedReason::MissingField("name"))?;
    let data_type = row
        .data_type
        .as_deref()
        .ok_or(MalformedReason::MissingField("data_type"))?;
    Ok(Column::new(name, data_type, row.max_length))
}

fn attach_index_row(snapshot: &mut Snapshot, row: &IndexColumnRow) {
    let context = format!(
        "[{}].[{}].[{}] in {}",
        row.schema.as_deref().unwrap_or("?"),
        row.table_name.as_deref().unwrap_or("?"),
        row.column_name.as_deref().unwrap_or("?"),
        row.index_name.as_deref().unwrap_or("?"),
    );
    let (
        Some(schema),
        Some(table_name),
        Some(column_name),
        Some(index_name),
        Some(index_type),
        Some(ordinal),
    ) = (
        row.schema.as_deref(),
        row.table_name.as_deref(),
        row.column_name.as_deref(),
        row.index_name.as_deref(),
        row.index_type.as_deref(),
        row.ordinal,
    )
    else {
        let field = [
            ("schema", row.schema.is_none()),
            ("table_name", row.table_name.is_none()),
            ("column_name", row.column_name.is_none()),
            ("index_name", row.index_name.is_none()),
            ("index_type", row.index_type.is_none()),
        ]
        .into_iter()
        .find_map(|(field, absent)| absent.then_some(field))
        .unwrap_or("ordinal");
        skip(snapshot, RowSource::IndexColumn, MalformedReason::MissingField(field), context);
        return;
    };

    let Ok(ordinal_u32) = u32::try_from(ordinal) else {
        skip(snapshot, RowSource::IndexColumn, MalformedReason::InvalidOrdinal(ordinal), context);
        return;
    };

    let index = Index::new(index_name, IndexType::from_tag(index_type), ordinal_u32);
    match snapshot.attach_index(schema, table_name, column_name, index) {
        IndexAttach::Attached => {}
        IndexAttach::Duplicate => {
            tracing::debug!(row = %context, "duplicate index membership ignored");
        }
        IndexAttach::UnknownTable | IndexAttach::UnknownColumn => {
            tracing::debug!(row = %context, "index row references unknown table or column");
        }
    }
}
