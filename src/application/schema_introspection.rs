//! Schema introspection over a SQL engine.
//!
//! Produces the table definitions handed to the model and a short description
//! of which tables share columns.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::ports::{SqlEngine, SqlEngineError};

/// Two tables sharing at least one column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRelation {
    /// Lexicographically smaller table name.
    pub left: String,
    pub right: String,
    /// Shared column names, sorted.
    pub shared_columns: Vec<String>,
}

/// Reads table metadata through `SHOW TABLES` and `DESCRIBE`.
pub struct SchemaIntrospector {
    engine: Arc<dyn SqlEngine>,
}

impl SchemaIntrospector {
    pub fn new(engine: Arc<dyn SqlEngine>) -> Self {
        Self { engine }
    }

    /// Lists the tables of the current schema.
    pub async fn table_names(&self) -> Result<Vec<String>, SqlEngineError> {
        let tables = self.engine.execute("SHOW TABLES").await?.first_column();
        tracing::debug!(count = tables.len(), "Tables found");
        Ok(tables)
    }

    /// Returns `(column, type)` pairs of `table`, lower-cased.
    async fn columns(&self, table: &str) -> Result<Vec<(String, String)>, SqlEngineError> {
        let result = self.engine.execute(&format!("DESCRIBE {}", table)).await?;
        result
            .rows
            .iter()
            .map(|row| match (row.first(), row.get(1)) {
                (Some(Value::String(name)), Some(Value::String(kind))) => {
                    Ok((name.to_lowercase(), kind.to_lowercase()))
                }
                _ => Err(SqlEngineError::Protocol(format!(
                    "unexpected DESCRIBE row for {}: {:?}",
                    table, row
                ))),
            })
            .collect()
    }

    /// Returns `{"TABLE": {"column": "type", ...}}` for `table`.
    pub async fn table_definition(&self, table: &str) -> Result<Value, SqlEngineError> {
        let columns: Map<String, Value> = self
            .columns(table)
            .await?
            .into_iter()
            .map(|(name, kind)| (name, Value::String(kind)))
            .collect();

        let mut definition = Map::new();
        definition.insert(table.to_uppercase(), Value::Object(columns));
        Ok(Value::Object(definition))
    }

    /// Renders every table definition, separated by blank lines.
    pub async fn table_definitions_for_prompt(&self) -> Result<String, SqlEngineError> {
        let mut blocks = Vec::new();
        for table in self.table_names().await? {
            blocks.push(self.table_definition(&table).await?.to_string());
        }
        Ok(blocks.join("\n\n"))
    }

    /// Finds every pair of tables that share a column name.
    pub async fn related_tables(&self) -> Result<Vec<TableRelation>, SqlEngineError> {
        let mut columns_by_table: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for table in self.table_names().await? {
            let columns = self.columns(&table).await?.into_iter().map(|(name, _)| name);
            columns_by_table.insert(table, columns.collect());
        }
        Ok(relate(&columns_by_table))
    }

    /// Describes related tables, one pair per line.
    pub async fn schema_description(&self) -> Result<String, SqlEngineError> {
        let lines: Vec<String> = self
            .related_tables()
            .await?
            .into_iter()
            .map(|r| {
                format!(
                    "{} and {} share columns: {}",
                    r.left,
                    r.right,
                    r.shared_columns.join(", ")
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

fn relate(columns_by_table: &BTreeMap<String, BTreeSet<String>>) -> Vec<TableRelation> {
    let mut relations = Vec::new();
    for (left, left_columns) in columns_by_table {
        for (right, right_columns) in columns_by_table.range::<String, _>((
            std::ops::Bound::Excluded(left.clone()),
            std::ops::Bound::Unbounded,
        )) {
            let shared: Vec<String> = left_columns.intersection(right_columns).cloned().collect();
            if !shared.is_empty() {
                relations.push(TableRelation {
                    left: left.clone(),
                    right: right.clone(),
                    shared_columns: shared,
                });
            }
        }
    }
    relations
}
