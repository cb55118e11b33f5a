// driftwatch-core/src/infrastructure/adapters/duckdb.rs

// Reads CSV and Parquet objects through DuckDB's type inference and maps each column onto
// the domain kinds. One in-memory connection per load.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{Config, Connection};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

use crate::domain::dataset::{Column, ColumnKind, ColumnValues, Dataset};
use crate::domain::trigger::DatasetLocation;
use crate::error::DriftwatchError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::loader::DatasetLoader;

/// Column name and DuckDB type as reported by `DESCRIBE`.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
}

impl ColumnSchema {
    pub fn kind(&self) -> ColumnKind {
        classify(&self.data_type)
    }
}

/// Sources are directories under `root`, keys are relative paths inside them.
pub struct DuckDbLoader {
    root: PathBuf,
}

impl DuckDbLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a location to a file path, refusing anything that escapes `root`.
    pub fn resolve(&self, location: &DatasetLocation) -> Result<PathBuf, DriftwatchError> {
        for part in [&location.source, &location.key] {
            let candidate = Path::new(part);
            let safe = !part.is_empty()
                && candidate
                    .components()
                    .all(|c| matches!(c, Component::Normal(_)));
            if !safe {
                return Err(DriftwatchError::UnsafePath(location.to_string()));
            }
        }
        Ok(self.root.join(&location.source).join(&location.key))
    }

    /// Loads a CSV or Parquet file straight from disk.
    pub fn load_path(path: &Path) -> Result<Dataset, DriftwatchError> {
        let label = path.display().to_string();
        if !path.is_file() {
            return Err(InfrastructureError::NotFound(label).into());
        }

        let conn = Connection::open_in_memory_with_flags(Config::default())
            .map_err(InfrastructureError::from)?;
        let relation = relation_for(path);

        let schema = describe(&conn, &relation).map_err(|e| parse_error(&label, e))?;
        if schema.is_empty() {
            return Err(parse_error(&label, "no columns found"));
        }
        debug!(file = %label, columns = schema.len(), "Sniffed dataset schema");

        let columns = read_columns(&conn, &relation, &schema).map_err(|e| parse_error(&label, e))?;
        Ok(Dataset::new(columns)?)
    }

    /// Schema of a dataset file without loading its rows.
    pub fn inspect_path(path: &Path) -> Result<Vec<ColumnSchema>, DriftwatchError> {
        let label = path.display().to_string();
        if !path.is_file() {
            return Err(InfrastructureError::NotFound(label).into());
        }
        let conn = Connection::open_in_memory_with_flags(Config::default())
            .map_err(InfrastructureError::from)?;
        describe(&conn, &relation_for(path)).map_err(|e| parse_error(&label, e))
    }
}

#[async_trait]
impl DatasetLoader for DuckDbLoader {
    #[instrument(skip(self), fields(location = %location))]
    async fn load(&self, location: &DatasetLocation) -> Result<Dataset, DriftwatchError> {
        let path = self.resolve(location)?;
        // DuckDB and file reads block; keep them off the async workers
        let loaded = tokio::task::spawn_blocking(move || Self::load_path(&path))
            .await
            .map_err(|e| DriftwatchError::InternalError(format!("loader task failed: {}", e)))?;
        match loaded {
            // Report the logical address, not the local path
            Err(DriftwatchError::Infrastructure(InfrastructureError::NotFound(_))) => {
                Err(InfrastructureError::NotFound(location.to_string()).into())
            }
            other => other,
        }
    }
}

fn parse_error(location: &str, reason: impl ToString) -> DriftwatchError {
    InfrastructureError::ParseError {
        location: location.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Table function reading `path`: Parquet by extension, CSV otherwise.
pub fn relation_for(path: &Path) -> String {
    let literal = path.display().to_string().replace('\'', "''");
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        format!("read_parquet('{}')", literal)
    } else {
        format!("read_csv_auto('{}')", literal)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn describe(conn: &Connection, relation: &str) -> Result<Vec<ColumnSchema>, duckdb::Error> {
    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {}", relation))?;
    let rows = stmt.query_map([], |row| {
        Ok(ColumnSchema {
            name: row.get("column_name")?,
            data_type: row.get("column_type")?,
        })
    })?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

/// DuckDB type name to domain kind. Booleans and anything unknown are
/// treated as categories.
pub fn classify(data_type: &str) -> ColumnKind {
    let upper = data_type.to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    match base {
        "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "HUGEINT" | "UTINYINT" | "USMALLINT"
        | "UINTEGER" | "UBIGINT" | "UHUGEINT" | "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL"
        | "NUMERIC" => ColumnKind::Numeric,
        "DATE" | "TIMESTAMP" | "DATETIME" | "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ"
        | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => ColumnKind::Datetime,
        _ => ColumnKind::Categorical,
    }
}

fn read_columns(
    conn: &Connection,
    relation: &str,
    schema: &[ColumnSchema],
) -> Result<Vec<Column>, duckdb::Error> {
    let projections: Vec<String> = schema
        .iter()
        .map(|col| {
            let ident = quote_ident(&col.name);
            match col.kind() {
                ColumnKind::Numeric => format!("CAST({} AS DOUBLE)", ident),
                ColumnKind::Datetime => format!("epoch_us(CAST({} AS TIMESTAMP))", ident),
                ColumnKind::Categorical => format!("CAST({} AS VARCHAR)", ident),
            }
        })
        .collect();

    let mut buffers: Vec<ColumnValues> = schema
        .iter()
        .map(|col| match col.kind() {
            ColumnKind::Numeric => ColumnValues::Numeric(Vec::new()),
            ColumnKind::Datetime => ColumnValues::Datetime(Vec::new()),
            ColumnKind::Categorical => ColumnValues::Categorical(Vec::new()),
        })
        .collect();

    let sql = format!("SELECT {} FROM {}", projections.join(", "), relation);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        for (idx, buffer) in buffers.iter_mut().enumerate() {
            match buffer {
                ColumnValues::Numeric(values) => values.push(row.get::<_, Option<f64>>(idx)?),
                ColumnValues::Datetime(values) => values.push(
                    row.get::<_, Option<i64>>(idx)?
                        .and_then(DateTime::<Utc>::from_timestamp_micros),
                ),
                ColumnValues::Categorical(values) => {
                    values.push(row.get::<_, Option<String>>(idx)?)
                }
            }
        }
    }

    Ok(schema
        .iter()
        .zip(buffers)
        .map(|(col, values)| Column::new(col.name.clone(), values))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_classify_types() {
        assert_eq!(classify("BIGINT"), ColumnKind::Numeric);
        assert_eq!(classify("DECIMAL(18,3)"), ColumnKind::Numeric);
        assert_eq!(classify("DATE"), ColumnKind::Datetime);
        assert_eq!(classify("TIMESTAMP WITH TIME ZONE"), ColumnKind::Datetime);
        assert_eq!(classify("VARCHAR"), ColumnKind::Categorical);
        assert_eq!(classify("BOOLEAN"), ColumnKind::Categorical);
    }

    #[tokio::test]
    async fn test_load_typed_columns() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("cur"))?;
        fs::write(
            dir.path().join("cur/batch.csv"),
            "age,city,signup\n25,Paris,2024-01-01\n31,Lyon,2024-01-02\n,Paris,2024-01-03\n",
        )?;

        let loader = DuckDbLoader::new(dir.path());
        let ds = loader.load(&DatasetLocation::new("cur", "batch.csv")).await?;

        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["age", "city", "signup"]);
        assert_eq!(ds.column("age").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(ds.column("age").unwrap().values().null_count(), 1);
        assert_eq!(ds.column("city").unwrap().kind(), ColumnKind::Categorical);
        assert_eq!(ds.column("signup").unwrap().kind(), ColumnKind::Datetime);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_loads() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("cur"))?;
        for i in 0..4 {
            fs::write(
                dir.path().join(format!("cur/part-{i}.csv")),
                format!("n,label\n{i},a\n{},b\n", i + 1),
            )?;
        }

        let loader = DuckDbLoader::new(dir.path());
        let locations: Vec<_> = (0..4)
            .map(|i| DatasetLocation::new("cur", format!("part-{i}.csv")))
            .collect();
        let datasets =
            futures::future::try_join_all(locations.iter().map(|loc| loader.load(loc))).await?;

        assert_eq!(datasets.len(), 4);
        for ds in &datasets {
            assert_eq!(ds.row_count(), 2);
            assert_eq!(ds.column("n").unwrap().kind(), ColumnKind::Numeric);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let loader = DuckDbLoader::new(dir.path());
        let err = loader
            .load(&DatasetLocation::new("cur", "absent.csv"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DriftwatchError::Infrastructure(InfrastructureError::NotFound(ref loc)) if loc == "cur/absent.csv"
        ));
        Ok(())
    }

    #[test]
    fn test_rejects_path_traversal() {
        let loader = DuckDbLoader::new("/data");
        for (source, key) in [("cur", "../secret.csv"), ("..", "a.csv"), ("cur", "/etc/passwd"), ("", "a.csv")] {
            let res = loader.resolve(&DatasetLocation::new(source, key));
            assert!(matches!(res, Err(DriftwatchError::UnsafePath(_))), "{source}/{key}");
        }
        assert!(loader.resolve(&DatasetLocation::new("cur", "2024/05/a.csv")).is_ok());
    }

    #[test]
    fn test_inspect_schema() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ref.csv");
        fs::write(&path, "score,label\n1.5,a\n2.5,b\n")?;

        let schema = DuckDbLoader::inspect_path(&path)?;
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].kind(), ColumnKind::Numeric);
        assert_eq!(schema[1].kind(), ColumnKind::Categorical);
        Ok(())
    }
}
