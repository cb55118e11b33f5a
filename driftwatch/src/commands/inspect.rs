// driftwatch/src/commands/inspect.rs
//
// USE CASE: Inspect a dataset file (schema, inferred kinds, sample rows).

use comfy_table::Table;
use duckdb::Connection;
use duckdb::types::ValueRef;
use std::path::PathBuf;

use anyhow::Context;
use driftwatch_core::infrastructure::adapters::DuckDbLoader;
use driftwatch_core::infrastructure::adapters::duckdb::relation_for;

pub fn execute(file: PathBuf, limit: usize) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("❌ Dataset not found at: {}", file.display());
    }

    let schema = DuckDbLoader::inspect_path(&file)
        .with_context(|| format!("Failed to read schema of {}", file.display()))?;

    println!("\n🔍 Inspecting: '{}'", file.display());

    let mut columns = Table::new();
    columns.set_header(vec!["Column", "DuckDB type", "Drift kind"]);
    for col in &schema {
        columns.add_row(vec![
            col.name.clone(),
            col.data_type.clone(),
            col.kind().to_string(),
        ]);
    }
    println!("{columns}");

    println!("   --- Rows (Limit {}) ---", limit);
    let conn = Connection::open_in_memory()?;
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} LIMIT {}",
        relation_for(&file),
        limit
    ))?;
    let mut rows = stmt.query([])?;

    let mut sample = Table::new();
    sample.set_header(schema.iter().map(|c| c.name.clone()).collect::<Vec<_>>());
    while let Some(row) = rows.next()? {
        let values: Vec<String> = (0..schema.len())
            .map(|i| match row.get_ref(i) {
                Ok(ValueRef::Null) => "NULL".to_string(),
                Ok(ValueRef::Text(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
                Ok(val) => format!("{:?}", val),
                Err(_) => "ERROR".to_string(),
            })
            .collect();
        sample.add_row(values);
    }
    println!("{sample}");

    Ok(())
}
