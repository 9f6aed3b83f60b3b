//! The `import` subcommand: read a JSON rows file and run the bulk importer.

use std::path::Path;

use anyhow::Context;
use mattdb_core::ImportRow;
use sqlx::PgPool;

/// Reads `file` as a JSON array of import rows and loads them.
///
/// Skipped rows are reported only through the aggregate count, matching the
/// HTTP endpoint's contract; per-row details go to the logs.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not a JSON array of
/// row objects, or when the file contains no rows.
pub async fn run(pool: &PgPool, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading rows file {}", file.display()))?;
    let rows: Vec<ImportRow> =
        serde_json::from_str(&raw).context("rows file must be a JSON array of row objects")?;

    if rows.is_empty() {
        anyhow::bail!("no rows in {}", file.display());
    }

    tracing::info!(rows = rows.len(), file = %file.display(), "starting import");
    let outcome = mattdb_db::run_import(pool, &rows).await;
    println!("inserted {} of {} rows", outcome.inserted, rows.len());

    Ok(())
}
