use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "blob_store",
    sql: include_str!("migrations/001_initial.sql"),
}];

/// Bring the blob store schema up to date. Safe to call on every start.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = applied_versions(conn)?;
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(m.version)) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn applied_versions(conn: &Connection) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(versions)
}

/// Run one migration and record it in the same transaction.
fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!("Migrating blob store to {} ({})", migration.version, migration.name);

    let tx = conn
        .unchecked_transaction()
        .context("Failed to start migration transaction")?;
    tx.execute_batch(migration.sql)
        .with_context(|| format!("Migration {} failed", migration.version))?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (migration.version, migration.name, Utc::now().to_rfc3339()),
    )?;
    tx.commit()?;
    Ok(())
}
