use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::profile::{BusinessProfile, RawFieldBundle};

pub const DEFAULT_DB_PATH: &str = "data/profile.sqlite";

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            id         INTEGER PRIMARY KEY,
            url        TEXT NOT NULL,
            raw        TEXT,
            error      TEXT,
            latency_ms INTEGER,
            fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_snapshots_url ON snapshots(url);

        CREATE TABLE IF NOT EXISTS profiles (
            snapshot_id  INTEGER PRIMARY KEY REFERENCES snapshots(id),
            url          TEXT NOT NULL,
            brand_name   TEXT,
            profile      TEXT NOT NULL,
            processed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One JSON document per wizard stage
        CREATE TABLE IF NOT EXISTS wizard_state (
            stage      TEXT PRIMARY KEY,
            data       TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

// ── Snapshots ──

pub struct SnapshotRow {
    pub url: String,
    pub raw: Option<RawFieldBundle>,
    pub error: Option<String>,
    pub latency_ms: Option<i64>,
}

pub fn insert_snapshot(conn: &Connection, row: &SnapshotRow) -> Result<i64> {
    let raw = row.raw.as_ref().map(serde_json::to_string).transpose()?;
    conn.execute(
        "INSERT INTO snapshots (url, raw, error, latency_ms) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![row.url, raw, row.error, row.latency_ms],
    )?;
    Ok(conn.last_insert_rowid())
}

pub struct StoredSnapshot {
    pub id: i64,
    pub url: String,
    pub raw: RawFieldBundle,
}

/// Successful snapshots with no profile yet.
pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<StoredSnapshot>> {
    fetch_snapshots(conn, true, limit)
}

/// Every successful snapshot, processed or not.
pub fn fetch_all_snapshots(conn: &Connection, limit: Option<usize>) -> Result<Vec<StoredSnapshot>> {
    fetch_snapshots(conn, false, limit)
}

fn fetch_snapshots(
    conn: &Connection,
    unprocessed_only: bool,
    limit: Option<usize>,
) -> Result<Vec<StoredSnapshot>> {
    let sql = format!(
        "SELECT s.id, s.url, s.raw
         FROM snapshots s
         LEFT JOIN profiles p ON p.snapshot_id = s.id
         WHERE s.raw IS NOT NULL{}
         ORDER BY s.id{}",
        if unprocessed_only { " AND p.snapshot_id IS NULL" } else { "" },
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, url, raw)| {
            let raw: RawFieldBundle = serde_json::from_str(&raw)
                .with_context(|| format!("Corrupt snapshot {}", id))?;
            Ok(StoredSnapshot {
                id,
                url,
                raw: raw.sanitized(),
            })
        })
        .collect()
}

// ── Profiles ──

pub struct ProfileRow {
    pub snapshot_id: i64,
    pub url: String,
    pub profile: BusinessProfile,
}

pub fn save_profiles(conn: &Connection, rows: &[ProfileRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO profiles (snapshot_id, url, brand_name, profile)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for r in rows {
            let json = serde_json::to_string(&r.profile)?;
            stmt.execute(rusqlite::params![r.snapshot_id, r.url, r.profile.brand_name, json])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn load_profile(conn: &Connection, snapshot_id: i64) -> Result<Option<BusinessProfile>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT profile FROM profiles WHERE snapshot_id = ?1",
            [snapshot_id],
            |r| r.get(0),
        )
        .optional()?;
    json.map(|j| serde_json::from_str(&j).context("Corrupt profile"))
        .transpose()
}

// ── Wizard state ──

pub fn load_stage<T: DeserializeOwned + Default>(conn: &Connection, stage: &str) -> Result<T> {
    let json: Option<String> = conn
        .query_row(
            "SELECT data FROM wizard_state WHERE stage = ?1",
            [stage],
            |r| r.get(0),
        )
        .optional()?;
    match json {
        Some(j) => serde_json::from_str(&j).with_context(|| format!("Corrupt {} state", stage)),
        None => Ok(T::default()),
    }
}

pub fn save_stage<T: Serialize>(conn: &Connection, stage: &str, data: &T) -> Result<()> {
    let json = serde_json::to_string(data)?;
    conn.execute(
        "INSERT INTO wizard_state (stage, data) VALUES (?1, ?2)
         ON CONFLICT(stage) DO UPDATE SET data = excluded.data, updated_at = datetime('now')",
        rusqlite::params![stage, json],
    )?;
    Ok(())
}

// ── Stats ──

pub struct Stats {
    pub snapshots: usize,
    pub errors: usize,
    pub processed: usize,
    pub unprocessed: usize,
    pub urls: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let snapshots: usize = conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))?;
    let errors: usize = conn.query_row(
        "SELECT COUNT(*) FROM snapshots WHERE error IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let processed: usize = conn.query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))?;
    let urls: usize =
        conn.query_row("SELECT COUNT(DISTINCT url) FROM snapshots", [], |r| r.get(0))?;
    Ok(Stats {
        snapshots,
        errors,
        processed,
        unprocessed: snapshots.saturating_sub(errors + processed),
        urls,
    })
}
