// SQLite persistence for analysis runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use scouting_core::PlayerIdentity;
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::AnalysisResults;

/// One stored run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub parameters: serde_json::Value,
}

/// One stored result row: its 1-based rank, identity and every numeric
/// column in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub rank: usize,
    pub identity: PlayerIdentity,
    pub values: Vec<(String, f64)>,
}

impl StoredRow {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.iter().find(|(c, _)| c == column).map(|(_, v)| *v)
    }
}

/// Run history: each run's parameters plus every row of its named result
/// tables, keyed by run id.
pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS runs (
                run_id     TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                parameters TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS result_rows (
                run_id     TEXT NOT NULL REFERENCES runs(run_id),
                table_name TEXT NOT NULL,
                rank       INTEGER NOT NULL,
                player     TEXT NOT NULL,
                squad      TEXT NOT NULL,
                comp       TEXT NOT NULL,
                nation     TEXT NOT NULL,
                age        INTEGER NOT NULL,
                pos        TEXT NOT NULL,
                nineties   REAL NOT NULL,
                PRIMARY KEY (run_id, table_name, rank)
            );

            CREATE TABLE IF NOT EXISTS result_values (
                run_id      TEXT NOT NULL,
                table_name  TEXT NOT NULL,
                rank        INTEGER NOT NULL,
                column_idx  INTEGER NOT NULL,
                column_name TEXT NOT NULL,
                value       REAL NOT NULL,
                PRIMARY KEY (run_id, table_name, rank, column_idx),
                FOREIGN KEY (run_id, table_name, rank)
                    REFERENCES result_rows(run_id, table_name, rank)
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self { conn })
    }

    /// Store every result table of a run in one transaction under a fresh
    /// run id.
    pub fn save_run(&mut self, results: &AnalysisResults) -> Result<RunRecord> {
        let record = RunRecord {
            run_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            parameters: serde_json::to_value(&results.parameters)
                .context("failed to serialize run parameters")?,
        };
        let parameters_json =
            serde_json::to_string(&record.parameters).context("failed to serialize run parameters")?;

        let tx = self
            .conn
            .transaction()
            .context("failed to begin run transaction")?;

        tx.execute(
            "INSERT INTO runs (run_id, created_at, parameters) VALUES (?1, ?2, ?3)",
            params![record.run_id, record.created_at.to_rfc3339(), parameters_json],
        )
        .context("failed to insert run")?;

        for named in &results.tables {
            let columns = named.table.columns();
            for (i, row) in named.table.rows().iter().enumerate() {
                let rank = i as i64 + 1;
                let id = &row.identity;
                tx.execute(
                    "INSERT INTO result_rows
                        (run_id, table_name, rank, player, squad, comp, nation, age, pos, nineties)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        record.run_id,
                        named.name,
                        rank,
                        id.player,
                        id.squad,
                        id.comp,
                        id.nation,
                        id.age,
                        id.pos,
                        id.nineties,
                    ],
                )
                .with_context(|| format!("failed to insert {} row {rank}", named.name))?;

                for (idx, (column, value)) in columns.iter().zip(&row.values).enumerate() {
                    tx.execute(
                        "INSERT INTO result_values
                            (run_id, table_name, rank, column_idx, column_name, value)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![record.run_id, named.name, rank, idx as i64, column, value],
                    )
                    .with_context(|| format!("failed to insert {} value {column}", named.name))?;
                }
            }
        }

        tx.commit().context("failed to commit run")?;
        Ok(record)
    }

    /// All runs, oldest first.
    pub fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT run_id, created_at, parameters FROM runs ORDER BY created_at, rowid")
            .context("failed to prepare list_runs query")?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("failed to query runs")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map run rows")?;

        raw.into_iter()
            .map(|(run_id, created_at, parameters)| {
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .with_context(|| format!("bad timestamp for run {run_id}"))?
                    .with_timezone(&Utc);
                let parameters = serde_json::from_str(&parameters)
                    .with_context(|| format!("bad parameters for run {run_id}"))?;
                Ok(RunRecord {
                    run_id,
                    created_at,
                    parameters,
                })
            })
            .collect()
    }

    /// Rows of one result table of one run, in rank order.
    pub fn load_rows(&self, run_id: &str, table_name: &str) -> Result<Vec<StoredRow>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT rank, player, squad, comp, nation, age, pos, nineties
                 FROM result_rows WHERE run_id = ?1 AND table_name = ?2 ORDER BY rank",
            )
            .context("failed to prepare load_rows query")?;

        let mut rows = stmt
            .query_map(params![run_id, table_name], |row| {
                Ok(StoredRow {
                    rank: row.get::<_, i64>(0)? as usize,
                    identity: PlayerIdentity {
                        player: row.get(1)?,
                        squad: row.get(2)?,
                        comp: row.get(3)?,
                        nation: row.get(4)?,
                        age: row.get(5)?,
                        pos: row.get(6)?,
                        nineties: row.get(7)?,
                    },
                    values: Vec::new(),
                })
            })
            .context("failed to query result rows")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map result rows")?;

        let mut values = self
            .conn
            .prepare(
                "SELECT column_name, value FROM result_values
                 WHERE run_id = ?1 AND table_name = ?2 AND rank = ?3 ORDER BY column_idx",
            )
            .context("failed to prepare result value query")?;
        for row in &mut rows {
            row.values = values
                .query_map(params![run_id, table_name, row.rank as i64], |r| {
                    Ok((r.get::<_, String>(0)?, r.get::<_, f64>(1)?))
                })
                .context("failed to query result values")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("failed to map result values")?;
        }

        Ok(rows)
    }

    /// Number of stored rows across every table of a run.
    pub fn row_count(&self, run_id: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM result_rows WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .context("failed to count result rows")?;
        Ok(count as usize)
    }
}
