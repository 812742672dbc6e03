//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `link_curves` and `step_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::{LinkCurveRow, OutputResult, StepSummaryRow};
use crate::writer::OutputWriter;

/// Writes loading output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS link_curves (
                 link               INTEGER NOT NULL,
                 boundary           INTEGER NOT NULL,
                 clock_secs         INTEGER NOT NULL,
                 cumulative_inflow  REAL    NOT NULL,
                 cumulative_outflow REAL    NOT NULL,
                 PRIMARY KEY (link, boundary)
             );
             CREATE TABLE IF NOT EXISTS step_summaries (
                 step         INTEGER PRIMARY KEY,
                 clock_secs   INTEGER NOT NULL,
                 iterations   INTEGER NOT NULL,
                 node_updates INTEGER NOT NULL,
                 network_flow REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_link_curves(&mut self, rows: &[LinkCurveRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO link_curves \
                 (link, boundary, clock_secs, cumulative_inflow, cumulative_outflow) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.link,
                    row.boundary as i64,
                    row.clock_secs as i64,
                    row.cumulative_inflow,
                    row.cumulative_outflow,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO step_summaries \
             (step, clock_secs, iterations, node_updates, network_flow) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                row.step as i64,
                row.clock_secs as i64,
                row.iterations as i64,
                row.node_updates as i64,
                row.network_flow,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
