//! Append-only SQLite log of interactive runs.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

use claimcheck_core::types::{EvidenceItem, InputMode};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    input_mode TEXT NOT NULL,
    claim TEXT NOT NULL,
    topk INTEGER NOT NULL,
    evidence_json TEXT NOT NULL,
    judge_json TEXT NOT NULL,
    flags_json TEXT NOT NULL
);
";

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub created_at: String,
    pub input_mode: InputMode,
    pub claim: String,
    pub topk: usize,
    pub evidence: Vec<EvidenceItem>,
    pub judge_verdict: serde_json::Value,
    pub flags: Vec<String>,
}

impl RunRecord {
    /// Stamp a record with the current UTC time.
    pub fn now(
        input_mode: InputMode,
        claim: impl Into<String>,
        topk: usize,
        evidence: Vec<EvidenceItem>,
        judge_verdict: serde_json::Value,
        flags: Vec<String>,
    ) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            input_mode,
            claim: claim.into(),
            topk,
            evidence,
            judge_verdict,
            flags,
        }
    }
}

pub struct RunHistory {
    conn: Connection,
}

impl RunHistory {
    /// Open (or create) the history database. The `runs` table is created if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let conn = Connection::open(path).with_context(|| format!("opening run history {}", path.display()))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    pub fn append(&self, record: &RunRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO runs (created_at, input_mode, claim, topk, evidence_json, judge_json, flags_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.created_at,
                record.input_mode.as_str(),
                record.claim,
                i64::try_from(record.topk)?,
                serde_json::to_string(&record.evidence)?,
                serde_json::to_string(&record.judge_verdict)?,
                serde_json::to_string(&record.flags)?,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, "run logged");
        Ok(id)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self.conn.query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(usize::try_from(n)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_append_and_reopen_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("telemetry").join("history.db");
        let record = RunRecord::now(InputMode::Image, "Vitamin D 1000 IU", 5, vec![], serde_json::json!({"verdict": "Unknown"}), vec![]);
        {
            let history = RunHistory::open(&path).unwrap();
            history.append(&record).unwrap();
        }
        let history = RunHistory::open(&path).unwrap();
        history.append(&record).unwrap();
        assert_eq!(history.count().unwrap(), 2);

        let mode: String = history
            .conn
            .query_row("SELECT input_mode FROM runs ORDER BY id LIMIT 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode, "image");
        assert!(record.created_at.ends_with('Z'));
    }
}
