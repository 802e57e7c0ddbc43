use crate::store::Store;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use triage_core::{
    canonical_timestamp, FaultLabel, Interval, Level, LogEvent, QaPair, QuestionMode,
    TriageSession,
};

const EVENT_COLUMNS: &str =
    "id, source, ts, level, message, correlation_id, endpoint, account, label";

const HIGH_SEVERITY_SQL: &str = "('ERROR', 'FATAL', 'EXCEPTION', 'CRITICAL')";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                step INTEGER NOT NULL DEFAULT 0,
                closed INTEGER NOT NULL DEFAULT 0,
                initiator TEXT NOT NULL DEFAULT '',
                mode TEXT NOT NULL DEFAULT 'scripted',
                stop_pending INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS answers (
                session_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT,
                slot INTEGER,
                PRIMARY KEY (session_id, step)
            );
            CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source TEXT,
                ts TEXT,
                level TEXT NOT NULL,
                message TEXT NOT NULL,
                correlation_id TEXT,
                endpoint TEXT,
                account TEXT,
                label TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_logs_ts ON logs(ts);
            CREATE INDEX IF NOT EXISTS idx_logs_correlation ON logs(correlation_id);
            CREATE INDEX IF NOT EXISTS idx_logs_level ON logs(level);
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("store connection lock poisoned"))
    }

    fn parse_ts(raw: Option<String>) -> Option<DateTime<Utc>> {
        raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<LogEvent> {
        let level: String = row.get(3)?;
        let label: Option<String> = row.get(8)?;
        Ok(LogEvent {
            id: Some(row.get(0)?),
            source: row.get(1)?,
            timestamp: Self::parse_ts(row.get(2)?),
            level: Level::from_prefix(&level).unwrap_or_default(),
            message: row.get(4)?,
            correlation_id: row.get(5)?,
            endpoint: row.get(6)?,
            account: row.get(7)?,
            label: label.map(|l| FaultLabel::parse(&l).unwrap_or(FaultLabel::Other)),
        })
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<TriageSession> {
        let created_at: String = row.get(1)?;
        let mode: String = row.get(5)?;
        Ok(TriageSession {
            id: row.get(0)?,
            created_at: Self::parse_ts(Some(created_at)).unwrap_or_default(),
            step: row.get(2)?,
            closed: row.get::<_, i64>(3)? != 0,
            initiator: row.get(4)?,
            mode: QuestionMode::parse(&mode).unwrap_or(QuestionMode::Scripted),
            stop_pending: row.get::<_, i64>(6)? != 0,
        })
    }

    fn row_to_answer(row: &rusqlite::Row) -> rusqlite::Result<QaPair> {
        Ok(QaPair {
            session_id: row.get(0)?,
            step: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
            slot: row.get(4)?,
        })
    }

    fn upsert_answer(conn: &Connection, qa: &QaPair) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT OR REPLACE INTO answers (session_id, step, question, answer, slot)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![qa.session_id, qa.step, qa.question, qa.answer, qa.slot],
        )
    }
}

impl Store for SqliteStore {
    fn create_session(&self, id: &str, initiator: &str, mode: QuestionMode) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO sessions (id, created_at, step, closed, initiator, mode, stop_pending)
             VALUES (?1, ?2, 0, 0, ?3, ?4, 0)",
            params![id, canonical_timestamp(&Utc::now()), initiator, mode.as_str()],
        )?;
        Ok(())
    }

    fn get_session(&self, id: &str) -> Result<Option<TriageSession>> {
        let conn = self.conn()?;
        let session = conn
            .query_row(
                "SELECT id, created_at, step, closed, initiator, mode, stop_pending
                 FROM sessions WHERE id = ?1",
                params![id],
                Self::row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    fn advance_step(&self, id: &str, step: u32) -> Result<()> {
        self.conn()?
            .execute("UPDATE sessions SET step = ?1 WHERE id = ?2", params![step, id])?;
        Ok(())
    }

    fn close_session(&self, id: &str) -> Result<()> {
        self.conn()?.execute(
            "UPDATE sessions SET closed = 1, stop_pending = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    fn set_stop_pending(&self, id: &str, pending: bool) -> Result<()> {
        self.conn()?.execute(
            "UPDATE sessions SET stop_pending = ?1 WHERE id = ?2",
            params![pending as i64, id],
        )?;
        Ok(())
    }

    fn put_answer(&self, qa: &QaPair) -> Result<()> {
        let conn = self.conn()?;
        Self::upsert_answer(&conn, qa)?;
        Ok(())
    }

    fn get_answers(&self, session_id: &str) -> Result<Vec<QaPair>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, step, question, answer, slot
             FROM answers WHERE session_id = ?1 ORDER BY step",
        )?;
        let rows = stmt.query_map(params![session_id], Self::row_to_answer)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn advance_with_question(&self, next: &QaPair) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        Self::upsert_answer(&tx, next)?;
        tx.execute(
            "UPDATE sessions SET step = ?1 WHERE id = ?2",
            params![next.step, next.session_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn insert_events(&self, events: &[LogEvent]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO logs (source, ts, level, message, correlation_id, endpoint, account, label)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for event in events {
                stmt.execute(params![
                    event.source,
                    event.timestamp.as_ref().map(canonical_timestamp),
                    event.level.as_str(),
                    event.message,
                    event.correlation_id,
                    event.endpoint,
                    event.account,
                    event.label.map(|l| l.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = events.len(), "inserted events");
        Ok(events.len())
    }

    fn fetch_window(&self, interval: &Interval, limit: usize) -> Result<Vec<LogEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM logs
             WHERE (?1 IS NULL OR ts >= ?1) AND (?2 IS NULL OR ts <= ?2)
             ORDER BY ts IS NULL, ts ASC, id ASC
             LIMIT ?3"
        ))?;
        let rows = stmt.query_map(
            params![interval.start_str(), interval.end_str(), limit as i64],
            Self::row_to_event,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn fetch_recent(&self, limit: usize) -> Result<Vec<LogEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM logs ORDER BY ts DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_event)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn find_first_high_severity(&self, interval: &Interval) -> Result<Option<LogEvent>> {
        let conn = self.conn()?;
        let event = conn
            .query_row(
                &format!(
                    "SELECT {EVENT_COLUMNS} FROM logs
                     WHERE level IN {HIGH_SEVERITY_SQL}
                       AND ts IS NOT NULL
                       AND (?1 IS NULL OR ts >= ?1)
                       AND (?2 IS NULL OR ts <= ?2)
                     ORDER BY ts ASC, id ASC
                     LIMIT 1"
                ),
                params![interval.start_str(), interval.end_str()],
                Self::row_to_event,
            )
            .optional()?;
        Ok(event)
    }

    fn search_by_correlation(&self, correlation_id: &str, limit: usize) -> Result<Vec<LogEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM logs
             WHERE correlation_id = ?1
             ORDER BY ts IS NULL, ts ASC, id ASC
             LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![correlation_id, limit as i64], Self::row_to_event)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn set_label(&self, event_id: i64, label: FaultLabel) -> Result<()> {
        self.conn()?.execute(
            "UPDATE logs SET label = ?1 WHERE id = ?2",
            params![label.as_str(), event_id],
        )?;
        Ok(())
    }

    fn label_histogram(&self) -> Result<BTreeMap<String, usize>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT COALESCE(label, 'other') AS label, COUNT(1)
             FROM logs GROUP BY COALESCE(label, 'other')",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
        })?;
        rows.collect::<Result<BTreeMap<_, _>, _>>().map_err(Into::into)
    }
}
