//! Append-only SQLite log of conversation turns. There is no cached "current
//! record": the newest persisted snapshot is authoritative, so a crash loses
//! nothing and replay is always possible from the log alone.

use anyhow::{anyhow, Result};
use intake_protocol::{ConversationRole, RequirementRecord};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Clone)]
pub struct Kernel {
    db_path: PathBuf,
}

/// One stored conversation turn, oldest-first when listed.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRow {
    pub id: i64,
    pub session_id: String,
    pub role: ConversationRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RequirementRecord>,
    pub created: String,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl Kernel {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join("intake.sqlite");
        let need_init = !db_path.exists();
        let conn = Connection::open(&db_path)?;
        // Pragmas tuned for async server usage
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Busy timeout (default 5000ms; override with INTAKE_SQLITE_BUSY_MS)
        let busy_ms: u64 = std::env::var("INTAKE_SQLITE_BUSY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        conn.busy_timeout(std::time::Duration::from_millis(busy_ms))?;
        // Cache size: negative = KB units. Default ~= 20MB
        let cache_pages: i64 = std::env::var("INTAKE_SQLITE_CACHE_PAGES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(-20000);
        let _ = conn.pragma_update(None, "cache_size", cache_pages);
        let _ = conn.pragma_update(None, "temp_store", "MEMORY");
        if need_init {
            Self::init_schema(&conn)?;
        }
        Ok(Self { db_path })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
              id TEXT PRIMARY KEY,
              created TEXT NOT NULL,
              updated TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS turns (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              session_id TEXT NOT NULL,
              role TEXT NOT NULL,
              content TEXT NOT NULL,
              record TEXT,
              created TEXT NOT NULL,
              FOREIGN KEY (session_id) REFERENCES sessions(id)
            );
            CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Idempotent session creation; touches `updated` on repeat calls.
    pub fn ensure_session(&self, session_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let now = now_rfc3339();
        conn.execute(
            "INSERT INTO sessions(id,created,updated) VALUES(?,?,?)
             ON CONFLICT(id) DO UPDATE SET updated=excluded.updated",
            params![session_id, now, now],
        )?;
        Ok(())
    }

    /// Durable ordered append; the row id fixes the turn order.
    pub fn append_turn(
        &self,
        session_id: &str,
        role: ConversationRole,
        content: &str,
        record: Option<&RequirementRecord>,
    ) -> Result<i64> {
        let conn = self.conn()?;
        let record_json = record
            .map(|r| serde_json::to_string(r))
            .transpose()?;
        conn.execute(
            "INSERT INTO turns(session_id,role,content,record,created) VALUES(?,?,?,?,?)",
            params![
                session_id,
                role.as_str(),
                content,
                record_json,
                now_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Full history for a session, oldest first.
    pub fn turns_for_session(&self, session_id: &str) -> Result<Vec<TurnRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id,session_id,role,content,record,created FROM turns
             WHERE session_id=? ORDER BY id ASC",
        )?;
        let mut rows = stmt.query(params![session_id])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let role_raw: String = row.get(2)?;
            let role = ConversationRole::parse(&role_raw)
                .ok_or_else(|| anyhow!("unknown turn role: {role_raw}"))?;
            let record_raw: Option<String> = row.get(4)?;
            let record = record_raw.and_then(|s| serde_json::from_str(&s).ok());
            out.push(TurnRow {
                id: row.get(0)?,
                session_id: row.get(1)?,
                role,
                content: row.get(3)?,
                record,
                created: row.get(5)?,
            });
        }
        Ok(out)
    }

    /// Newest parseable record snapshot across the session's turns, if any.
    pub fn latest_record(&self, session_id: &str) -> Result<Option<RequirementRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT record FROM turns
             WHERE session_id=? AND record IS NOT NULL ORDER BY id DESC",
        )?;
        let mut rows = stmt.query(params![session_id])?;
        while let Some(row) = rows.next()? {
            let raw: String = row.get(0)?;
            if let Ok(record) = serde_json::from_str::<RequirementRecord>(&raw) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    pub async fn ensure_session_async(&self, session_id: &str) -> Result<()> {
        let k = self.clone();
        let sid = session_id.to_string();
        tokio::task::spawn_blocking(move || k.ensure_session(&sid))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn append_turn_async(
        &self,
        session_id: &str,
        role: ConversationRole,
        content: &str,
        record: Option<RequirementRecord>,
    ) -> Result<i64> {
        let k = self.clone();
        let sid = session_id.to_string();
        let content = content.to_string();
        tokio::task::spawn_blocking(move || k.append_turn(&sid, role, &content, record.as_ref()))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn turns_for_session_async(&self, session_id: &str) -> Result<Vec<TurnRow>> {
        let k = self.clone();
        let sid = session_id.to_string();
        tokio::task::spawn_blocking(move || k.turns_for_session(&sid))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn latest_record_async(&self, session_id: &str) -> Result<Option<RequirementRecord>> {
        let k = self.clone();
        let sid = session_id.to_string();
        tokio::task::spawn_blocking(move || k.latest_record(&sid))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }
}
