//! SQLite persistence for per-player match records.

use crate::collaborators::{PlayerMatchRecord, StatsPersister};
use crate::error::CollaboratorError;
use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct SqliteStatsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStatsStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored records for one match.
    pub fn count_for_match(&self, domain: &str, match_id: u64) -> Result<u64, CollaboratorError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM player_stats WHERE domain = ?1 AND match_id = ?2",
            params![domain, sql_int(match_id)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, CollaboratorError> {
        self.conn
            .lock()
            .map_err(|_| CollaboratorError::Other("stats store lock poisoned".to_string()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS player_stats (
            id INTEGER PRIMARY KEY,
            player_id TEXT NOT NULL,
            steam_id TEXT NOT NULL,
            class TEXT NOT NULL,
            team TEXT NOT NULL,
            kills INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            damage_dealt INTEGER NOT NULL,
            damage_taken INTEGER NOT NULL,
            healing_given INTEGER NOT NULL,
            healing_received INTEGER NOT NULL,
            domain TEXT NOT NULL,
            match_id INTEGER NOT NULL,
            duration_secs INTEGER NOT NULL,
            schema_version INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_player_stats_match ON player_stats(domain, match_id);
        CREATE INDEX IF NOT EXISTS idx_player_stats_steam ON player_stats(steam_id);
        "#,
    )
}

// SQLite integers are signed; larger values are clamped.
fn sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn insert_batch(conn: &mut Connection, records: &[PlayerMatchRecord]) -> Result<(), rusqlite::Error> {
    let recorded_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            r#"INSERT INTO player_stats
               (player_id, steam_id, class, team, kills, deaths, damage_dealt, damage_taken,
                healing_given, healing_received, domain, match_id, duration_secs,
                schema_version, recorded_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"#,
        )?;

        for record in records {
            let stats = &record.stats;
            stmt.execute(params![
                record.player.player_id,
                record.steam_id.to_string(),
                record.player.class,
                record.player.team,
                sql_int(stats.kills),
                sql_int(stats.deaths),
                sql_int(stats.damage_dealt),
                sql_int(stats.damage_taken),
                sql_int(stats.healing_given),
                sql_int(stats.healing_received),
                record.domain,
                sql_int(record.match_id),
                sql_int(record.duration_secs),
                record.schema_version,
                recorded_at,
            ])?;
        }
    }
    tx.commit()
}

#[async_trait]
impl StatsPersister for SqliteStatsStore {
    async fn persist(&self, records: Vec<PlayerMatchRecord>) -> Result<(), CollaboratorError> {
        if records.is_empty() {
            return Ok(());
        }

        let conn = Arc::clone(&self.conn);
        let count = records.len();

        tokio::task::spawn_blocking(move || -> Result<(), CollaboratorError> {
            let mut conn = conn
                .lock()
                .map_err(|_| CollaboratorError::Other("stats store lock poisoned".to_string()))?;
            insert_batch(&mut conn, &records)?;
            Ok(())
        })
        .await??;

        debug!("Stored {} player records", count);
        Ok(())
    }
}
