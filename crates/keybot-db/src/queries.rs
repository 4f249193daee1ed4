use crate::Database;
use crate::models::KeyRow;
use anyhow::Result;
use keybot_types::models::KeyRecord;
use rusqlite::Connection;
use tracing::warn;

impl Database {
    // -- Keys --

    /// Append a key record. Returns the number of rows written.
    pub fn insert_key(&self, record: &KeyRecord) -> Result<usize> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "INSERT INTO keys (userid, keytype, keytext) VALUES (?1, ?2, ?3)",
                rusqlite::params![record.user_id, record.key_type, record.key_text],
            )?;
            Ok(rows)
        })
    }

    pub fn count_keys(&self, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM keys WHERE userid = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn keys_for_user(&self, user_id: i64) -> Result<Vec<KeyRow>> {
        self.with_conn(|conn| query_keys(conn, user_id))
    }
}

fn query_keys(conn: &Connection, user_id: i64) -> Result<Vec<KeyRow>> {
    let mut stmt = conn.prepare(
        "SELECT rowid, userid, keytype, keytext, created_at
         FROM keys
         WHERE userid = ?1
         ORDER BY rowid",
    )?;

    let rows = stmt
        .query_map([user_id], |row| {
            let rowid: i64 = row.get(0)?;
            let created_at: String = row.get(4)?;
            Ok(KeyRow {
                rowid,
                user_id: row.get(1)?,
                key_type: row.get(2)?,
                key_text: row.get(3)?,
                created_at: parse_timestamp(rowid, &created_at),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
fn parse_timestamp(rowid: i64, raw: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on key row {}: {}", raw, rowid, e);
            chrono::DateTime::default()
        })
}
