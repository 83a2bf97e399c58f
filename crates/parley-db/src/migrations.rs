use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (info + chat tables)");
        conn.execute_batch(
            "
            CREATE TABLE info (
                id          INTEGER PRIMARY KEY,
                namelogin   TEXT NOT NULL UNIQUE,
                nameshow    TEXT,
                email       TEXT,
                avatar      TEXT,
                department  TEXT,
                job         TEXT,
                password    TEXT
            );

            -- user and contents are JSON arrays
            CREATE TABLE chat (
                id          INTEGER PRIMARY KEY,
                user        TEXT NOT NULL DEFAULT '[]',
                contents    TEXT NOT NULL DEFAULT '[]'
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (chat revision + pair key)");
        conn.execute_batch(
            "
            ALTER TABLE chat ADD COLUMN revision INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE chat ADD COLUMN pair_key TEXT;

            CREATE UNIQUE INDEX IF NOT EXISTS idx_chat_pair_key
                ON chat(pair_key);

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 2);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
