use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (users, travel_stories)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                full_name   TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_on  INTEGER NOT NULL
            );

            -- user_id is not checked against users(id).
            CREATE TABLE travel_stories (
                seq               INTEGER PRIMARY KEY AUTOINCREMENT,
                id                TEXT NOT NULL UNIQUE,
                title             TEXT NOT NULL,
                story             TEXT NOT NULL,
                visited_location  TEXT NOT NULL,
                is_favourite      INTEGER NOT NULL DEFAULT 0,
                user_id           TEXT NOT NULL,
                image_url         TEXT NOT NULL,
                visited_date      INTEGER NOT NULL,
                created_on        INTEGER NOT NULL
            );

            CREATE INDEX idx_travel_stories_user
                ON travel_stories(user_id, seq);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
