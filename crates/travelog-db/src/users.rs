//! Credential store.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::UserRow;
use crate::{Database, DbError, OptionalExt, Result};

const SQLITE_CONSTRAINT_UNIQUE: i32 = rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE;

impl Database {
    /// Insert a new user. The unique index on `email` makes the existence
    /// check and the insert a single atomic step.
    pub fn create_user(&self, full_name: &str, email: &str, password_hash: &str) -> Result<UserRow> {
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_on: Utc::now().timestamp_millis(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, full_name, email, password, created_on) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![row.id, row.full_name, row.email, row.password, row.created_on],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref f, _)
                    if f.extended_code == SQLITE_CONSTRAINT_UNIQUE =>
                {
                    DbError::EmailTaken
                }
                other => DbError::Sqlite(other),
            })?;
            Ok(())
        })?;

        Ok(row)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }
}

fn query_user(conn: &Connection, column: &'static str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, full_name, email, password, created_on FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_on: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_find() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_user("Ada", "ada@example.com", "$argon2id$fake").unwrap();

        let by_email = db.get_user_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.full_name, "Ada");
        assert_eq!(by_email.password, "$argon2id$fake");

        let by_id = db.get_user_by_id(&created.id).unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
    }

    #[test]
    fn unknown_user_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
        assert!(db.get_user_by_id(&Uuid::new_v4().to_string()).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("Ada", "ada@example.com", "h1").unwrap();

        let err = db.create_user("Other", "ada@example.com", "h2").unwrap_err();
        assert!(matches!(err, DbError::EmailTaken));

        // Emails are compared exactly, so a different case is a different account
        db.create_user("Other", "ADA@example.com", "h2").unwrap();
        assert!(db.get_user_by_email("Ada@example.com").unwrap().is_none());

        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn row_converts_to_public_view() {
        let db = Database::open_in_memory().unwrap();
        let row = db.create_user("Ada", "ada@example.com", "secret-hash").unwrap();
        let id = row.id.clone();

        let user = row.into_user().unwrap();
        assert_eq!(user.id.to_string(), id);
        assert_eq!(user.full_name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }
}
