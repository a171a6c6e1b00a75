use anyhow::{Result, bail};
use rusqlite::Connection;
use tracing::info;

struct Migration {
    version: i64,
    name: &'static str,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial schema",
        up: "
            CREATE TABLE companies (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE company_members (
                company_id  TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role        TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (company_id, user_id)
            );

            CREATE TABLE company_updates (
                id          TEXT PRIMARY KEY,
                company_id  TEXT NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                body        TEXT NOT NULL DEFAULT '',
                sent_at     TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_company_updates_company
                ON company_updates(company_id, created_at);
        ",
        down: "
            DROP INDEX IF EXISTS idx_company_updates_company;
            DROP TABLE IF EXISTS company_updates;
            DROP TABLE IF EXISTS company_members;
            DROP TABLE IF EXISTS users;
            DROP TABLE IF EXISTS companies;
        ",
    },
    Migration {
        version: 2,
        name: "add flags to users",
        up: "ALTER TABLE users ADD COLUMN flags INTEGER NOT NULL DEFAULT 0;",
        down: "ALTER TABLE users DROP COLUMN flags;",
    },
];

/// Newest schema version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    ensure_version_table(conn)?;
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;
    Ok(version)
}

/// Apply every pending migration, oldest first. Each one commits on its own.
pub fn run(conn: &Connection) -> Result<()> {
    let version = current_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
        info!("Running migration v{} ({})", migration.version, migration.name);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.up)?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [migration.version],
        )?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", current_version(conn)?);
    Ok(())
}

/// Undo migrations newest first until the schema is at `target`.
pub fn revert_to(conn: &Connection, target: i64) -> Result<()> {
    if target < 0 {
        bail!("Cannot revert to negative schema version {}", target);
    }

    let version = current_version(conn)?;
    if target > version {
        bail!("Schema is at v{}, cannot revert forward to v{}", version, target);
    }

    for migration in MIGRATIONS
        .iter()
        .rev()
        .filter(|m| m.version > target && m.version <= version)
    {
        info!("Reverting migration v{} ({})", migration.version, migration.name);
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.down)?;
        tx.execute(
            "DELETE FROM schema_version WHERE version = ?1",
            [migration.version],
        )?;
        tx.commit()?;
    }

    Ok(())
}

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_columns(conn: &Connection) -> Vec<String> {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('users')").unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn run_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn flags_column_defaults_to_zero() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        conn.execute(
            "INSERT INTO users (id, username, password) VALUES ('u1', 'ada', 'x')",
            [],
        )
        .unwrap();
        let flags: i64 = conn
            .query_row("SELECT flags FROM users WHERE id = 'u1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flags, 0);

        let err = conn.execute("UPDATE users SET flags = NULL WHERE id = 'u1'", []);
        assert!(err.is_err(), "flags must be NOT NULL");
    }

    #[test]
    fn flags_added_to_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        revert_to(&conn, 1).unwrap();

        conn.execute(
            "INSERT INTO users (id, username, password) VALUES ('u1', 'ada', 'x')",
            [],
        )
        .unwrap();
        assert!(!user_columns(&conn).contains(&"flags".to_string()));

        run(&conn).unwrap();
        let flags: i64 = conn
            .query_row("SELECT flags FROM users WHERE id = 'u1'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(flags, 0);
    }

    #[test]
    fn revert_drops_flags_column() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        assert!(user_columns(&conn).contains(&"flags".to_string()));

        revert_to(&conn, 1).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);
        assert!(!user_columns(&conn).contains(&"flags".to_string()));
        assert!(user_columns(&conn).contains(&"username".to_string()));
    }

    #[test]
    fn revert_rejects_forward_target() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        revert_to(&conn, 0).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);
        assert!(revert_to(&conn, 1).is_err());
    }
}
