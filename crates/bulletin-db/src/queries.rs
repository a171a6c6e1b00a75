use crate::Database;
use crate::models::{CompanyUpdateRow, MembershipRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

impl Database {
    // -- Companies --

    pub fn create_company(&self, id: &str, name: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO companies (id, name) VALUES (?1, ?2)", (id, name))?;
            Ok(())
        })
    }

    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Overwrite a user's flag bits. Returns false if the user does not exist.
    pub fn set_user_flags(&self, id: &str, flags: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET flags = ?1 WHERE id = ?2",
                rusqlite::params![flags, id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Memberships --

    pub fn add_member(&self, company_id: &str, user_id: &str, role: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO company_members (company_id, user_id, role) VALUES (?1, ?2, ?3)",
                (company_id, user_id, role),
            )?;
            Ok(())
        })
    }

    /// Membership for `user_id` in `company_id`, or the oldest membership when
    /// no company is given.
    pub fn get_membership(
        &self,
        user_id: &str,
        company_id: Option<&str>,
    ) -> Result<Option<MembershipRow>> {
        self.with_conn(|conn| {
            match company_id {
                Some(company_id) => conn
                    .query_row(
                        "SELECT company_id, user_id, role, created_at FROM company_members
                         WHERE user_id = ?1 AND company_id = ?2",
                        [user_id, company_id],
                        map_membership,
                    )
                    .optional(),
                None => conn
                    .query_row(
                        "SELECT company_id, user_id, role, created_at FROM company_members
                         WHERE user_id = ?1
                         ORDER BY created_at ASC, rowid ASC
                         LIMIT 1",
                        [user_id],
                        map_membership,
                    )
                    .optional(),
            }
        })
    }

    // -- Company updates --

    pub fn insert_update(
        &self,
        id: &str,
        company_id: &str,
        title: &str,
        body: &str,
        sent_at: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO company_updates (id, company_id, title, body, sent_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, company_id, title, body, sent_at, created_at],
            )?;
            Ok(())
        })
    }

    /// All updates of a company, newest first.
    pub fn list_updates(&self, company_id: &str) -> Result<Vec<CompanyUpdateRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, company_id, title, body, sent_at, created_at
                 FROM company_updates
                 WHERE company_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([company_id], map_update)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_update(&self, company_id: &str, id: &str) -> Result<Option<CompanyUpdateRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, company_id, title, body, sent_at, created_at
                 FROM company_updates
                 WHERE company_id = ?1 AND id = ?2",
                [company_id, id],
                map_update,
            )
            .optional()
        })
    }

    /// Permanently delete an update. Scoped by company so one company can
    /// never remove another's rows. Returns false if nothing matched.
    pub fn delete_update(&self, company_id: &str, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM company_updates WHERE company_id = ?1 AND id = ?2",
                [company_id, id],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, flags, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            flags: row.get(3)?,
            created_at: row.get(4)?,
        })
    })
    .optional()
}

fn map_membership(row: &Row<'_>) -> rusqlite::Result<MembershipRow> {
    Ok(MembershipRow {
        company_id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn map_update(row: &Row<'_>) -> rusqlite::Result<CompanyUpdateRow> {
    Ok(CompanyUpdateRow {
        id: row.get(0)?,
        company_id: row.get(1)?,
        title: row.get(2)?,
        body: row.get(3)?,
        sent_at: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
