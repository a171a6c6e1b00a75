//! Database row types — these map directly to SQLite rows.
//! Distinct from bulletin-types models to keep the DB layer independent.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use bulletin_types::models::{CompanyUpdate, Role, User, UserFlags};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub flags: i64,
    pub created_at: String,
}

pub struct MembershipRow {
    pub company_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: String,
}

pub struct CompanyUpdateRow {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub body: String,
    pub sent_at: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn into_model(self) -> Result<User> {
        Ok(User {
            id: self.id.parse::<Uuid>().with_context(|| format!("Corrupt user id '{}'", self.id))?,
            created_at: parse_timestamp(&self.created_at)?,
            username: self.username,
            flags: UserFlags::from_bits(self.flags),
        })
    }
}

impl MembershipRow {
    pub fn role(&self) -> Result<Role> {
        self.role
            .parse()
            .with_context(|| format!("Corrupt role on membership {}/{}", self.company_id, self.user_id))
    }
}

impl CompanyUpdateRow {
    pub fn into_model(self) -> Result<CompanyUpdate> {
        Ok(CompanyUpdate {
            id: self.id.parse::<Uuid>().with_context(|| format!("Corrupt update id '{}'", self.id))?,
            company_id: self
                .company_id
                .parse::<Uuid>()
                .with_context(|| format!("Corrupt company_id on update '{}'", self.id))?,
            sent_at: self.sent_at.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            title: self.title,
            body: self.body,
        })
    }
}

/// Rows written by this crate use RFC 3339; rows filled by the column default
/// use SQLite's "YYYY-MM-DD HH:MM:SS" without a timezone, which is UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .with_context(|| format!("Corrupt timestamp '{}'", raw))
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_shapes() {
        let rfc = parse_timestamp("2022-03-16T20:38:43.000000Z").unwrap();
        let sqlite = parse_timestamp("2022-03-16 20:38:43").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn formatted_timestamps_round_trip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&format_timestamp(now)).unwrap();
        assert_eq!(parsed.timestamp_micros(), now.timestamp_micros());
    }
}
