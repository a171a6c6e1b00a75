use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub flags: UserFlags,
    pub created_at: DateTime<Utc>,
}

/// Role a user holds inside one company. The role carried in a session token
/// is the caller's active role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Worker,
    Investor,
    Lawyer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Worker => "worker",
            Self::Investor => "investor",
            Self::Lawyer => "lawyer",
        }
    }

    pub fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Self::Administrator),
            "worker" => Ok(Self::Worker),
            "investor" => Ok(Self::Investor),
            "lawyer" => Ok(Self::Lawyer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Bitfield stored in `users.flags`. Individual bits carry no meaning yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserFlags(i64);

impl UserFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: i64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> i64 {
        self.0
    }

    pub fn contains(self, mask: i64) -> bool {
        self.0 & mask == mask
    }

    pub fn insert(&mut self, mask: i64) {
        self.0 |= mask;
    }

    pub fn remove(&mut self, mask: i64) {
        self.0 &= !mask;
    }
}

/// Whether an update has gone out. Derived from `sent_at` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateStatus {
    Sent,
    Draft,
}

impl UpdateStatus {
    pub fn of(sent_at: Option<DateTime<Utc>>) -> Self {
        if sent_at.is_some() { Self::Sent } else { Self::Draft }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Draft => "Draft",
        }
    }

    /// Sent updates get the success badge, drafts stay neutral.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUpdate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub body: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const SUMMARY_MAX_CHARS: usize = 240;

impl CompanyUpdate {
    pub fn status(&self) -> UpdateStatus {
        UpdateStatus::of(self.sent_at)
    }

    pub fn summary(&self) -> String {
        summarize(&self.body)
    }
}

/// Collapse whitespace and cut the body down to a card-sized preview.
pub fn summarize(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", collapsed[..cut].trim_end()),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_sent_at() {
        assert_eq!(UpdateStatus::of(Some(Utc::now())), UpdateStatus::Sent);
        assert_eq!(UpdateStatus::of(None), UpdateStatus::Draft);
        assert!(UpdateStatus::Sent.is_success());
        assert!(!UpdateStatus::Draft.is_success());
        assert_eq!(UpdateStatus::Draft.label(), "Draft");
    }

    #[test]
    fn role_parses_its_own_names() {
        for role in [Role::Administrator, Role::Worker, Role::Investor, Role::Lawyer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
        assert!(Role::Administrator.is_administrator());
        assert!(!Role::Investor.is_administrator());
    }

    #[test]
    fn flags_set_and_clear_bits() {
        let mut flags = UserFlags::default();
        assert_eq!(flags.bits(), 0);

        flags.insert(0b101);
        assert!(flags.contains(0b001));
        assert!(flags.contains(0b101));
        assert!(!flags.contains(0b010));

        flags.remove(0b001);
        assert_eq!(flags.bits(), 0b100);
    }

    #[test]
    fn summary_collapses_whitespace() {
        assert_eq!(summarize("  Q3 results\n\n  are   in  "), "Q3 results are in");
    }

    #[test]
    fn summary_truncates_long_bodies() {
        let body = "é".repeat(SUMMARY_MAX_CHARS + 10);
        let summary = summarize(&body);
        assert!(summary.ends_with('…'));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 1);

        let exact = "a".repeat(SUMMARY_MAX_CHARS);
        assert_eq!(summarize(&exact), exact);
    }
}
