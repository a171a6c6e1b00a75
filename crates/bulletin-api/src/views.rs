//! View models for the updates pages. Built from plain data and an explicit
//! role; rendering lives in `render`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bulletin_types::models::{CompanyUpdate, Role, UpdateStatus};

pub const LIST_PATH: &str = "/updates/company";
pub const NEW_PATH: &str = "/updates/company/new";

pub fn detail_path(id: Uuid) -> String {
    format!("{}/{}", LIST_PATH, id)
}

pub fn edit_path(id: Uuid) -> String {
    format!("{}/{}/edit", LIST_PATH, id)
}

/// List page with the delete dialog opened on `id`.
pub fn delete_prompt_path(id: Uuid) -> String {
    format!("{}?delete={}", LIST_PATH, id)
}

pub fn delete_action_path(id: Uuid) -> String {
    format!("{}/{}/delete", LIST_PATH, id)
}

/// "Mar 16, 2022"
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// The row a delete dialog is open for, plus the failure of a previous attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Deleting {
    pub id: Uuid,
    pub error: Option<String>,
}

impl Deleting {
    pub fn prompt(id: Uuid) -> Self {
        Self { id, error: None }
    }

    pub fn failed(id: Uuid, error: impl Into<String>) -> Self {
        Self { id, error: Some(error.into()) }
    }
}

#[derive(Debug)]
pub struct UpdateListPage {
    /// Only administrators get the "New update" header action.
    pub show_new_action: bool,
    pub view: UpdateListView,
}

#[derive(Debug)]
pub enum UpdateListView {
    Empty,
    Admin(AdminTable),
    Viewer(Vec<UpdateCard>),
}

#[derive(Debug)]
pub struct AdminTable {
    pub rows: Vec<AdminRow>,
    pub dialog: Option<DeleteDialog>,
}

#[derive(Debug)]
pub struct AdminRow {
    pub id: Uuid,
    pub sent_on: String,
    pub title: String,
    pub status: UpdateStatus,
    pub edit_href: String,
    pub delete_href: String,
}

#[derive(Debug)]
pub struct DeleteDialog {
    pub update_id: Uuid,
    pub title: String,
    pub action_href: String,
    pub cancel_href: &'static str,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct UpdateCard {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub href: String,
}

impl UpdateListPage {
    pub fn build(role: Role, updates: Vec<CompanyUpdate>, deleting: Option<Deleting>) -> Self {
        Self {
            show_new_action: role.is_administrator(),
            view: UpdateListView::build(role, updates, deleting),
        }
    }
}

impl UpdateListView {
    pub fn build(role: Role, updates: Vec<CompanyUpdate>, deleting: Option<Deleting>) -> Self {
        if updates.is_empty() {
            return Self::Empty;
        }

        if role.is_administrator() {
            Self::Admin(AdminTable::build(updates, deleting))
        } else {
            Self::Viewer(updates.into_iter().map(UpdateCard::from).collect())
        }
    }
}

impl AdminTable {
    fn build(updates: Vec<CompanyUpdate>, deleting: Option<Deleting>) -> Self {
        // The dialog only opens for a row that is actually in the list.
        let dialog = deleting.and_then(|deleting| {
            updates.iter().find(|u| u.id == deleting.id).map(|u| DeleteDialog {
                update_id: u.id,
                title: u.title.clone(),
                action_href: delete_action_path(u.id),
                cancel_href: LIST_PATH,
                error: deleting.error,
            })
        });

        let rows = updates
            .into_iter()
            .map(|u| AdminRow {
                id: u.id,
                sent_on: u.sent_at.map(format_date).unwrap_or_else(|| "-".to_string()),
                status: u.status(),
                edit_href: edit_path(u.id),
                delete_href: delete_prompt_path(u.id),
                title: u.title,
            })
            .collect();

        Self { rows, dialog }
    }
}

impl From<CompanyUpdate> for UpdateCard {
    fn from(update: CompanyUpdate) -> Self {
        Self {
            summary: update.summary(),
            href: detail_path(update.id),
            id: update.id,
            title: update.title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn update(title: &str, sent_at: Option<DateTime<Utc>>) -> CompanyUpdate {
        CompanyUpdate {
            id: Uuid::new_v4(),
            company_id: Uuid::nil(),
            title: title.to_string(),
            body: format!("{} body", title),
            sent_at,
            created_at: Utc::now(),
        }
    }

    fn sent() -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2022, 3, 6, 20, 38, 43).unwrap())
    }

    #[test]
    fn empty_list_is_empty_for_every_role() {
        for role in [Role::Administrator, Role::Worker, Role::Investor, Role::Lawyer] {
            let page = UpdateListPage::build(role, vec![], None);
            assert!(matches!(page.view, UpdateListView::Empty));
            assert_eq!(page.show_new_action, role.is_administrator());
        }
    }

    #[test]
    fn administrators_get_the_table() {
        let updates = vec![update("Q1", sent()), update("Q2 draft", None)];
        let page = UpdateListPage::build(Role::Administrator, updates, None);
        assert!(page.show_new_action);

        let UpdateListView::Admin(table) = page.view else {
            panic!("expected admin table");
        };
        assert!(table.dialog.is_none());
        assert_eq!(table.rows[0].sent_on, "Mar 6, 2022");
        assert_eq!(table.rows[0].status, UpdateStatus::Sent);
        assert_eq!(table.rows[1].sent_on, "-");
        assert_eq!(table.rows[1].status, UpdateStatus::Draft);
        assert_eq!(table.rows[1].edit_href, format!("/updates/company/{}/edit", table.rows[1].id));
    }

    #[test]
    fn other_roles_get_cards() {
        let q1 = update("Q1", sent());
        let id = q1.id;
        let page = UpdateListPage::build(Role::Investor, vec![q1], Some(Deleting::prompt(id)));
        assert!(!page.show_new_action);

        let UpdateListView::Viewer(cards) = page.view else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].href, format!("/updates/company/{}", id));
        assert_eq!(cards[0].summary, "Q1 body");
    }

    #[test]
    fn dialog_names_the_target_row() {
        let target = update("Hiring plan", None);
        let id = target.id;
        let updates = vec![update("Other", sent()), target];

        let view = UpdateListView::build(Role::Administrator, updates, Some(Deleting::prompt(id)));
        let UpdateListView::Admin(table) = view else {
            panic!("expected admin table");
        };
        let dialog = table.dialog.expect("dialog open");
        assert_eq!(dialog.title, "Hiring plan");
        assert_eq!(dialog.action_href, format!("/updates/company/{}/delete", id));
        assert_eq!(dialog.cancel_href, LIST_PATH);
        assert!(dialog.error.is_none());
    }

    #[test]
    fn dialog_stays_closed_for_unknown_rows() {
        let view = UpdateListView::build(
            Role::Administrator,
            vec![update("Only", None)],
            Some(Deleting::failed(Uuid::new_v4(), "boom")),
        );
        let UpdateListView::Admin(table) = view else {
            panic!("expected admin table");
        };
        assert!(table.dialog.is_none());
    }
}
