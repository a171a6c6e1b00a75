//! Server-side HTML for the updates pages.

use bulletin_types::models::{CompanyUpdate, UpdateStatus};

use crate::views::{
    AdminTable, DeleteDialog, LIST_PATH, NEW_PATH, UpdateCard, UpdateListPage, UpdateListView,
    format_date,
};

const ICON_CHECK_CIRCLE: &str = "M9 12.75 11.25 15 15 9.75M21 12a9 9 0 1 1-18 0 9 9 0 0 1 18 0Z";
const ICON_TRASH: &str = "m14.74 9-.346 9m-4.788 0L9.26 9m9.968-3.21c.342.052.682.107 1.022.166m-1.022-.165L18.16 19.673a2.25 2.25 0 0 1-2.244 2.077H8.084a2.25 2.25 0 0 1-2.244-2.077L4.772 5.79m14.456 0a48.108 48.108 0 0 0-3.478-.397m-12 .562c.34-.059.68-.114 1.022-.165m0 0a48.11 48.11 0 0 1 3.478-.397m7.5 0v-.916c0-1.18-.91-2.164-2.09-2.201a51.964 51.964 0 0 0-3.32 0c-1.18.037-2.09 1.022-2.09 2.201v.916m7.5 0a48.667 48.667 0 0 0-7.5 0";
const ICON_ARROW_RIGHT: &str = "M13.5 4.5 21 12m0 0-7.5 7.5M21 12H3";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn icon(path: &str, class: &str) -> String {
    format!(
        r#"<svg class="{class}" xmlns="http://www.w3.org/2000/svg" fill="none" viewBox="0 0 24 24" stroke-width="1.5" stroke="currentColor" aria-hidden="true"><path stroke-linecap="round" stroke-linejoin="round" d="{path}"/></svg>"#
    )
}

fn layout(title: &str, header_actions: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main class="main-layout">
<header class="main-header"><h1>{title}</h1><div class="header-actions">{header_actions}</div></header>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn placeholder(message: &str) -> String {
    format!(
        r#"<div class="placeholder">{}<p>{}</p></div>"#,
        icon(ICON_CHECK_CIRCLE, "size-6"),
        escape(message)
    )
}

fn status_badge(status: UpdateStatus) -> String {
    let class = if status.is_success() { "status status-success" } else { "status" };
    format!(r#"<span class="{}">{}</span>"#, class, status.label())
}

pub fn list_page(page: &UpdateListPage) -> String {
    let actions = if page.show_new_action {
        format!(r#"<a class="button" href="{}">New update</a>"#, NEW_PATH)
    } else {
        String::new()
    };

    let content = match &page.view {
        UpdateListView::Empty => placeholder("No updates to display."),
        UpdateListView::Admin(table) => admin_table(table),
        UpdateListView::Viewer(cards) => cards.iter().map(card).collect(),
    };

    layout("Updates", &actions, &content)
}

fn admin_table(table: &AdminTable) -> String {
    let mut html = String::from(
        r#"<table class="data-table"><thead><tr><th>Sent on</th><th>Title</th><th>Status</th><th></th></tr></thead><tbody>"#,
    );

    for row in &table.rows {
        let edit_href = escape(&row.edit_href);
        html.push_str(&format!(
            r#"<tr class="clickable" data-href="{edit}" onclick="location.href=this.dataset.href"><td>{sent_on}</td><td><a href="{edit}" class="no-underline" onclick="event.stopPropagation()">{title}</a></td><td>{status}</td><td><a class="button button-outline" aria-label="Remove" href="{delete}" onclick="event.stopPropagation()">{trash}</a></td></tr>"#,
            edit = edit_href,
            sent_on = escape(&row.sent_on),
            title = escape(&row.title),
            status = status_badge(row.status),
            delete = escape(&row.delete_href),
            trash = icon(ICON_TRASH, "size-4"),
        ));
    }

    html.push_str("</tbody></table>");

    if let Some(dialog) = &table.dialog {
        html.push_str(&delete_dialog(dialog));
    }

    html
}

fn delete_dialog(dialog: &DeleteDialog) -> String {
    let error = dialog
        .error
        .as_deref()
        .map(|e| format!(r#"<p class="alert alert-error" role="alert">{}</p>"#, escape(e)))
        .unwrap_or_default();

    format!(
        r#"<dialog class="modal" open aria-labelledby="delete-title"><h2 id="delete-title">Delete update?</h2>
<p>"{title}" will be permanently deleted and cannot be restored.</p>
{error}<div class="modal-actions"><a class="button button-outline" href="{cancel}">No, cancel</a><form method="post" action="{action}" onsubmit="var b=this.querySelector('button');b.disabled=true;b.textContent=b.dataset.loadingText"><button type="submit" data-loading-text="Deleting...">Yes, delete</button></form></div></dialog>"#,
        title = escape(&dialog.title),
        error = error,
        cancel = escape(dialog.cancel_href),
        action = escape(&dialog.action_href),
    )
}

fn card(card: &UpdateCard) -> String {
    format!(
        r#"<a class="card" href="{href}"><div class="card-content"><div class="card-text"><h4 class="text-xl font-bold">{title}</h4><p class="line-clamp-2">{summary}</p></div>{arrow}</div></a>"#,
        href = escape(&card.href),
        title = escape(&card.title),
        summary = escape(&card.summary),
        arrow = icon(ICON_ARROW_RIGHT, "size-7"),
    )
}

pub fn detail_page(update: &CompanyUpdate) -> String {
    let sent_on = update
        .sent_at
        .map(|ts| format!("Sent on {}", format_date(ts)))
        .unwrap_or_else(|| "Not sent yet".to_string());

    let paragraphs: String = update
        .body
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p)))
        .collect();

    let content = format!(
        r#"<article class="update"><p class="update-meta">{status} {sent_on}</p>{body}</article><a href="{back}">Back to updates</a>"#,
        status = status_badge(update.status()),
        sent_on = escape(&sent_on),
        body = paragraphs,
        back = LIST_PATH,
    );

    layout(&update.title, "", &content)
}

pub fn error_page(title: &str, message: &str) -> String {
    layout(title, "", &placeholder(message))
}
