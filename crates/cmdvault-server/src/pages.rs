//! Minimal inline HTML for the operator UI.
//!
//! Deliberately plain: no template engine, no static assets. The pages only
//! need to expose the catalog operations; presentation polish is out of
//! scope.

use axum::response::Html;
use cmdvault_core::model::{Group, GroupedCommands};

use std::fmt::Write;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&str>, body: &str) -> Html<String> {
    let flash_html = flash
        .map(|m| format!("<p class=\"flash\"><em>{}</em></p>", escape(m)))
        .unwrap_or_default();
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title} — cmdvault</title></head>\
         <body style=\"font-family:sans-serif;max-width:60rem;margin:1rem auto;padding:0 1rem\">\
         <h1>cmdvault</h1>\
         <nav><a href=\"/\">Catalog</a> | <a href=\"/groups\">Groups</a> | \
         <a href=\"/change-password\">Change password</a> | <a href=\"/logout\">Logout</a></nav>\
         {flash_html}{body}</body></html>"
    ))
}

fn group_options(groups: &[Group], selected: Option<i64>) -> String {
    let mut out = String::new();
    for g in groups {
        let sel = if Some(g.id) == selected { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{}\"{sel}>{}</option>",
            g.id,
            escape(&g.name)
        );
    }
    out
}

fn command_form(
    action: &str,
    groups: &[Group],
    cmd: Option<&cmdvault_core::model::Command>,
) -> String {
    let (title, content, sort_order, checked, group_id) = match cmd {
        Some(c) => (
            escape(&c.title),
            escape(&c.content),
            c.sort_order,
            if c.is_execute { " checked" } else { "" },
            Some(c.group_id),
        ),
        None => (String::new(), String::new(), 0, "", None),
    };
    format!(
        "<form method=\"post\" action=\"{action}\">\
         <select name=\"group_id\">{}</select> \
         <input name=\"title\" placeholder=\"title\" value=\"{title}\"> \
         <input name=\"sort_order\" type=\"number\" value=\"{sort_order}\" size=\"4\"> \
         <label><input type=\"checkbox\" name=\"is_execute\"{checked}> execute</label><br>\
         <textarea name=\"content\" rows=\"3\" cols=\"70\" placeholder=\"command\">{content}</textarea><br>\
         <button type=\"submit\">Save</button></form>",
        group_options(groups, group_id)
    )
}

pub fn index(
    listing: &[GroupedCommands],
    groups: &[Group],
    q: Option<&str>,
    flash: Option<&str>,
) -> Html<String> {
    let mut body = format!(
        "<form method=\"get\" action=\"/\">\
         <input name=\"q\" placeholder=\"search title or content\" value=\"{}\">\
         <button type=\"submit\">Search</button> <a href=\"/\">Clear</a></form>",
        escape(q.unwrap_or(""))
    );

    for bucket in listing {
        let _ = write!(body, "<h2>{}</h2><ul>", escape(&bucket.group.name));
        for c in &bucket.commands {
            let badge = if c.is_execute { " <small>[exec]</small>" } else { "" };
            let _ = write!(
                body,
                "<li><strong>{}</strong>{badge}<pre>{}</pre>\
                 <details><summary>Edit</summary>{}</details>\
                 <a href=\"/command/delete/{}\" onclick=\"return confirm('Delete this command?')\">Delete</a></li>",
                escape(&c.title),
                escape(&c.content),
                command_form(&format!("/command/edit/{}", c.id), groups, Some(c)),
                c.id
            );
        }
        body.push_str("</ul>");
    }
    if listing.is_empty() {
        body.push_str("<p>No commands found.</p>");
    }

    let _ = write!(
        body,
        "<h2>Add command</h2>{}",
        command_form("/command/add", groups, None)
    );
    layout("Catalog", flash, &body)
}

pub fn groups(groups: &[Group], flash: Option<&str>) -> Html<String> {
    let mut body = String::from("<h2>Groups</h2><ul>");
    for g in groups {
        let _ = write!(
            body,
            "<li><form method=\"post\" action=\"/groups/edit/{}\" style=\"display:inline\">\
             <input name=\"name\" value=\"{}\"> \
             <input name=\"sort_order\" type=\"number\" value=\"{}\" size=\"4\"> \
             <button type=\"submit\">Save</button></form> \
             <a href=\"/groups/delete/{}\" onclick=\"return confirm('Delete this group and all its commands?')\">Delete</a></li>",
            g.id,
            escape(&g.name),
            g.sort_order,
            g.id
        );
    }
    body.push_str(
        "</ul><h2>Add group</h2>\
         <form method=\"post\" action=\"/groups/add\">\
         <input name=\"name\" placeholder=\"name\"> \
         <input name=\"sort_order\" type=\"number\" value=\"0\" size=\"4\"> \
         <button type=\"submit\">Add</button></form>",
    );
    layout("Groups", flash, &body)
}

pub fn login(flash: Option<&str>) -> Html<String> {
    let flash_html = flash
        .map(|m| format!("<p><em>{}</em></p>", escape(m)))
        .unwrap_or_default();
    // No nav links on the login page; nothing else is reachable yet.
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Login — cmdvault</title></head>\
         <body style=\"font-family:sans-serif;max-width:20rem;margin:4rem auto\">\
         <h1>cmdvault</h1>{flash_html}\
         <form method=\"post\" action=\"/login\">\
         <input name=\"username\" placeholder=\"username\" autofocus><br>\
         <input name=\"password\" type=\"password\" placeholder=\"password\"><br>\
         <button type=\"submit\">Login</button></form></body></html>"
    ))
}

pub fn change_password(flash: Option<&str>) -> Html<String> {
    layout(
        "Change password",
        flash,
        "<h2>Change password</h2>\
         <form method=\"post\" action=\"/change-password\">\
         <input name=\"old_password\" type=\"password\" placeholder=\"current password\"><br>\
         <input name=\"new_password\" type=\"password\" placeholder=\"new password\"><br>\
         <input name=\"confirm_password\" type=\"password\" placeholder=\"confirm new password\"><br>\
         <button type=\"submit\">Change</button></form>\
         <p>Changing the password ends all sessions; you will log in again.</p>",
    )
}
