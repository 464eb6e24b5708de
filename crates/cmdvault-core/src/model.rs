use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Command {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub sort_order: i64,
    pub is_execute: bool,
    pub group_id: i64,
}

/// One catalog bucket: a group and its commands, both already ordered by
/// `(sort_order, id)` ascending.
#[derive(Debug, Clone)]
pub struct GroupedCommands {
    pub group: Group,
    pub commands: Vec<Command>,
}

// ---------------------------------------------------------------------------
// JSON API payload
// ---------------------------------------------------------------------------

/// Entry in the `/api/list` response. Groups without commands are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGroup {
    pub group: String,
    pub commands: Vec<ApiCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCommand {
    pub title: String,
    pub content: String,
    pub is_execute: bool,
}
