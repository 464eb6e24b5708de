//! Catalog service: CRUD, search, and grouping over groups and commands.
//!
//! Every operation takes the pool explicitly. Reads are single bounded
//! queries; the only multi-statement write is the cascading group delete,
//! which runs in one transaction so the group and its commands go together
//! or not at all.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::error::{Result, VaultError};
use crate::model::{ApiCommand, ApiGroup, Command, Group, GroupedCommands};

/// Mutable fields of a command, shared by add and edit.
#[derive(Debug, Clone)]
pub struct CommandInput {
    pub group_id: i64,
    pub title: String,
    pub content: String,
    pub sort_order: i64,
    pub is_execute: bool,
}

// ---------------------------------------------------------------------------
// Read path
// ---------------------------------------------------------------------------

/// All groups ordered by `(sort_order, id)` ascending, independent of any
/// search filter. Backs the move-to-group selector on the forms.
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    let groups =
        sqlx::query_as("SELECT id, name, sort_order FROM groups ORDER BY sort_order, id")
            .fetch_all(pool)
            .await?;
    Ok(groups)
}

/// The grouped catalog view.
///
/// Without a search term every group appears, empty ones included, each with
/// its commands ordered by `(sort_order, id)`. With a term, only commands
/// whose title or content contains it as a case-sensitive substring are
/// returned, bucketed under their owning group; groups without a match are
/// omitted. Group names are never matched.
pub async fn list(pool: &SqlitePool, search: Option<&str>) -> Result<Vec<GroupedCommands>> {
    let search = search.map(str::trim).filter(|q| !q.is_empty());

    let commands: Vec<Command> = match search {
        // instr() is a byte-wise substring test, unlike LIKE which folds
        // ASCII case.
        Some(q) => {
            sqlx::query_as(
                "SELECT id, title, content, sort_order, is_execute, group_id
                 FROM commands
                 WHERE instr(title, ?1) > 0 OR instr(content, ?1) > 0
                 ORDER BY sort_order, id",
            )
            .bind(q)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, title, content, sort_order, is_execute, group_id
                 FROM commands ORDER BY sort_order, id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    let mut by_group: HashMap<i64, Vec<Command>> = HashMap::new();
    for cmd in commands {
        by_group.entry(cmd.group_id).or_default().push(cmd);
    }

    let filtered = search.is_some();
    let listing = list_groups(pool)
        .await?
        .into_iter()
        .filter_map(|group| {
            let commands = by_group.remove(&group.id).unwrap_or_default();
            if filtered && commands.is_empty() {
                None
            } else {
                Some(GroupedCommands { group, commands })
            }
        })
        .collect();

    Ok(listing)
}

/// The `/api/list` payload: non-empty groups in catalog order, each command
/// reduced to what a consuming shell helper needs.
pub async fn api_listing(pool: &SqlitePool) -> Result<Vec<ApiGroup>> {
    let listing = list(pool, None).await?;
    Ok(listing
        .into_iter()
        .filter(|g| !g.commands.is_empty())
        .map(|g| ApiGroup {
            group: g.group.name,
            commands: g
                .commands
                .into_iter()
                .map(|c| ApiCommand {
                    title: c.title,
                    content: c.content,
                    is_execute: c.is_execute,
                })
                .collect(),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Command write path
// ---------------------------------------------------------------------------

pub async fn add_command(pool: &SqlitePool, input: CommandInput) -> Result<Command> {
    let input = validated(input)?;
    ensure_group_exists(pool, input.group_id).await?;

    let id = sqlx::query(
        "INSERT INTO commands (title, content, sort_order, is_execute, group_id)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.sort_order)
    .bind(input.is_execute)
    .bind(input.group_id)
    .execute(pool)
    .await?
    .last_insert_rowid();

    fetch_command(pool, id).await
}

/// Full replace of a command's mutable fields.
pub async fn edit_command(pool: &SqlitePool, id: i64, input: CommandInput) -> Result<Command> {
    let input = validated(input)?;
    ensure_group_exists(pool, input.group_id).await?;

    let affected = sqlx::query(
        "UPDATE commands SET title = ?, content = ?, sort_order = ?, is_execute = ?, group_id = ?
         WHERE id = ?",
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.sort_order)
    .bind(input.is_execute)
    .bind(input.group_id)
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(VaultError::CommandNotFound(id));
    }
    fetch_command(pool, id).await
}

pub async fn delete_command(pool: &SqlitePool, id: i64) -> Result<()> {
    let affected = sqlx::query("DELETE FROM commands WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if affected == 0 {
        return Err(VaultError::CommandNotFound(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Group write path
// ---------------------------------------------------------------------------

pub async fn add_group(pool: &SqlitePool, name: &str, sort_order: i64) -> Result<Group> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VaultError::validation("group name must not be empty"));
    }
    ensure_name_free(pool, name, None).await?;

    let result = sqlx::query("INSERT INTO groups (name, sort_order) VALUES (?, ?)")
        .bind(name)
        .bind(sort_order)
        .execute(pool)
        .await;

    let id = match result {
        Ok(r) => r.last_insert_rowid(),
        // The pre-check races against concurrent inserts; the unique
        // constraint is the backstop.
        Err(e) => {
            let err = VaultError::from(e);
            if err.is_unique_violation() {
                return Err(VaultError::GroupExists(name.to_string()));
            }
            return Err(err);
        }
    };

    fetch_group(pool, id).await
}

pub async fn edit_group(pool: &SqlitePool, id: i64, name: &str, sort_order: i64) -> Result<Group> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VaultError::validation("group name must not be empty"));
    }
    ensure_name_free(pool, name, Some(id)).await?;

    let affected = sqlx::query("UPDATE groups SET name = ?, sort_order = ? WHERE id = ?")
        .bind(name)
        .bind(sort_order)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(VaultError::GroupNotFound(id));
    }
    fetch_group(pool, id).await
}

/// Delete a group and every command it owns, atomically.
///
/// Cascade is intentional and destructive; the surrounding interface is
/// expected to warn before calling.
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(VaultError::GroupNotFound(id));
    }

    sqlx::query("DELETE FROM commands WHERE group_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validated(mut input: CommandInput) -> Result<CommandInput> {
    input.title = input.title.trim().to_string();
    input.content = input.content.trim().to_string();
    if input.title.is_empty() {
        return Err(VaultError::validation("title must not be empty"));
    }
    if input.content.is_empty() {
        return Err(VaultError::validation("content must not be empty"));
    }
    Ok(input)
}

async fn ensure_group_exists(pool: &SqlitePool, group_id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE id = ?)")
        .bind(group_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(VaultError::validation(format!(
            "group {group_id} does not exist"
        )));
    }
    Ok(())
}

async fn ensure_name_free(pool: &SqlitePool, name: &str, exclude: Option<i64>) -> Result<()> {
    let taken: bool = match exclude {
        Some(id) => {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE name = ? AND id != ?)")
                .bind(name)
                .bind(id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM groups WHERE name = ?)")
                .bind(name)
                .fetch_one(pool)
                .await?
        }
    };
    if taken {
        return Err(VaultError::GroupExists(name.to_string()));
    }
    Ok(())
}

async fn fetch_command(pool: &SqlitePool, id: i64) -> Result<Command> {
    let cmd = sqlx::query_as(
        "SELECT id, title, content, sort_order, is_execute, group_id FROM commands WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    cmd.ok_or(VaultError::CommandNotFound(id))
}

async fn fetch_group(pool: &SqlitePool, id: i64) -> Result<Group> {
    let group = sqlx::query_as("SELECT id, name, sort_order FROM groups WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    group.ok_or(VaultError::GroupNotFound(id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store;

    async fn pool() -> SqlitePool {
        let pool = store::connect_memory().await;
        store::ensure_schema(&pool).await.unwrap();
        pool
    }

    fn input(group_id: i64, title: &str, content: &str) -> CommandInput {
        CommandInput {
            group_id,
            title: title.to_string(),
            content: content.to_string(),
            sort_order: 0,
            is_execute: false,
        }
    }

    #[tokio::test]
    async fn list_orders_groups_and_commands_by_sort_order_then_id() {
        let pool = pool().await;
        let late = add_group(&pool, "late", 5).await.unwrap();
        let early = add_group(&pool, "early", 1).await.unwrap();
        // Same sort_order: the earlier id wins the tie.
        let tie_a = add_group(&pool, "tie-a", 3).await.unwrap();
        let tie_b = add_group(&pool, "tie-b", 3).await.unwrap();

        let mut second = input(early.id, "second", "echo 2");
        second.sort_order = 2;
        add_command(&pool, second).await.unwrap();
        let mut first = input(early.id, "first", "echo 1");
        first.sort_order = 1;
        add_command(&pool, first).await.unwrap();

        let listing = list(&pool, None).await.unwrap();
        let names: Vec<&str> = listing.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names, ["early", "tie-a", "tie-b", "late"]);
        assert!(tie_a.id < tie_b.id);

        let titles: Vec<&str> = listing[0].commands.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        // Empty groups are still present without a search term.
        assert!(listing[3].commands.is_empty());
        assert_eq!(listing[3].group.id, late.id);
    }

    #[tokio::test]
    async fn search_matches_title_or_content_case_sensitively() {
        let pool = pool().await;
        let g = add_group(&pool, "docker", 0).await.unwrap();
        add_command(&pool, input(g.id, "Restart stack", "docker compose up -d"))
            .await
            .unwrap();
        add_command(&pool, input(g.id, "Prune", "docker system prune"))
            .await
            .unwrap();
        add_command(&pool, input(g.id, "Disk usage", "df -h"))
            .await
            .unwrap();

        let hits = list(&pool, Some("docker")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].commands.len(), 2);

        // Case-sensitive: "Docker" matches nothing even though the group is
        // named "docker" — group names are out of search scope.
        let hits = list(&pool, Some("Docker")).await.unwrap();
        assert!(hits.is_empty());

        // Title matches count too.
        let hits = list(&pool, Some("Restart")).await.unwrap();
        assert_eq!(hits[0].commands.len(), 1);
        assert_eq!(hits[0].commands[0].title, "Restart stack");
    }

    #[tokio::test]
    async fn search_omits_groups_without_matches() {
        let pool = pool().await;
        let hit = add_group(&pool, "net", 0).await.unwrap();
        let miss = add_group(&pool, "fs", 1).await.unwrap();
        add_command(&pool, input(hit.id, "ports", "ss -tlnp")).await.unwrap();
        add_command(&pool, input(miss.id, "usage", "du -sh .")).await.unwrap();

        let hits = list(&pool, Some("tlnp")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].group.name, "net");
    }

    #[tokio::test]
    async fn blank_search_term_is_treated_as_no_filter() {
        let pool = pool().await;
        add_group(&pool, "empty", 0).await.unwrap();
        let listing = list(&pool, Some("   ")).await.unwrap();
        assert_eq!(listing.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_group_name_is_a_conflict_and_no_op() {
        let pool = pool().await;
        add_group(&pool, "git", 0).await.unwrap();
        let err = add_group(&pool, "git", 7).await.unwrap_err();
        assert!(matches!(err, VaultError::GroupExists(_)));

        let groups = list_groups(&pool).await.unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[tokio::test]
    async fn edit_group_rejects_rename_onto_existing_name_but_allows_self() {
        let pool = pool().await;
        let a = add_group(&pool, "a", 0).await.unwrap();
        add_group(&pool, "b", 1).await.unwrap();

        let err = edit_group(&pool, a.id, "b", 0).await.unwrap_err();
        assert!(matches!(err, VaultError::GroupExists(_)));

        // Re-saving under its own name only changes the sort order.
        let a = edit_group(&pool, a.id, "a", 9).await.unwrap();
        assert_eq!(a.sort_order, 9);
    }

    #[tokio::test]
    async fn delete_group_cascades_to_owned_commands() {
        let pool = pool().await;
        let g = add_group(&pool, "doomed", 0).await.unwrap();
        let keep = add_group(&pool, "kept", 1).await.unwrap();
        add_command(&pool, input(g.id, "one", "echo 1")).await.unwrap();
        add_command(&pool, input(g.id, "two", "echo 2")).await.unwrap();
        add_command(&pool, input(keep.id, "three", "echo 3")).await.unwrap();

        delete_group(&pool, g.id).await.unwrap();

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commands WHERE group_id = ?")
            .bind(g.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);

        let listing = list(&pool, None).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].group.name, "kept");
        assert_eq!(listing[0].commands.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_entities_signal_not_found() {
        let pool = pool().await;
        assert!(matches!(
            delete_group(&pool, 42).await.unwrap_err(),
            VaultError::GroupNotFound(42)
        ));
        assert!(matches!(
            delete_command(&pool, 42).await.unwrap_err(),
            VaultError::CommandNotFound(42)
        ));
    }

    #[tokio::test]
    async fn add_command_requires_existing_group_and_leaves_catalog_unchanged() {
        let pool = pool().await;
        let err = add_command(&pool, input(99, "t", "c")).await.unwrap_err();
        assert!(matches!(err, VaultError::Validation(_)));

        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commands")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn add_command_rejects_blank_fields() {
        let pool = pool().await;
        let g = add_group(&pool, "g", 0).await.unwrap();
        assert!(add_command(&pool, input(g.id, "  ", "c")).await.is_err());
        assert!(add_command(&pool, input(g.id, "t", "\n\t")).await.is_err());
    }

    #[tokio::test]
    async fn edit_command_replaces_all_fields_including_group() {
        let pool = pool().await;
        let a = add_group(&pool, "a", 0).await.unwrap();
        let b = add_group(&pool, "b", 1).await.unwrap();
        let cmd = add_command(&pool, input(a.id, "old", "echo old")).await.unwrap();

        let updated = edit_command(
            &pool,
            cmd.id,
            CommandInput {
                group_id: b.id,
                title: "new".to_string(),
                content: "echo new".to_string(),
                sort_order: 4,
                is_execute: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.group_id, b.id);
        assert_eq!(updated.title, "new");
        assert_eq!(updated.sort_order, 4);
        assert!(updated.is_execute);
    }

    #[tokio::test]
    async fn edit_command_on_missing_id_is_not_found() {
        let pool = pool().await;
        let g = add_group(&pool, "g", 0).await.unwrap();
        let err = edit_command(&pool, 123, input(g.id, "t", "c")).await.unwrap_err();
        assert!(matches!(err, VaultError::CommandNotFound(123)));
    }

    #[tokio::test]
    async fn api_listing_omits_empty_groups_and_keeps_order() {
        let pool = pool().await;
        let used = add_group(&pool, "used", 2).await.unwrap();
        add_group(&pool, "unused", 1).await.unwrap();
        let first = add_group(&pool, "first", 0).await.unwrap();

        let mut exec = input(used.id, "disk", "df -h");
        exec.is_execute = true;
        add_command(&pool, exec).await.unwrap();
        add_command(&pool, input(first.id, "ports", "ss -tlnp")).await.unwrap();

        let api = api_listing(&pool).await.unwrap();
        let names: Vec<&str> = api.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(names, ["first", "used"]);
        assert!(api[1].commands[0].is_execute);
        assert!(!api[0].commands[0].is_execute);
    }
}
