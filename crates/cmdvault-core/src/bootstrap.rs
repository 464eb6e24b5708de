//! First-run bootstrap: schema, migration, admin account, seed catalog.
//!
//! Runs synchronously before the server accepts traffic. Every step is
//! independently idempotent, so restarting the process never clobbers user
//! edits. Unique-constraint races with a concurrently starting instance are
//! benign and recovered; any other storage error aborts startup.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::Result;
use crate::password;
use crate::store;

pub async fn run(pool: &SqlitePool, config: &Config) -> Result<()> {
    store::ensure_schema(pool).await?;
    store::migrate(pool).await?;
    ensure_admin(pool, config).await?;
    seed_catalog(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin account
// ---------------------------------------------------------------------------

/// Create the admin account if no user exists yet.
///
/// The password comes from `ADMIN_PASSWORD`; when unset a random one is
/// generated and logged exactly once so the operator can capture it. A fixed
/// well-known default is deliberately not used.
async fn ensure_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if users > 0 {
        return Ok(());
    }
    create_admin(pool, config).await
}

async fn create_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let (password, generated) = match &config.admin_password {
        Some(p) => (p.clone(), false),
        None => (random_password(20), true),
    };
    let hash = password::hash(&password)?;

    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(&config.admin_user)
        .bind(&hash)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {
            if generated {
                tracing::warn!(
                    username = %config.admin_user,
                    password = %password,
                    "no ADMIN_PASSWORD set; generated admin credentials (logged once)"
                );
            } else {
                tracing::info!(username = %config.admin_user, "created admin account");
            }
            Ok(())
        }
        Err(e) => {
            let err = crate::VaultError::from(e);
            // A concurrently starting instance inserted the admin first.
            if err.is_unique_violation() {
                tracing::warn!(
                    username = %config.admin_user,
                    "admin account was created concurrently; continuing"
                );
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn random_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Seed catalog
// ---------------------------------------------------------------------------

struct SeedCommand {
    title: &'static str,
    content: &'static str,
    is_execute: bool,
}

struct SeedGroup {
    name: &'static str,
    sort_order: i64,
    commands: &'static [SeedCommand],
}

const SEED_GROUPS: &[SeedGroup] = &[
    SeedGroup {
        name: "常用命令",
        sort_order: 0,
        commands: &[
            SeedCommand {
                title: "查看磁盘空间",
                content: "df -h",
                is_execute: true,
            },
            SeedCommand {
                title: "查看端口占用",
                content: "ss -tlnp | grep <port>",
                is_execute: false,
            },
        ],
    },
    SeedGroup {
        name: "Docker",
        sort_order: 1,
        commands: &[
            SeedCommand {
                title: "查看运行中的容器",
                content: "docker ps",
                is_execute: true,
            },
            SeedCommand {
                title: "清理悬空镜像",
                content: "docker image prune -f",
                is_execute: false,
            },
        ],
    },
];

/// Insert example groups and commands, but only into an empty catalog so
/// restarts never clobber operator edits.
async fn seed_catalog(pool: &SqlitePool) -> Result<()> {
    let groups: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
        .fetch_one(pool)
        .await?;
    if groups > 0 {
        return Ok(());
    }
    insert_seed_groups(pool).await
}

async fn insert_seed_groups(pool: &SqlitePool) -> Result<()> {
    for seed in SEED_GROUPS {
        let result = sqlx::query("INSERT INTO groups (name, sort_order) VALUES (?, ?)")
            .bind(seed.name)
            .bind(seed.sort_order)
            .execute(pool)
            .await;

        let group_id = match result {
            Ok(r) => r.last_insert_rowid(),
            Err(e) => {
                let err = crate::VaultError::from(e);
                if err.is_unique_violation() {
                    // A concurrent instance won the insert and will seed this
                    // group's commands; converge to its row and move on.
                    tracing::warn!(group = seed.name, "seed group inserted concurrently; skipping");
                    continue;
                }
                return Err(err);
            }
        };

        for cmd in seed.commands {
            sqlx::query(
                "INSERT INTO commands (title, content, sort_order, is_execute, group_id)
                 VALUES (?, ?, 0, ?, ?)",
            )
            .bind(cmd.title)
            .bind(cmd.content)
            .bind(cmd.is_execute)
            .bind(group_id)
            .execute(pool)
            .await?;
        }
    }

    tracing::info!("seeded example catalog");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
