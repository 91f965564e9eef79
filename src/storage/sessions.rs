use crate::acl::Role;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

/// 已登录会话（包含所属用户信息）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub user_uid: String,
    pub username: String,
    pub role: Role,
}

pub(crate) fn create_session(
    pool: &Pool<SqliteConnectionManager>,
    user_uid: &str,
) -> anyhow::Result<String> {
    let id = Uuid::new_v4().simple().to_string();
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO sessions (id, user_uid) VALUES (?1, ?2)",
        params![id, user_uid],
    )?;
    Ok(id)
}

pub(crate) fn find_session(
    pool: &Pool<SqliteConnectionManager>,
    id: &str,
) -> anyhow::Result<Option<Session>> {
    let conn = pool.get()?;
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT s.user_uid, u.username, u.role
             FROM sessions s JOIN users u ON u.uid = s.user_uid
             WHERE s.id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match row {
        Some((user_uid, username, role)) => Ok(Some(Session {
            id: id.to_string(),
            user_uid,
            username,
            role: role.parse()?,
        })),
        None => Ok(None),
    }
}

pub(crate) fn delete_session(pool: &Pool<SqliteConnectionManager>, id: &str) -> anyhow::Result<usize> {
    let conn = pool.get()?;
    Ok(conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?)
}
