use crate::acl::Role;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::info;

use super::labels::new_uid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub uid: String,
    pub username: String,
    pub role: Role,
}

/// Argon2id 哈希，存储为 PHC 字符串
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn password_matches(stored: &str, password: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// 创建或更新管理员账号并设置密码，返回用户 UID
pub(crate) fn init_admin(
    pool: &Pool<SqliteConnectionManager>,
    username: &str,
    password: &str,
) -> anyhow::Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(anyhow::anyhow!("Admin username must not be empty"));
    }
    if password.is_empty() {
        return Err(anyhow::anyhow!("Admin password must not be empty"));
    }

    let password_hash = hash_password(password)?;
    let conn = pool.get()?;
    let uid = new_uid('u');
    conn.execute(
        "INSERT INTO users (uid, username, role, password_hash) VALUES (?1, ?2, 'admin', ?3)
         ON CONFLICT(username) DO UPDATE SET role = 'admin', password_hash = ?3",
        params![uid, username, password_hash],
    )?;

    let uid: String = conn.query_row(
        "SELECT uid FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    info!("[Users] Initial password set for {}", username);
    Ok(uid)
}

pub(crate) fn create_user(
    pool: &Pool<SqliteConnectionManager>,
    username: &str,
    role: Role,
    password: &str,
) -> anyhow::Result<User> {
    let password_hash = hash_password(password)?;
    let uid = new_uid('u');
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO users (uid, username, role, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![uid, username.trim(), role.as_str(), password_hash],
    )?;
    Ok(User {
        uid,
        username: username.trim().to_string(),
        role,
    })
}

/// 校验用户名和密码，成功时返回用户
pub(crate) fn verify_password(
    pool: &Pool<SqliteConnectionManager>,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let conn = pool.get()?;
    let row: Option<(String, String, String, String)> = conn
        .query_row(
            "SELECT uid, username, role, password_hash FROM users WHERE username = ?1",
            params![username.trim()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    let Some((uid, username, role, hash)) = row else {
        return Ok(None);
    };
    if !password_matches(&hash, password) {
        return Ok(None);
    }

    Ok(Some(User {
        uid,
        username,
        role: role.parse()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let stored = hash_password("photoprism").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(password_matches(&stored, "photoprism"));
        assert!(!password_matches(&stored, "wrong"));
        assert!(!password_matches("", "photoprism"));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn legacy_digest_format_never_matches() {
        assert!(!password_matches("abc$0123", "photoprism"));
    }
}
