use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite_migration::{Migrations, M};
use tracing::info;

/// 按依赖倒序排列，便于整体删除
pub(crate) const TABLES: &[&str] = &["sessions", "users", "labels"];

fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // M1: 标签表
        M::up(
            "CREATE TABLE IF NOT EXISTS labels (
                uid TEXT PRIMARY KEY,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 0,
                favorite INTEGER NOT NULL DEFAULT 0,
                description TEXT NOT NULL DEFAULT '',
                notes TEXT NOT NULL DEFAULT '',
                photo_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_labels_favorite ON labels(favorite, priority);",
        ),
        // M2: 用户表
        M::up(
            "CREATE TABLE IF NOT EXISTS users (
                uid TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL DEFAULT 'guest',
                password_hash TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        ),
        // M3: 会话表
        M::up(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_uid TEXT NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );",
        ),
    ])
}

/// 初始化数据库连接池并执行迁移
pub(crate) fn initialize_pool(
    db_path: &str,
    max_connections: u32,
) -> anyhow::Result<Pool<SqliteConnectionManager>> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    let pool = Pool::builder()
        .max_size(max_connections.max(1))
        .connection_timeout(std::time::Duration::from_secs(5))
        .build(manager)
        .map_err(|e| anyhow::anyhow!("Failed to initialize DB pool: {}", e))?;

    let mut conn = pool
        .get()
        .map_err(|e| anyhow::anyhow!("Failed to acquire init connection: {}", e))?;

    migrate(&mut conn)?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;",
    )?;

    info!(
        "[Database] SQLite connection initialized at: {} (Pool size: {})",
        db_path, max_connections
    );
    Ok(pool)
}

pub(crate) fn migrate(conn: &mut Connection) -> anyhow::Result<()> {
    migrations()
        .to_latest(conn)
        .map_err(|e| anyhow::anyhow!("Failed to apply database migrations: {}", e))
}

/// 删除全部表并重新建立默认结构
pub(crate) fn reset_schema(pool: &Pool<SqliteConnectionManager>) -> anyhow::Result<()> {
    let mut conn = pool.get()?;

    {
        let tx = conn.transaction()?;
        for table in TABLES {
            info!("[Database] Dropping table {}", table);
            tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", table))?;
        }
        tx.pragma_update(None, "user_version", 0)?;
        tx.commit()?;
    }

    migrate(&mut conn)
}
