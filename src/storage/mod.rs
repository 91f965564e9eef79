pub mod database;
pub mod labels;
pub mod sessions;
pub mod users;

use crate::acl::Role;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub use labels::{Label, LabelForm, LabelFormPatch};
pub use sessions::Session;
pub use users::User;

/// 索引数据库：统一管理标签、用户与会话的访问
#[derive(Clone)]
pub struct PhotoRegistry {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

impl PhotoRegistry {
    /// 创建注册中心并初始化数据库连接池
    ///
    /// # Parameters
    /// - `db_path`: 数据库文件路径
    /// - `max_connections`: 最大连接数
    pub fn new(db_path: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = database::initialize_pool(db_path, max_connections)?;
        Ok(Self { pool })
    }

    // ===============================
    // 标签
    // ===============================

    pub fn create_label(&self, name: &str, priority: i64) -> anyhow::Result<Label> {
        labels::create_label(&self.pool, name, priority)
    }

    /// 标签不存在时返回 `Ok(None)`
    pub fn label_by_uid(&self, uid: &str) -> anyhow::Result<Option<Label>> {
        labels::label_by_uid(&self.pool, uid)
    }

    pub fn list_labels(&self, count: i64, offset: i64) -> anyhow::Result<Vec<Label>> {
        labels::list_labels(&self.pool, count, offset)
    }

    pub fn save_label_form(&self, uid: &str, form: &LabelForm) -> anyhow::Result<Label> {
        labels::save_form(&self.pool, uid, form)
    }

    pub fn set_label_favorite(&self, uid: &str, favorite: bool) -> anyhow::Result<usize> {
        labels::set_favorite(&self.pool, uid, favorite)
    }

    // ===============================
    // 用户与会话
    // ===============================

    pub fn init_admin(&self, username: &str, password: &str) -> anyhow::Result<String> {
        users::init_admin(&self.pool, username, password)
    }

    pub fn create_user(&self, username: &str, role: Role, password: &str) -> anyhow::Result<User> {
        users::create_user(&self.pool, username, role, password)
    }

    pub fn verify_password(&self, username: &str, password: &str) -> anyhow::Result<Option<User>> {
        users::verify_password(&self.pool, username, password)
    }

    pub fn create_session(&self, user_uid: &str) -> anyhow::Result<String> {
        sessions::create_session(&self.pool, user_uid)
    }

    pub fn find_session(&self, id: &str) -> anyhow::Result<Option<Session>> {
        sessions::find_session(&self.pool, id)
    }

    pub fn delete_session(&self, id: &str) -> anyhow::Result<usize> {
        sessions::delete_session(&self.pool, id)
    }

    // ===============================
    // 维护
    // ===============================

    /// 删除全部表并恢复默认结构（不可逆）
    pub fn reset_schema(&self) -> anyhow::Result<()> {
        database::reset_schema(&self.pool)
    }

    /// 获取底层数据库连接（用于自定义事务或原始访问）
    pub fn get_conn(&self) -> anyhow::Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }
}
