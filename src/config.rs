use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// 应用配置总结构
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub events: EventSettings,
}

/// 服务相关配置（监听地址、端口）
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// 数据库配置（SQLite 文件路径及连接池大小）
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// 媒体目录配置
#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// 原始照片与视频的根目录
    pub originals_path: PathBuf,
    /// 附属文件（json / yml 元数据、转码视频）目录
    pub sidecar_path: PathBuf,
    /// 相册 yml 备份目录
    pub albums_path: PathBuf,
}

/// 鉴权配置
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// 公开模式：所有请求视为管理员，不校验会话
    pub public: bool,
    pub admin_user: String,
    /// 为空表示不设置初始管理员密码
    #[serde(default)]
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventSettings {
    /// 每个订阅者的事件队列容量
    pub queue_capacity: usize,
}

impl Settings {
    /// 加载配置：支持默认值、可选配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 2342)?
            .set_default("database.url", "photo.db")?
            .set_default("database.max_connections", 8)?
            .set_default("storage.originals_path", "./storage/originals")?
            .set_default("storage.sidecar_path", "./storage/sidecar")?
            .set_default("storage.albums_path", "./storage/albums")?
            .set_default("auth.public", false)?
            .set_default("auth.admin_user", "admin")?
            .set_default("auth.admin_password", "")?
            .set_default("events.queue_capacity", 64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PHOTO").separator("__"));

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// `admin_password` 非空时返回
    pub fn admin_password(&self) -> Option<&str> {
        let password = self.auth.admin_password.trim();
        (!password.is_empty()).then_some(password)
    }
}
