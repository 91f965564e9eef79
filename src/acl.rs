use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 受保护的资源类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Labels,
    Originals,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
}

/// 用户角色，按权限从高到低排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    /// 权限矩阵：admin 全部允许；user 可修改标签，其余只读；guest 只读
    pub fn allows(self, resource: Resource, action: Action) -> bool {
        match (self, resource, action) {
            (Role::Admin, _, _) => true,
            (_, _, Action::Read) => true,
            (Role::User, Resource::Labels, Action::Update) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            "guest" => Ok(Role::Guest),
            other => Err(anyhow::anyhow!("Unknown role: {}", other)),
        }
    }
}
