//! 角色实体

use cms_common::MultiLanguageText;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use super::policy::{Policy, PolicyId};

/// 角色 ID (由存储层分配)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct RoleId(pub i64);

impl RoleId {
    /// 未分配的 ID (非正数) 视为空
    pub fn is_unset(&self) -> bool {
        self.0 <= 0
    }
}

impl std::str::FromStr for RoleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// 角色实体
///
/// 角色独占其策略，删除角色时由持久化层级联删除策略和分配关系
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// 全局唯一标识符
    pub identifier: String,
    /// 存储层不记录主语言，始终为 None
    pub main_language_code: Option<String>,
    pub names: MultiLanguageText,
    pub descriptions: MultiLanguageText,
    pub policies: Vec<Policy>,
}

impl Role {
    /// 指定语言的名称
    pub fn name(&self, language_code: &str) -> Option<&str> {
        self.names.get(language_code).map(String::as_str)
    }

    /// 指定语言的描述
    pub fn description(&self, language_code: &str) -> Option<&str> {
        self.descriptions.get(language_code).map(String::as_str)
    }

    pub fn policy(&self, id: PolicyId) -> Option<&Policy> {
        self.policies.iter().find(|p| p.id == id)
    }
}
