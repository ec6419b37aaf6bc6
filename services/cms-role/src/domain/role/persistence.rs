//! 持久化层 (存储级) 对象
//!
//! 由 `RoleHandler` 读写，服务层负责与领域对象之间的转换

use std::collections::BTreeMap;

use cms_common::MultiLanguageText;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::policy::{PolicyId, WILDCARD};
use super::role::RoleId;

/// 限制标识符 -> 限制值
pub type LimitationMap = BTreeMap<String, Vec<String>>;

/// 存储中的策略限制
///
/// 通配时序列化为 `"*"`，否则序列化为映射 (可以为空映射 `{}`)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoredLimitations {
    Wildcard,
    #[default]
    Empty,
    Map(LimitationMap),
}

impl StoredLimitations {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    pub fn from_map(map: LimitationMap) -> Self {
        if map.is_empty() { Self::Empty } else { Self::Map(map) }
    }
}

impl Serialize for StoredLimitations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Wildcard => serializer.serialize_str(WILDCARD),
            Self::Empty => LimitationMap::new().serialize(serializer),
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for StoredLimitations {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Sentinel(String),
            Map(LimitationMap),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Sentinel(s) if s == WILDCARD => Ok(Self::Wildcard),
            Raw::Sentinel(s) => Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"\"*\" or a limitation map",
            )),
            Raw::Map(map) => Ok(Self::from_map(map)),
        }
    }
}

/// 存储中的策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPolicy {
    /// 新建时为 None，由存储层分配
    pub id: Option<PolicyId>,
    pub role_id: Option<RoleId>,
    pub module: String,
    pub function: String,
    pub limitations: StoredLimitations,
}

/// 存储中的角色
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoredRole {
    /// 新建时为 None，由存储层分配
    pub id: Option<RoleId>,
    pub identifier: String,
    pub name: MultiLanguageText,
    pub description: MultiLanguageText,
    pub policies: Vec<StoredPolicy>,
    /// 被分配的主体 ID；历史原因用户 ID 与用户组 ID 混在同一列表中
    pub group_ids: Vec<i64>,
    /// 主体 ID -> 角色分配限制 (仅 Subtree / Section)
    #[serde(default)]
    pub assignment_limitations: BTreeMap<i64, LimitationMap>,
}

/// 存储中的角色更新结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRoleUpdate {
    pub id: RoleId,
    pub identifier: String,
    pub name: MultiLanguageText,
    pub description: MultiLanguageText,
}
