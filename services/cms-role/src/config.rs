//! 服务配置

use cms_common::MultiLanguageText;
use serde::Deserialize;

use crate::domain::role::LimitationMap;

/// 启动时创建的初始数据 (`[bootstrap]` 配置段)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub user_groups: Vec<BootstrapUserGroup>,
    #[serde(default)]
    pub roles: Vec<BootstrapRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapUserGroup {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapRole {
    pub identifier: String,
    #[serde(default)]
    pub names: MultiLanguageText,
    #[serde(default)]
    pub descriptions: MultiLanguageText,
    #[serde(default)]
    pub policies: Vec<BootstrapPolicy>,
    /// 创建后分配给这些用户组
    #[serde(default)]
    pub assign_to_groups: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapPolicy {
    pub module: String,
    pub function: String,
    /// 限制标识符 -> 限制值, 如 `{ Section = ["1"] }`
    #[serde(default)]
    pub limitations: LimitationMap,
}
