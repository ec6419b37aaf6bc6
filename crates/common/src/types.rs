//! 通用类型定义

use std::collections::BTreeMap;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 用户 ID (由用户管理服务分配)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct UserId(pub i64);

impl UserId {
    /// 未分配的 ID (非正数) 视为空
    pub fn is_unset(&self) -> bool {
        self.0 <= 0
    }
}

/// 用户组 ID
///
/// 与 `UserId` 共享同一个内容对象 ID 空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct UserGroupId(pub i64);

impl UserGroupId {
    pub fn is_unset(&self) -> bool {
        self.0 <= 0
    }
}

/// 语言代码, 如 "eng-GB"
pub type LanguageCode = String;

/// 多语言文本 (语言代码 -> 文本)
pub type MultiLanguageText = BTreeMap<LanguageCode, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_ids() {
        assert!(UserId(0).is_unset());
        assert!(UserGroupId(-1).is_unset());
        assert!(!UserId(14).is_unset());
    }

    #[test]
    fn test_display() {
        assert_eq!(UserGroupId(12).to_string(), "12");
    }
}
