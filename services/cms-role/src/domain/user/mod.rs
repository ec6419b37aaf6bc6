//! 用户与用户组 (由用户管理服务提供，这里只读取)

use cms_common::{UserGroupId, UserId};
use cms_errors::AppResult;
use serde::{Deserialize, Serialize};

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub login: String,
    /// 直接所属的用户组
    pub group_ids: Vec<UserGroupId>,
}

impl User {
    pub fn new(id: UserId, login: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            group_ids: Vec::new(),
        }
    }

    pub fn in_group(mut self, group_id: UserGroupId) -> Self {
        self.group_ids.push(group_id);
        self
    }
}

/// 用户组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: UserGroupId,
    pub name: String,
    pub parent_id: Option<UserGroupId>,
}

impl UserGroup {
    pub fn new(id: UserGroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: UserGroupId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// 用户/用户组查询接口
///
/// 不存在时返回 `AppError::NotFound`
#[cfg_attr(test, mockall::automock)]
pub trait UserLookup: Send + Sync {
    fn load_user(&self, id: UserId) -> AppResult<User>;

    fn load_user_group(&self, id: UserGroupId) -> AppResult<UserGroup>;
}
