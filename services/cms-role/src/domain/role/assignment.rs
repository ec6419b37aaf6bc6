//! 角色分配

use serde::{Deserialize, Serialize};

use super::limitation::Limitation;
use super::role::Role;
use crate::domain::user::{User, UserGroup};

/// 分配主体：用户或用户组 (互斥)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleSubject {
    User(User),
    UserGroup(UserGroup),
}

impl RoleSubject {
    /// 存储中使用的主体 ID
    pub fn subject_id(&self) -> i64 {
        match self {
            Self::User(user) => user.id.0,
            Self::UserGroup(group) => group.id.0,
        }
    }
}

/// 角色分配：角色 + 主体 + 可选的角色级限制 (Subtree / Section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub subject: RoleSubject,
    pub limitation: Option<Limitation>,
}

impl RoleAssignment {
    pub fn user(&self) -> Option<&User> {
        match &self.subject {
            RoleSubject::User(user) => Some(user),
            RoleSubject::UserGroup(_) => None,
        }
    }

    pub fn user_group(&self) -> Option<&UserGroup> {
        match &self.subject {
            RoleSubject::UserGroup(group) => Some(group),
            RoleSubject::User(_) => None,
        }
    }
}
