//! 角色持久化处理器接口

use cms_errors::PersistenceError;

use super::persistence::{LimitationMap, StoredPolicy, StoredRole, StoredRoleUpdate};
use super::policy::PolicyId;
use super::role::RoleId;

/// 持久化处理器结果
pub type HandlerResult<T> = Result<T, PersistenceError>;

/// 角色持久化处理器
///
/// 所有 "不存在" 情况必须返回 `PersistenceError::NotFound`。
/// 标识符唯一性的最终保证在此层 (服务层只做先查后写的预检查)。
#[cfg_attr(test, mockall::automock)]
pub trait RoleHandler: Send + Sync {
    /// 创建角色 (连同其策略)，返回带有存储 ID 的角色
    fn create_role(&self, role: StoredRole) -> HandlerResult<StoredRole>;

    /// 更新角色标识符、名称与描述
    fn update_role(&self, update: StoredRoleUpdate) -> HandlerResult<()>;

    fn load_role(&self, id: RoleId) -> HandlerResult<StoredRole>;

    fn load_role_by_identifier(&self, identifier: &str) -> HandlerResult<StoredRole>;

    fn load_roles(&self) -> HandlerResult<Vec<StoredRole>>;

    /// 删除角色，级联删除其策略和分配关系
    fn delete_role(&self, id: RoleId) -> HandlerResult<()>;

    /// 为角色添加策略，返回带有存储 ID 的策略
    fn add_policy(&self, role_id: RoleId, policy: StoredPolicy) -> HandlerResult<StoredPolicy>;

    fn remove_policy(&self, role_id: RoleId, policy_id: PolicyId) -> HandlerResult<()>;

    /// 替换策略的限制集合
    fn update_policy(&self, policy: StoredPolicy) -> HandlerResult<()>;

    /// 将角色分配给主体 (用户或用户组 ID)
    fn assign_role(
        &self,
        subject_id: i64,
        role_id: RoleId,
        limitation: Option<LimitationMap>,
    ) -> HandlerResult<()>;

    fn unassign_role(&self, subject_id: i64, role_id: RoleId) -> HandlerResult<()>;

    /// 加载直接分配给该主体 ID 的角色
    fn load_roles_by_group_id(&self, subject_id: i64) -> HandlerResult<Vec<StoredRole>>;

    /// 加载用户自身及其所属用户组的全部策略
    fn load_policies_by_user_id(&self, user_id: i64) -> HandlerResult<Vec<StoredPolicy>>;
}
