//! 角色授权服务
//!
//! 负责校验、存在性检查，以及通过持久化处理器执行角色/策略/分配操作。
//! 服务本身不缓存任何数据，每次加载都会访问持久化处理器。
//!
//! 标识符唯一性检查是 "先查后写"，两步之间不是原子操作；
//! 并发写入下的唯一性由持久化处理器 (存储层唯一约束) 保证。

use std::sync::Arc;

use cms_common::{UserGroupId, UserId};
use cms_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use super::commands::*;
use super::mapper;
use super::metrics::observe;
use crate::domain::role::{
    Limitation, LimitationMap, Policy, Role, RoleAssignment, RoleHandler, RoleId, RoleSubject,
    StoredRole, StoredRoleUpdate,
};
use crate::domain::user::{User, UserGroup, UserLookup};

/// 角色授权服务
///
/// 调用方在进入服务前已完成认证；"调用方是否有权管理角色" 由外部协作者检查，
/// 失败时以 `AppError::Unauthorized` 返回。
pub struct RoleService<H, U>
where
    H: RoleHandler,
    U: UserLookup,
{
    handler: Arc<H>,
    users: Arc<U>,
}

impl<H, U> RoleService<H, U>
where
    H: RoleHandler,
    U: UserLookup,
{
    pub fn new(handler: Arc<H>, users: Arc<U>) -> Self {
        Self { handler, users }
    }

    /// 创建角色
    pub fn create_role(&self, create: RoleCreateStruct) -> AppResult<Role> {
        observe("create_role", || {
            create.validate()?;
            self.ensure_identifier_available(&create.identifier, None)?;

            let stored = self.handler.create_role(mapper::build_stored_role(create))?;
            let role = mapper::build_domain_role(stored)?;

            info!(role_id = %role.id, identifier = %role.identifier, "Role created");
            Ok(role)
        })
    }

    /// 更新角色 (标识符、名称、描述)，返回重新加载的角色
    pub fn update_role(&self, role: &Role, update: RoleUpdateStruct) -> AppResult<Role> {
        observe("update_role", || {
            ensure_role_id(role.id)?;
            update.validate()?;

            if let Some(ref identifier) = update.identifier {
                self.ensure_identifier_available(identifier, Some(role.id))?;
            }

            let loaded = self.load_stored_role(role.id)?;
            let stored_update = StoredRoleUpdate {
                id: role.id,
                identifier: update.identifier.unwrap_or(loaded.identifier),
                name: update.names.unwrap_or(loaded.name),
                description: update.descriptions.unwrap_or(loaded.description),
            };

            self.handler
                .update_role(stored_update)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, "Role updated");
            self.fetch_role(role.id)
        })
    }

    /// 为角色添加策略，返回包含新策略的角色
    pub fn add_policy(&self, role: &Role, create: PolicyCreateStruct) -> AppResult<Role> {
        observe("add_policy", || {
            ensure_role_id(role.id)?;
            create.validate()?;

            // 检查角色是否存在
            self.load_stored_role(role.id)?;

            let policy = mapper::build_stored_policy(&create.module, &create.function, &create.limitations);
            let added = self
                .handler
                .add_policy(role.id, policy)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(
                role_id = %role.id,
                policy_id = ?added.id,
                module = %create.module,
                function = %create.function,
                "Policy added"
            );
            self.fetch_role(role.id)
        })
    }

    /// 从角色移除策略，返回更新后的角色
    pub fn remove_policy(&self, role: &Role, policy: &Policy) -> AppResult<Role> {
        observe("remove_policy", || {
            ensure_role_id(role.id)?;
            if policy.id.is_unset() {
                return Err(AppError::invalid_argument("id", "Policy id cannot be empty"));
            }

            self.load_stored_role(role.id)?;

            self.handler
                .remove_policy(role.id, policy.id)
                .map_err(|e| AppError::from_persistence("policy", policy.id, e))?;

            info!(role_id = %role.id, policy_id = %policy.id, "Policy removed");
            self.fetch_role(role.id)
        })
    }

    /// 替换策略的限制集合；模块和功能不可修改
    pub fn update_policy(&self, policy: &Policy, update: PolicyUpdateStruct) -> AppResult<Policy> {
        observe("update_policy", || {
            if policy.id.is_unset() {
                return Err(AppError::invalid_argument("id", "Policy id cannot be empty"));
            }
            if policy.role_id.is_unset() {
                return Err(AppError::invalid_argument("role_id", "Policy role id cannot be empty"));
            }
            if policy.module.is_empty() {
                return Err(AppError::invalid_argument("module", "Policy module cannot be empty"));
            }
            if policy.function.is_empty() {
                return Err(AppError::invalid_argument("function", "Policy function cannot be empty"));
            }

            let mut stored = mapper::build_stored_policy(&policy.module, &policy.function, &update.limitations);
            stored.id = Some(policy.id);
            stored.role_id = Some(policy.role_id);

            self.handler
                .update_policy(stored.clone())
                .map_err(|e| AppError::from_persistence("policy", policy.id, e))?;

            info!(policy_id = %policy.id, role_id = %policy.role_id, "Policy updated");
            mapper::build_domain_policy(stored)
        })
    }

    /// 根据 ID 加载角色
    pub fn load_role(&self, id: RoleId) -> AppResult<Role> {
        observe("load_role", || self.fetch_role(id))
    }

    /// 根据标识符加载角色
    pub fn load_role_by_identifier(&self, identifier: &str) -> AppResult<Role> {
        observe("load_role_by_identifier", || {
            if identifier.is_empty() {
                return Err(AppError::invalid_argument(
                    "identifier",
                    "Role identifier cannot be empty",
                ));
            }

            debug!(identifier, "Loading role by identifier");
            let stored = self
                .handler
                .load_role_by_identifier(identifier)
                .map_err(|e| AppError::from_persistence("role", identifier, e))?;

            mapper::build_domain_role(stored)
        })
    }

    /// 加载所有角色，可能为空
    pub fn load_roles(&self) -> AppResult<Vec<Role>> {
        observe("load_roles", || {
            self.handler
                .load_roles()?
                .into_iter()
                .map(mapper::build_domain_role)
                .collect()
        })
    }

    /// 删除角色 (持久化层级联删除策略和分配关系)
    pub fn delete_role(&self, role: &Role) -> AppResult<()> {
        observe("delete_role", || {
            ensure_role_id(role.id)?;
            self.load_stored_role(role.id)?;

            self.handler
                .delete_role(role.id)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, identifier = %role.identifier, "Role deleted");
            Ok(())
        })
    }

    /// 加载用户 (含其所属用户组) 的所有策略
    pub fn load_policies_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Policy>> {
        observe("load_policies_by_user_id", || {
            if user_id.is_unset() {
                return Err(AppError::invalid_argument("user_id", "User id cannot be empty"));
            }

            // 检查用户是否存在
            let user = self.users.load_user(user_id)?;

            self.handler
                .load_policies_by_user_id(user.id.0)
                .map_err(|e| AppError::from_persistence("user", user.id, e))?
                .into_iter()
                .map(mapper::build_domain_policy)
                .collect()
        })
    }

    /// 将角色分配给用户组
    pub fn assign_role_to_user_group(
        &self,
        role: &Role,
        user_group: &UserGroup,
        limitation: Option<Limitation>,
    ) -> AppResult<()> {
        observe("assign_role_to_user_group", || {
            ensure_role_id(role.id)?;
            ensure_group_id(user_group.id)?;
            let limitation = role_limitation_map(limitation)?;
            self.users.load_user_group(user_group.id)?;

            self.handler
                .assign_role(user_group.id.0, role.id, limitation)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, user_group_id = %user_group.id, "Role assigned to user group");
            Ok(())
        })
    }

    /// 取消用户组的角色分配
    pub fn unassign_role_from_user_group(&self, role: &Role, user_group: &UserGroup) -> AppResult<()> {
        observe("unassign_role_from_user_group", || {
            ensure_role_id(role.id)?;
            ensure_group_id(user_group.id)?;

            let stored = self.load_stored_role(role.id)?;
            self.users.load_user_group(user_group.id)?;

            if !stored.group_ids.contains(&user_group.id.0) {
                return Err(AppError::invalid_argument(
                    "user_group.id",
                    "Role is not assigned to the user group",
                ));
            }

            self.handler
                .unassign_role(user_group.id.0, role.id)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, user_group_id = %user_group.id, "Role unassigned from user group");
            Ok(())
        })
    }

    /// 将角色分配给用户
    pub fn assign_role_to_user(
        &self,
        role: &Role,
        user: &User,
        limitation: Option<Limitation>,
    ) -> AppResult<()> {
        observe("assign_role_to_user", || {
            ensure_role_id(role.id)?;
            ensure_user_id(user.id)?;
            let limitation = role_limitation_map(limitation)?;
            self.users.load_user(user.id)?;

            self.handler
                .assign_role(user.id.0, role.id, limitation)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, user_id = %user.id, "Role assigned to user");
            Ok(())
        })
    }

    /// 取消用户的角色分配
    pub fn unassign_role_from_user(&self, role: &Role, user: &User) -> AppResult<()> {
        observe("unassign_role_from_user", || {
            ensure_role_id(role.id)?;
            ensure_user_id(user.id)?;

            let stored = self.load_stored_role(role.id)?;
            self.users.load_user(user.id)?;

            if !stored.group_ids.contains(&user.id.0) {
                return Err(AppError::invalid_argument(
                    "user.id",
                    "Role is not assigned to the user",
                ));
            }

            self.handler
                .unassign_role(user.id.0, role.id)
                .map_err(|e| AppError::from_persistence("role", role.id, e))?;

            info!(role_id = %role.id, user_id = %user.id, "Role unassigned from user");
            Ok(())
        })
    }

    /// 获取角色的所有分配
    ///
    /// 存储中的主体 ID 可能是用户也可能是用户组，先按用户组查找，失败再按用户查找
    pub fn get_role_assignments(&self, role: &Role) -> AppResult<Vec<RoleAssignment>> {
        observe("get_role_assignments", || {
            ensure_role_id(role.id)?;

            let stored = self.load_stored_role(role.id)?;
            let subject_ids = stored.group_ids.clone();
            let limitations = stored.assignment_limitations.clone();
            let domain_role = mapper::build_domain_role(stored)?;

            let mut assignments = Vec::with_capacity(subject_ids.len());
            for subject_id in subject_ids {
                let Some(subject) = self.resolve_subject(subject_id)? else {
                    warn!(role_id = %role.id, subject_id, "Assigned subject is neither a user group nor a user, skipping");
                    continue;
                };

                assignments.push(RoleAssignment {
                    role: domain_role.clone(),
                    subject,
                    limitation: limitations
                        .get(&subject_id)
                        .and_then(mapper::build_domain_role_limitation),
                });
            }

            Ok(assignments)
        })
    }

    /// 获取用户的角色分配
    pub fn get_role_assignments_for_user(&self, user: &User) -> AppResult<Vec<RoleAssignment>> {
        observe("get_role_assignments_for_user", || {
            ensure_user_id(user.id)?;
            self.assignments_for_subject(RoleSubject::User(user.clone()))
        })
    }

    /// 获取用户组的角色分配
    pub fn get_role_assignments_for_user_group(
        &self,
        user_group: &UserGroup,
    ) -> AppResult<Vec<RoleAssignment>> {
        observe("get_role_assignments_for_user_group", || {
            ensure_group_id(user_group.id)?;
            self.assignments_for_subject(RoleSubject::UserGroup(user_group.clone()))
        })
    }

    /// 新建角色创建请求
    pub fn new_role_create_struct(&self, identifier: impl Into<String>) -> RoleCreateStruct {
        RoleCreateStruct::new(identifier)
    }

    /// 新建策略创建请求
    pub fn new_policy_create_struct(
        &self,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> PolicyCreateStruct {
        PolicyCreateStruct::new(module, function)
    }

    pub fn new_policy_update_struct(&self) -> PolicyUpdateStruct {
        PolicyUpdateStruct::default()
    }

    pub fn new_role_update_struct(&self) -> RoleUpdateStruct {
        RoleUpdateStruct::default()
    }

    /// 不单独计入指标，供其他操作重新加载角色
    fn fetch_role(&self, id: RoleId) -> AppResult<Role> {
        ensure_role_id(id)?;
        debug!(role_id = %id, "Loading role");
        mapper::build_domain_role(self.load_stored_role(id)?)
    }

    fn load_stored_role(&self, id: RoleId) -> AppResult<StoredRole> {
        self.handler
            .load_role(id)
            .map_err(|e| AppError::from_persistence("role", id, e))
    }

    /// 标识符已被其他角色占用时返回 IllegalState
    fn ensure_identifier_available(&self, identifier: &str, owner: Option<RoleId>) -> AppResult<()> {
        match self.handler.load_role_by_identifier(identifier) {
            Ok(existing) if owner.is_some() && existing.id == owner => Ok(()),
            Ok(_) => Err(AppError::illegal_state("identifier", identifier)),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(AppError::Persistence(e)),
        }
    }

    /// 主体 ID -> 用户组或用户；两者都不存在时返回 None
    fn resolve_subject(&self, subject_id: i64) -> AppResult<Option<RoleSubject>> {
        match self.users.load_user_group(UserGroupId(subject_id)) {
            Ok(group) => return Ok(Some(RoleSubject::UserGroup(group))),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        match self.users.load_user(UserId(subject_id)) {
            Ok(user) => Ok(Some(RoleSubject::User(user))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn assignments_for_subject(&self, subject: RoleSubject) -> AppResult<Vec<RoleAssignment>> {
        let subject_id = subject.subject_id();
        let roles = self
            .handler
            .load_roles_by_group_id(subject_id)
            .map_err(|e| AppError::from_persistence("subject", subject_id, e))?;

        roles
            .into_iter()
            .map(|stored| {
                let limitation = stored
                    .assignment_limitations
                    .get(&subject_id)
                    .and_then(mapper::build_domain_role_limitation);
                Ok(RoleAssignment {
                    role: mapper::build_domain_role(stored)?,
                    subject: subject.clone(),
                    limitation,
                })
            })
            .collect()
    }
}

fn ensure_role_id(id: RoleId) -> AppResult<()> {
    if id.is_unset() {
        return Err(AppError::invalid_argument("id", "Role id cannot be empty"));
    }
    Ok(())
}

fn ensure_user_id(id: UserId) -> AppResult<()> {
    if id.is_unset() {
        return Err(AppError::invalid_argument("user.id", "User id cannot be empty"));
    }
    Ok(())
}

fn ensure_group_id(id: UserGroupId) -> AppResult<()> {
    if id.is_unset() {
        return Err(AppError::invalid_argument("user_group.id", "User group id cannot be empty"));
    }
    Ok(())
}

/// 角色分配级别的限制只允许 Subtree / Section
fn role_limitation_map(limitation: Option<Limitation>) -> AppResult<Option<LimitationMap>> {
    let Some(limitation) = limitation else {
        return Ok(None);
    };
    let identifier = limitation.identifier.normalized();

    if !identifier.is_role_limitation() {
        return Err(AppError::invalid_argument(
            "identifier",
            format!(
                "Limitation '{}' is not allowed on role assignment",
                identifier
            ),
        ));
    }

    Ok(Some(LimitationMap::from([(
        identifier.as_str().to_string(),
        limitation.values,
    )])))
}
