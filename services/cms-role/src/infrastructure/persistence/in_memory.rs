//! 内存持久化实现
//!
//! 用于测试和单机启动；存储层语义 (ID 分配、级联删除、标识符唯一) 与数据库实现一致

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use cms_common::{UserGroupId, UserId};
use cms_errors::{AppError, AppResult, PersistenceError};

use crate::domain::role::{
    HandlerResult, LimitationMap, PolicyId, RoleHandler, RoleId, StoredPolicy, StoredRole,
    StoredRoleUpdate,
};
use crate::domain::user::{User, UserGroup, UserLookup};

fn poisoned<T>(_: T) -> PersistenceError {
    PersistenceError::backend("In-memory store lock poisoned")
}

/// 内存用户目录
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, User>>,
    groups: RwLock<HashMap<UserGroupId, UserGroup>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) -> AppResult<()> {
        self.users.write().map_err(poisoned)?.insert(user.id, user);
        Ok(())
    }

    pub fn add_user_group(&self, group: UserGroup) -> AppResult<()> {
        self.groups.write().map_err(poisoned)?.insert(group.id, group);
        Ok(())
    }

    /// 用户自身 ID + 所属用户组及其所有上级用户组 ID
    pub fn subject_ids_for_user(&self, user_id: UserId) -> HandlerResult<Vec<i64>> {
        let users = self.users.read().map_err(poisoned)?;
        let groups = self.groups.read().map_err(poisoned)?;

        let user = users
            .get(&user_id)
            .ok_or_else(|| PersistenceError::not_found("user", user_id))?;

        let mut subject_ids = vec![user.id.0];
        let mut visited = BTreeSet::new();
        let mut pending: Vec<UserGroupId> = user.group_ids.clone();

        while let Some(group_id) = pending.pop() {
            if !visited.insert(group_id) {
                continue;
            }
            subject_ids.push(group_id.0);
            if let Some(parent_id) = groups.get(&group_id).and_then(|g| g.parent_id) {
                pending.push(parent_id);
            }
        }

        Ok(subject_ids)
    }
}

impl UserLookup for InMemoryUserDirectory {
    fn load_user(&self, id: UserId) -> AppResult<User> {
        self.users
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user", id))
    }

    fn load_user_group(&self, id: UserGroupId) -> AppResult<UserGroup> {
        self.groups
            .read()
            .map_err(poisoned)?
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user group", id))
    }
}

#[derive(Default)]
struct State {
    last_role_id: i64,
    last_policy_id: i64,
    roles: BTreeMap<RoleId, StoredRole>,
}

impl State {
    fn role_mut(&mut self, id: RoleId) -> HandlerResult<&mut StoredRole> {
        self.roles
            .get_mut(&id)
            .ok_or_else(|| PersistenceError::not_found("role", id))
    }

    fn identifier_taken(&self, identifier: &str, except: Option<RoleId>) -> bool {
        self.roles
            .values()
            .any(|r| r.identifier == identifier && r.id != except)
    }

    fn assign_policy_ids(&mut self, role_id: RoleId, mut policy: StoredPolicy) -> StoredPolicy {
        self.last_policy_id += 1;
        policy.id = Some(PolicyId(self.last_policy_id));
        policy.role_id = Some(role_id);
        policy
    }
}

/// 内存角色持久化处理器
pub struct InMemoryRoleHandler {
    state: Mutex<State>,
    directory: Arc<InMemoryUserDirectory>,
}

impl InMemoryRoleHandler {
    pub fn new(directory: Arc<InMemoryUserDirectory>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            directory,
        }
    }

    fn state(&self) -> HandlerResult<MutexGuard<'_, State>> {
        self.state.lock().map_err(poisoned)
    }
}

impl RoleHandler for InMemoryRoleHandler {
    fn create_role(&self, mut role: StoredRole) -> HandlerResult<StoredRole> {
        let mut state = self.state()?;

        // 存储层唯一约束
        if state.identifier_taken(&role.identifier, None) {
            return Err(PersistenceError::backend(format!(
                "Unique constraint violated: role identifier '{}'",
                role.identifier
            )));
        }

        state.last_role_id += 1;
        let id = RoleId(state.last_role_id);
        role.id = Some(id);
        role.policies = std::mem::take(&mut role.policies)
            .into_iter()
            .map(|p| state.assign_policy_ids(id, p))
            .collect();

        state.roles.insert(id, role.clone());
        Ok(role)
    }

    fn update_role(&self, update: StoredRoleUpdate) -> HandlerResult<()> {
        let mut state = self.state()?;

        if state.identifier_taken(&update.identifier, Some(update.id)) {
            return Err(PersistenceError::backend(format!(
                "Unique constraint violated: role identifier '{}'",
                update.identifier
            )));
        }

        let role = state.role_mut(update.id)?;
        role.identifier = update.identifier;
        role.name = update.name;
        role.description = update.description;
        Ok(())
    }

    fn load_role(&self, id: RoleId) -> HandlerResult<StoredRole> {
        self.state()?
            .roles
            .get(&id)
            .cloned()
            .ok_or_else(|| PersistenceError::not_found("role", id))
    }

    fn load_role_by_identifier(&self, identifier: &str) -> HandlerResult<StoredRole> {
        self.state()?
            .roles
            .values()
            .find(|r| r.identifier == identifier)
            .cloned()
            .ok_or_else(|| PersistenceError::not_found("role", identifier))
    }

    fn load_roles(&self) -> HandlerResult<Vec<StoredRole>> {
        Ok(self.state()?.roles.values().cloned().collect())
    }

    fn delete_role(&self, id: RoleId) -> HandlerResult<()> {
        // 策略与分配关系随角色一起删除
        self.state()?
            .roles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::not_found("role", id))
    }

    fn add_policy(&self, role_id: RoleId, policy: StoredPolicy) -> HandlerResult<StoredPolicy> {
        let mut state = self.state()?;
        state.role_mut(role_id)?;

        let policy = state.assign_policy_ids(role_id, policy);
        state.role_mut(role_id)?.policies.push(policy.clone());
        Ok(policy)
    }

    fn remove_policy(&self, role_id: RoleId, policy_id: PolicyId) -> HandlerResult<()> {
        let mut state = self.state()?;
        let role = state.role_mut(role_id)?;

        let index = role
            .policies
            .iter()
            .position(|p| p.id == Some(policy_id))
            .ok_or_else(|| PersistenceError::not_found("policy", policy_id))?;
        role.policies.remove(index);
        Ok(())
    }

    fn update_policy(&self, policy: StoredPolicy) -> HandlerResult<()> {
        let (Some(policy_id), Some(role_id)) = (policy.id, policy.role_id) else {
            return Err(PersistenceError::backend("Policy update without id or role id"));
        };

        let mut state = self.state()?;
        let stored = state
            .role_mut(role_id)?
            .policies
            .iter_mut()
            .find(|p| p.id == Some(policy_id))
            .ok_or_else(|| PersistenceError::not_found("policy", policy_id))?;

        stored.limitations = policy.limitations;
        Ok(())
    }

    fn assign_role(
        &self,
        subject_id: i64,
        role_id: RoleId,
        limitation: Option<LimitationMap>,
    ) -> HandlerResult<()> {
        let mut state = self.state()?;
        let role = state.role_mut(role_id)?;

        if !role.group_ids.contains(&subject_id) {
            role.group_ids.push(subject_id);
        }
        match limitation {
            Some(limitation) => {
                role.assignment_limitations.insert(subject_id, limitation);
            }
            None => {
                role.assignment_limitations.remove(&subject_id);
            }
        }
        Ok(())
    }

    fn unassign_role(&self, subject_id: i64, role_id: RoleId) -> HandlerResult<()> {
        let mut state = self.state()?;
        let role = state.role_mut(role_id)?;

        role.group_ids.retain(|id| *id != subject_id);
        role.assignment_limitations.remove(&subject_id);
        Ok(())
    }

    fn load_roles_by_group_id(&self, subject_id: i64) -> HandlerResult<Vec<StoredRole>> {
        Ok(self
            .state()?
            .roles
            .values()
            .filter(|r| r.group_ids.contains(&subject_id))
            .cloned()
            .collect())
    }

    fn load_policies_by_user_id(&self, user_id: i64) -> HandlerResult<Vec<StoredPolicy>> {
        let subject_ids = self.directory.subject_ids_for_user(UserId(user_id))?;

        Ok(self
            .state()?
            .roles
            .values()
            .filter(|r| r.group_ids.iter().any(|id| subject_ids.contains(id)))
            .flat_map(|r| r.policies.iter().cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::StoredLimitations;

    fn handler() -> InMemoryRoleHandler {
        InMemoryRoleHandler::new(Arc::new(InMemoryUserDirectory::new()))
    }

    fn new_role(identifier: &str) -> StoredRole {
        StoredRole {
            identifier: identifier.to_string(),
            ..Default::default()
        }
    }

    fn new_policy(module: &str, function: &str) -> StoredPolicy {
        StoredPolicy {
            id: None,
            role_id: None,
            module: module.to_string(),
            function: function.to_string(),
            limitations: StoredLimitations::Empty,
        }
    }

    #[test]
    fn test_create_assigns_ids() {
        let handler = handler();
        let mut role = new_role("editor");
        role.policies.push(new_policy("content", "read"));

        let created = handler.create_role(role).unwrap();
        assert_eq!(created.id, Some(RoleId(1)));
        assert_eq!(created.policies[0].id, Some(PolicyId(1)));
        assert_eq!(created.policies[0].role_id, Some(RoleId(1)));

        let second = handler.create_role(new_role("member")).unwrap();
        assert_eq!(second.id, Some(RoleId(2)));
    }

    #[test]
    fn test_unique_identifier_constraint() {
        let handler = handler();
        handler.create_role(new_role("editor")).unwrap();

        let err = handler.create_role(new_role("editor")).unwrap_err();
        assert!(matches!(err, PersistenceError::Backend(_)));
    }

    #[test]
    fn test_delete_cascades() {
        let handler = handler();
        let role = handler.create_role(new_role("editor")).unwrap();
        let id = role.id.unwrap();
        handler.add_policy(id, new_policy("content", "read")).unwrap();
        handler.assign_role(12, id, None).unwrap();

        handler.delete_role(id).unwrap();

        assert!(handler.load_role(id).unwrap_err().is_not_found());
        assert!(handler.load_roles_by_group_id(12).unwrap().is_empty());
        assert!(handler.delete_role(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_policy_replaces_limitations_only() {
        let handler = handler();
        let id = handler.create_role(new_role("editor")).unwrap().id.unwrap();
        let added = handler.add_policy(id, new_policy("content", "read")).unwrap();

        let mut update = new_policy("section", "view");
        update.id = added.id;
        update.role_id = Some(id);
        update.limitations = StoredLimitations::Map([("Section".to_string(), vec!["1".to_string()])].into());
        handler.update_policy(update).unwrap();

        let policy = &handler.load_role(id).unwrap().policies[0];
        assert_eq!(policy.module, "content");
        assert_eq!(policy.function, "read");
        assert!(matches!(policy.limitations, StoredLimitations::Map(_)));
    }

    #[test]
    fn test_assignment_limitation_replaced_on_reassign() {
        let handler = handler();
        let id = handler.create_role(new_role("editor")).unwrap().id.unwrap();

        handler
            .assign_role(12, id, Some([("Subtree".to_string(), vec!["/1/2/".to_string()])].into()))
            .unwrap();
        handler.assign_role(12, id, None).unwrap();

        let role = handler.load_role(id).unwrap();
        assert_eq!(role.group_ids, vec![12]);
        assert!(role.assignment_limitations.is_empty());
    }

    #[test]
    fn test_subject_ids_include_ancestor_groups() {
        let directory = InMemoryUserDirectory::new();
        directory.add_user_group(UserGroup::new(UserGroupId(4), "Users")).unwrap();
        directory
            .add_user_group(UserGroup::new(UserGroupId(12), "Editors").with_parent(UserGroupId(4)))
            .unwrap();
        directory
            .add_user(User::new(UserId(14), "admin").in_group(UserGroupId(12)))
            .unwrap();

        assert_eq!(directory.subject_ids_for_user(UserId(14)).unwrap(), vec![14, 12, 4]);
        assert!(directory.subject_ids_for_user(UserId(15)).unwrap_err().is_not_found());
    }
}
