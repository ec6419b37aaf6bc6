//! 领域对象与存储对象之间的转换

use cms_errors::{AppError, AppResult, PersistenceError};

use super::commands::RoleCreateStruct;
use crate::domain::role::{
    Limitation, LimitationIdentifier, LimitationMap, Policy, PolicyLimitations, Role,
    StoredLimitations, StoredPolicy, StoredRole, WILDCARD,
};

fn is_wildcard(module: &str, function: &str) -> bool {
    module == WILDCARD || function == WILDCARD
}

/// 存储角色 -> 领域角色
pub fn build_domain_role(role: StoredRole) -> AppResult<Role> {
    let id = role
        .id
        .ok_or_else(|| AppError::Persistence(PersistenceError::backend("Stored role has no id")))?;

    let policies = role
        .policies
        .into_iter()
        .map(build_domain_policy)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Role {
        id,
        identifier: role.identifier,
        main_language_code: None,
        names: role.name,
        descriptions: role.description,
        policies,
    })
}

/// 存储策略 -> 领域策略
pub fn build_domain_policy(policy: StoredPolicy) -> AppResult<Policy> {
    let (Some(id), Some(role_id)) = (policy.id, policy.role_id) else {
        return Err(AppError::Persistence(PersistenceError::backend(
            "Stored policy has no id or role id",
        )));
    };

    let limitations = if is_wildcard(&policy.module, &policy.function) {
        PolicyLimitations::All
    } else {
        match policy.limitations {
            StoredLimitations::Wildcard => PolicyLimitations::All,
            StoredLimitations::Empty => PolicyLimitations::Limited(Vec::new()),
            StoredLimitations::Map(map) => PolicyLimitations::Limited(
                map.into_iter()
                    .map(|(identifier, values)| Limitation {
                        identifier: LimitationIdentifier::from_identifier(&identifier),
                        values,
                    })
                    .collect(),
            ),
        }
    };

    Ok(Policy {
        id,
        role_id,
        module: policy.module,
        function: policy.function,
        limitations,
    })
}

/// 创建请求 -> 存储角色
pub fn build_stored_role(create: RoleCreateStruct) -> StoredRole {
    let policies = create
        .policies
        .iter()
        .map(|p| build_stored_policy(&p.module, &p.function, &p.limitations))
        .collect();

    StoredRole {
        id: None,
        identifier: create.identifier,
        name: create.names,
        description: create.descriptions,
        policies,
        ..Default::default()
    }
}

/// 构建存储策略
///
/// 模块或功能为通配符时限制集合存为 `"*"`，否则存为映射 (无限制时为空映射)
pub fn build_stored_policy(module: &str, function: &str, limitations: &[Limitation]) -> StoredPolicy {
    let limitations = if is_wildcard(module, function) {
        StoredLimitations::Wildcard
    } else {
        StoredLimitations::from_map(build_limitation_map(limitations))
    };

    StoredPolicy {
        id: None,
        role_id: None,
        module: module.to_string(),
        function: function.to_string(),
        limitations,
    }
}

/// 同一类型出现多次时，后者覆盖前者
pub fn build_limitation_map(limitations: &[Limitation]) -> LimitationMap {
    limitations
        .iter()
        .map(|l| (l.identifier.as_str().to_string(), l.values.clone()))
        .collect()
}

/// 存储中的角色分配限制 -> 领域限制
pub fn build_domain_role_limitation(map: &LimitationMap) -> Option<Limitation> {
    map.iter().next().map(|(identifier, values)| Limitation {
        identifier: LimitationIdentifier::from_identifier(identifier),
        values: values.clone(),
    })
}
