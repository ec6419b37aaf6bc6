//! 初始角色数据
//!
//! 按配置创建缺失的角色和用户组；已存在的角色不重复创建，但会补齐用户组分配，可重复执行

use cms_common::UserGroupId;
use cms_errors::AppResult;
use tracing::{info, warn};

use crate::application::{PolicyCreateStruct, RoleCreateStruct, RoleService};
use crate::config::{BootstrapConfig, BootstrapRole};
use crate::domain::role::{Limitation, Role, RoleHandler};
use crate::domain::user::{UserGroup, UserLookup};
use crate::infrastructure::persistence::InMemoryUserDirectory;

/// 初始化结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

/// 将配置中的用户组写入内存目录
pub fn seed_user_groups(directory: &InMemoryUserDirectory, config: &BootstrapConfig) -> AppResult<usize> {
    for group in &config.user_groups {
        let mut user_group = UserGroup::new(UserGroupId(group.id), group.name.clone());
        user_group.parent_id = group.parent_id.map(UserGroupId);
        directory.add_user_group(user_group)?;
    }
    Ok(config.user_groups.len())
}

/// 创建配置中缺失的角色并分配给用户组
pub fn seed_roles<H, U>(service: &RoleService<H, U>, config: &BootstrapConfig) -> AppResult<SeedReport>
where
    H: RoleHandler,
    U: UserLookup,
{
    info!("Seeding {} bootstrap roles", config.roles.len());

    let mut report = SeedReport::default();
    for bootstrap_role in &config.roles {
        let role = match service.load_role_by_identifier(&bootstrap_role.identifier) {
            Ok(existing) => {
                info!(identifier = %bootstrap_role.identifier, "Role already exists, skipping creation");
                report.skipped += 1;
                existing
            }
            Err(e) if e.is_not_found() => {
                let role = service.create_role(role_create_struct(bootstrap_role))?;
                report.created += 1;
                role
            }
            Err(e) => return Err(e),
        };

        // 分配是幂等的；已存在的角色也重新分配，补齐上次中断的部分
        assign_to_groups(service, &role, &bootstrap_role.assign_to_groups)?;
    }

    info!(
        "Role seeding completed: {} created, {} skipped",
        report.created, report.skipped
    );
    Ok(report)
}

fn assign_to_groups<H, U>(service: &RoleService<H, U>, role: &Role, group_ids: &[i64]) -> AppResult<()>
where
    H: RoleHandler,
    U: UserLookup,
{
    for group_id in group_ids {
        let group = UserGroup::new(UserGroupId(*group_id), String::new());
        if let Err(e) = service.assign_role_to_user_group(role, &group, None) {
            warn!(role = %role.identifier, group_id, error = %e, "Failed to assign bootstrap role");
            return Err(e);
        }
    }
    Ok(())
}

fn role_create_struct(role: &BootstrapRole) -> RoleCreateStruct {
    let mut create = RoleCreateStruct::new(role.identifier.clone());
    create.names = role.names.clone();
    create.descriptions = role.descriptions.clone();

    for policy in &role.policies {
        let mut policy_create = PolicyCreateStruct::new(policy.module.clone(), policy.function.clone());
        for (identifier, values) in &policy.limitations {
            let mut limitation = Limitation::from_identifier(identifier);
            limitation.values = values.clone();
            policy_create.add_limitation(limitation);
        }
        create.add_policy(policy_create);
    }

    create
}
