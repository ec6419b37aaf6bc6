//! 初始角色数据测试

use std::sync::Arc;

use cms_common::UserGroupId;
use cms_role::application::RoleService;
use cms_role::bootstrap::{SeedReport, seed_roles, seed_user_groups};
use cms_role::config::{BootstrapConfig, BootstrapPolicy, BootstrapRole, BootstrapUserGroup};
use cms_role::domain::role::{LimitationIdentifier, PolicyLimitations};
use cms_role::domain::user::{UserGroup, UserLookup};
use cms_role::infrastructure::persistence::{InMemoryRoleHandler, InMemoryUserDirectory};

fn config() -> BootstrapConfig {
    BootstrapConfig {
        user_groups: vec![
            BootstrapUserGroup {
                id: 4,
                name: "Users".to_string(),
                parent_id: None,
            },
            BootstrapUserGroup {
                id: 42,
                name: "Anonymous Users".to_string(),
                parent_id: Some(4),
            },
        ],
        roles: vec![
            BootstrapRole {
                identifier: "Anonymous".to_string(),
                names: [("eng-GB".to_string(), "Anonymous".to_string())].into(),
                descriptions: Default::default(),
                policies: vec![BootstrapPolicy {
                    module: "content".to_string(),
                    function: "read".to_string(),
                    limitations: [("Section".to_string(), vec!["1".to_string()])].into(),
                }],
                assign_to_groups: vec![42],
            },
            BootstrapRole {
                identifier: "Administrator".to_string(),
                names: Default::default(),
                descriptions: Default::default(),
                policies: vec![BootstrapPolicy {
                    module: "*".to_string(),
                    function: "*".to_string(),
                    limitations: Default::default(),
                }],
                assign_to_groups: Vec::new(),
            },
        ],
    }
}

#[test]
fn test_seed_is_idempotent() {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let handler = Arc::new(InMemoryRoleHandler::new(directory.clone()));
    let service = RoleService::new(handler, directory.clone());
    let config = config();

    assert_eq!(seed_user_groups(&directory, &config).unwrap(), 2);
    assert_eq!(
        directory.load_user_group(UserGroupId(42)).unwrap().parent_id,
        Some(UserGroupId(4))
    );

    let first = seed_roles(&service, &config).unwrap();
    assert_eq!(first, SeedReport { created: 2, skipped: 0 });

    let second = seed_roles(&service, &config).unwrap();
    assert_eq!(second, SeedReport { created: 0, skipped: 2 });
    assert_eq!(service.load_roles().unwrap().len(), 2);

    let anonymous = service.load_role_by_identifier("Anonymous").unwrap();
    let limitations = anonymous.policies[0].limitations.as_slice();
    assert_eq!(limitations[0].identifier, LimitationIdentifier::Section);

    let group = directory.load_user_group(UserGroupId(42)).unwrap();
    let assignments = service.get_role_assignments_for_user_group(&group).unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].role.identifier, "Anonymous");

    let admin = service.load_role_by_identifier("Administrator").unwrap();
    assert_eq!(admin.policies[0].limitations, PolicyLimitations::All);
}

#[test]
fn test_seed_completes_assignments_after_failed_run() {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let handler = Arc::new(InMemoryRoleHandler::new(directory.clone()));
    let service = RoleService::new(handler, directory.clone());
    let config = config();

    // 用户组 42 尚未存在：角色已创建但分配失败
    directory.add_user_group(UserGroup::new(UserGroupId(4), "Users")).unwrap();
    let err = seed_roles(&service, &config).unwrap_err();
    assert!(err.is_not_found());
    assert!(service.load_role_by_identifier("Anonymous").is_ok());

    seed_user_groups(&directory, &config).unwrap();
    let report = seed_roles(&service, &config).unwrap();
    assert_eq!(report, SeedReport { created: 1, skipped: 1 });

    let group = directory.load_user_group(UserGroupId(42)).unwrap();
    let assignments = service.get_role_assignments_for_user_group(&group).unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].role.identifier, "Anonymous");
}
