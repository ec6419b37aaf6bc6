//! CMS Role Service - 服务入口
//!
//! 加载配置、初始化遥测，在内存持久化上创建初始角色

use std::sync::Arc;

use anyhow::Context;
use cms_config::{AppConfig, load_section};
use cms_role::application::RoleService;
use cms_role::bootstrap::{seed_roles, seed_user_groups};
use cms_role::config::BootstrapConfig;
use cms_role::infrastructure::persistence::{InMemoryRoleHandler, InMemoryUserDirectory};
use tracing::info;

const CONFIG_DIR: &str = "config";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load(CONFIG_DIR).context("Failed to load app config")?;
    cms_telemetry::init(&config.telemetry.log_level, config.telemetry.json || config.is_production());

    let _metrics = if config.metrics.enabled {
        Some(cms_telemetry::init_metrics().context("Failed to install metrics recorder")?)
    } else {
        None
    };

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        "Runtime initialized"
    );

    let bootstrap: BootstrapConfig =
        load_section(CONFIG_DIR, "bootstrap").context("Failed to load bootstrap config")?;

    let directory = Arc::new(InMemoryUserDirectory::new());
    let handler = Arc::new(InMemoryRoleHandler::new(directory.clone()));
    let service = RoleService::new(handler, directory.clone());

    let groups = seed_user_groups(&directory, &bootstrap)?;
    info!(groups, "User groups loaded");

    let report = seed_roles(&service, &bootstrap)?;
    info!(created = report.created, skipped = report.skipped, "Bootstrap roles seeded");

    for role in service.load_roles()? {
        info!(
            role_id = %role.id,
            identifier = %role.identifier,
            policies = role.policies.len(),
            "Role loaded"
        );
    }

    Ok(())
}
