//! CMS Role Service - 角色/策略授权服务
//!
//! 角色定义、策略、限制条件，以及角色到用户/用户组的分配

pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
