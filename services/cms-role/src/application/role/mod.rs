//! 角色应用层模块

pub mod commands;
pub mod mapper;
pub mod metrics;
pub mod service;

pub use commands::*;
pub use service::RoleService;
