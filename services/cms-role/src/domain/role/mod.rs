//! 角色/策略授权领域模块

#![allow(clippy::module_inception)]

pub mod assignment;
pub mod limitation;
pub mod persistence;
pub mod policy;
pub mod repository;
pub mod role;

pub use assignment::{RoleAssignment, RoleSubject};
pub use limitation::{Limitation, LimitationIdentifier};
pub use persistence::{LimitationMap, StoredLimitations, StoredPolicy, StoredRole, StoredRoleUpdate};
pub use policy::{Policy, PolicyId, PolicyLimitations, WILDCARD};
pub use repository::{HandlerResult, RoleHandler};
pub use role::{Role, RoleId};

#[cfg(test)]
pub use repository::MockRoleHandler;
