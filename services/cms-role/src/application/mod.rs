//! 应用层模块

pub mod role;

pub use role::{
    PolicyCreateStruct,
    PolicyUpdateStruct,
    RoleCreateStruct,
    RoleService,
    RoleUpdateStruct,
};
