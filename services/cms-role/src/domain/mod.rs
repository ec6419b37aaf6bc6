//! 领域层

pub mod role;
pub mod user;
