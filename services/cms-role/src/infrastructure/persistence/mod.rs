//! 持久化实现

pub mod in_memory;

pub use in_memory::{InMemoryRoleHandler, InMemoryUserDirectory};
