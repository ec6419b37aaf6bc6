//! 策略实体

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

use super::limitation::Limitation;
use super::role::RoleId;

/// 模块/功能通配符
pub const WILDCARD: &str = "*";

/// 策略 ID (由存储层分配)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[display("{_0}")]
pub struct PolicyId(pub i64);

impl PolicyId {
    pub fn is_unset(&self) -> bool {
        self.0 <= 0
    }
}

impl std::str::FromStr for PolicyId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// 策略的限制集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyLimitations {
    /// 通配：所有限制均适用 (模块或功能为 "*")
    All,
    /// 具体限制列表，可以为空
    Limited(Vec<Limitation>),
}

impl PolicyLimitations {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::All)
    }

    /// 具体限制列表；通配时为空切片
    pub fn as_slice(&self) -> &[Limitation] {
        match self {
            Self::All => &[],
            Self::Limited(limitations) => limitations,
        }
    }
}

/// 策略实体
///
/// 一个 (模块, 功能, 限制集合) 许可单元，隶属于某个角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub role_id: RoleId,
    pub module: String,
    pub function: String,
    pub limitations: PolicyLimitations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_id() {
        assert!(PolicyId(0).is_unset());
        assert_eq!("15".parse::<PolicyId>().unwrap(), PolicyId(15));
        assert_eq!(PolicyId(15).to_string(), "15");
    }

    #[test]
    fn test_limitations_slice() {
        assert!(PolicyLimitations::All.as_slice().is_empty());
        assert!(PolicyLimitations::All.is_wildcard());
        assert!(!PolicyLimitations::Limited(Vec::new()).is_wildcard());
    }
}
