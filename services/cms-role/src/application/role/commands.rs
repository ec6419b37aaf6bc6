//! 角色/策略请求结构定义

use cms_common::{LanguageCode, MultiLanguageText};
use cms_errors::{AppError, AppResult};

use crate::domain::role::{Limitation, WILDCARD};

/// 创建角色请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCreateStruct {
    pub identifier: String,
    pub names: MultiLanguageText,
    pub descriptions: MultiLanguageText,
    /// 随角色一起创建的策略
    pub policies: Vec<PolicyCreateStruct>,
}

impl RoleCreateStruct {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, language_code: impl Into<LanguageCode>, name: impl Into<String>) -> Self {
        self.names.insert(language_code.into(), name.into());
        self
    }

    pub fn with_description(
        mut self,
        language_code: impl Into<LanguageCode>,
        description: impl Into<String>,
    ) -> Self {
        self.descriptions.insert(language_code.into(), description.into());
        self
    }

    pub fn add_policy(&mut self, policy: PolicyCreateStruct) {
        self.policies.push(policy);
    }

    /// 验证请求参数
    pub fn validate(&self) -> AppResult<()> {
        if self.identifier.is_empty() {
            return Err(AppError::invalid_argument(
                "identifier",
                "Role identifier cannot be empty",
            ));
        }
        self.policies.iter().try_for_each(PolicyCreateStruct::validate)
    }
}

/// 更新角色请求；为 None 的字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdateStruct {
    pub identifier: Option<String>,
    pub names: Option<MultiLanguageText>,
    pub descriptions: Option<MultiLanguageText>,
}

impl RoleUpdateStruct {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(ref identifier) = self.identifier
            && identifier.is_empty()
        {
            return Err(AppError::invalid_argument(
                "identifier",
                "Role identifier cannot be empty",
            ));
        }
        Ok(())
    }
}

/// 创建策略请求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyCreateStruct {
    pub module: String,
    pub function: String,
    pub limitations: Vec<Limitation>,
}

impl PolicyCreateStruct {
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            limitations: Vec::new(),
        }
    }

    pub fn add_limitation(&mut self, limitation: Limitation) {
        self.limitations.push(limitation);
    }

    pub fn with_limitation(mut self, limitation: Limitation) -> Self {
        self.add_limitation(limitation);
        self
    }

    /// 验证请求参数
    pub fn validate(&self) -> AppResult<()> {
        if self.module.is_empty() {
            return Err(AppError::invalid_argument("module", "Policy module cannot be empty"));
        }
        if self.function.is_empty() {
            return Err(AppError::invalid_argument(
                "function",
                "Policy function cannot be empty",
            ));
        }
        // 模块为通配符时功能也必须是通配符
        if self.module == WILDCARD && self.function != WILDCARD {
            return Err(AppError::invalid_argument(
                "module",
                format!(
                    "Wildcard module requires wildcard function, got '{}'",
                    self.function
                ),
            ));
        }
        Ok(())
    }
}

/// 更新策略请求：替换限制集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyUpdateStruct {
    pub limitations: Vec<Limitation>,
}

impl PolicyUpdateStruct {
    pub fn add_limitation(&mut self, limitation: Limitation) {
        self.limitations.push(limitation);
    }

    pub fn with_limitation(mut self, limitation: Limitation) -> Self {
        self.add_limitation(limitation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_identifier_rejected() {
        let err = RoleCreateStruct::new("").validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { ref argument, .. } if argument == "identifier"));
    }

    #[test]
    fn test_role_create_validates_policies() {
        let mut create = RoleCreateStruct::new("editor").with_name("eng-GB", "Editor");
        create.add_policy(PolicyCreateStruct::new("*", "read"));

        assert!(create.validate().is_err());
    }

    #[test]
    fn test_policy_validation() {
        assert!(PolicyCreateStruct::new("content", "read").validate().is_ok());
        assert!(PolicyCreateStruct::new("*", "*").validate().is_ok());
        assert!(PolicyCreateStruct::new("content", "*").validate().is_ok());
        assert!(PolicyCreateStruct::new("", "read").validate().is_err());
        assert!(PolicyCreateStruct::new("content", "").validate().is_err());

        let err = PolicyCreateStruct::new("*", "read").validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument { ref argument, .. } if argument == "module"));
    }

    #[test]
    fn test_role_update_validation() {
        assert!(RoleUpdateStruct::default().validate().is_ok());

        let update = RoleUpdateStruct {
            identifier: Some(String::new()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
