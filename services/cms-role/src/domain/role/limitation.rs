//! 限制条件 (Limitation) 及其类型注册表

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 限制条件类型
///
/// 封闭枚举；未知标识符落入 `Custom`，不会报错
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LimitationIdentifier {
    ContentType,
    Language,
    Location,
    Owner,
    ParentOwner,
    ParentContentType,
    ParentDepth,
    Section,
    SiteAccess,
    State,
    Subtree,
    UserGroup,
    ParentUserGroup,
    Custom(String),
}

impl LimitationIdentifier {
    /// 根据存储标识符查找限制类型
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "Class" => Self::ContentType,
            "Language" => Self::Language,
            "Node" => Self::Location,
            "Owner" => Self::Owner,
            "ParentOwner" => Self::ParentOwner,
            "ParentClass" => Self::ParentContentType,
            "ParentDepth" => Self::ParentDepth,
            "Section" => Self::Section,
            "SiteAccess" => Self::SiteAccess,
            "State" => Self::State,
            "Subtree" => Self::Subtree,
            "Group" => Self::UserGroup,
            "ParentGroup" => Self::ParentUserGroup,
            other => Self::Custom(other.to_string()),
        }
    }

    /// 存储标识符
    pub fn as_str(&self) -> &str {
        match self {
            Self::ContentType => "Class",
            Self::Language => "Language",
            Self::Location => "Node",
            Self::Owner => "Owner",
            Self::ParentOwner => "ParentOwner",
            Self::ParentContentType => "ParentClass",
            Self::ParentDepth => "ParentDepth",
            Self::Section => "Section",
            Self::SiteAccess => "SiteAccess",
            Self::State => "State",
            Self::Subtree => "Subtree",
            Self::UserGroup => "Group",
            Self::ParentUserGroup => "ParentGroup",
            Self::Custom(identifier) => identifier,
        }
    }

    /// `Custom` 中的已知标识符重新经过注册表映射为对应类型
    pub fn normalized(self) -> Self {
        match self {
            Self::Custom(identifier) => Self::from_identifier(&identifier),
            known => known,
        }
    }

    /// 是否允许作为角色分配级别的限制 (仅 Subtree / Section)
    pub fn is_role_limitation(&self) -> bool {
        matches!(self, Self::Subtree | Self::Section)
    }
}

impl fmt::Display for LimitationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LimitationIdentifier {
    fn from(identifier: &str) -> Self {
        Self::from_identifier(identifier)
    }
}

impl Serialize for LimitationIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LimitationIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let identifier = String::deserialize(deserializer)?;
        Ok(Self::from_identifier(&identifier))
    }
}

/// 限制条件：类型 + 不透明的限制值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limitation {
    pub identifier: LimitationIdentifier,
    pub values: Vec<String>,
}

impl Limitation {
    pub fn new<I, V>(identifier: LimitationIdentifier, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            identifier: identifier.normalized(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// 根据存储标识符创建空限制
    pub fn from_identifier(identifier: &str) -> Self {
        Self {
            identifier: LimitationIdentifier::from_identifier(identifier),
            values: Vec::new(),
        }
    }

    pub fn subtree<I, V>(path_strings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(LimitationIdentifier::Subtree, path_strings)
    }

    pub fn section<I, V>(section_ids: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::new(LimitationIdentifier::Section, section_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_identifiers_round_trip() {
        let known = [
            LimitationIdentifier::ContentType,
            LimitationIdentifier::Language,
            LimitationIdentifier::Location,
            LimitationIdentifier::Owner,
            LimitationIdentifier::ParentOwner,
            LimitationIdentifier::ParentContentType,
            LimitationIdentifier::ParentDepth,
            LimitationIdentifier::Section,
            LimitationIdentifier::SiteAccess,
            LimitationIdentifier::State,
            LimitationIdentifier::Subtree,
            LimitationIdentifier::UserGroup,
            LimitationIdentifier::ParentUserGroup,
        ];

        for identifier in known {
            assert_eq!(LimitationIdentifier::from_identifier(identifier.as_str()), identifier);
        }
    }

    #[test]
    fn test_unknown_identifier_is_custom() {
        let limitation = Limitation::from_identifier("NewState");

        assert_eq!(
            limitation.identifier,
            LimitationIdentifier::Custom("NewState".to_string())
        );
        assert_eq!(limitation.identifier.as_str(), "NewState");
        assert!(limitation.values.is_empty());
    }

    #[test]
    fn test_role_limitation_kinds() {
        assert!(LimitationIdentifier::Subtree.is_role_limitation());
        assert!(LimitationIdentifier::Section.is_role_limitation());
        assert!(!LimitationIdentifier::Owner.is_role_limitation());
        assert!(!LimitationIdentifier::Custom("Subtree2".into()).is_role_limitation());
    }

    #[test]
    fn test_custom_known_identifier_normalized() {
        let limitation = Limitation::new(LimitationIdentifier::Custom("Class".to_string()), ["article"]);
        assert_eq!(limitation.identifier, LimitationIdentifier::ContentType);

        assert_eq!(
            LimitationIdentifier::Custom("Section".to_string()).normalized(),
            LimitationIdentifier::Section
        );
        assert_eq!(
            LimitationIdentifier::Custom("Workflow".to_string()).normalized(),
            LimitationIdentifier::Custom("Workflow".to_string())
        );
    }

    #[test]
    fn test_legacy_names() {
        assert_eq!(LimitationIdentifier::ContentType.to_string(), "Class");
        assert_eq!(LimitationIdentifier::from("Node"), LimitationIdentifier::Location);
    }
}
