//! 논리적 필드 타입 정의
//!
//! 규칙 엔진은 값의 저장 방식에 관여하지 않으므로 타입은 검증과 표시용입니다.

use serde::{Deserialize, Serialize};

/// 논리적 필드 타입
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// 문자열
    String,

    /// 64비트 정수
    Int,

    /// 64비트 부동소수점
    Float,

    /// 불리언
    Boolean,

    /// 임의의 JSON
    Json,

    /// 타임스탬프 (ISO 8601 문자열)
    Timestamp,

    /// 목록
    List {
        /// 요소 타입
        items: Box<FieldType>,
    },

    /// 다른 컬렉션의 레코드 id
    Relation {
        /// 대상 컬렉션 이름
        collection: String,
    },
}

impl FieldType {
    /// 간단한 타입 문자열에서 파싱
    ///
    /// 복잡한 타입(list, relation)은 전체 YAML 구조로 파싱해야 합니다.
    pub fn from_simple_str(s: &str) -> Option<Self> {
        match s {
            "string" | "text" => Some(FieldType::String),
            "int" | "integer" => Some(FieldType::Int),
            "float" | "number" => Some(FieldType::Float),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "json" => Some(FieldType::Json),
            "timestamp" | "date" => Some(FieldType::Timestamp),
            _ => None,
        }
    }

    /// 타입 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
            FieldType::Timestamp => "timestamp",
            FieldType::List { .. } => "list",
            FieldType::Relation { .. } => "relation",
        }
    }

    /// 관계 대상 컬렉션 (relation 타입만)
    pub fn relation_target(&self) -> Option<&str> {
        match self {
            FieldType::Relation { collection } => Some(collection),
            FieldType::List { items } => items.relation_target(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_type_parsing() {
        assert_eq!(FieldType::from_simple_str("string"), Some(FieldType::String));
        assert_eq!(FieldType::from_simple_str("int"), Some(FieldType::Int));
        assert_eq!(FieldType::from_simple_str("bool"), Some(FieldType::Boolean));
        assert_eq!(FieldType::from_simple_str("list"), None);
        assert_eq!(FieldType::from_simple_str("unknown"), None);
    }

    #[test]
    fn test_relation_target() {
        let author = FieldType::Relation {
            collection: "users".to_string(),
        };
        assert_eq!(author.relation_target(), Some("users"));

        let tags = FieldType::List {
            items: Box::new(author),
        };
        assert_eq!(tags.relation_target(), Some("users"));
        assert_eq!(tags.as_str(), "list");
        assert_eq!(FieldType::Json.relation_target(), None);
    }
}
