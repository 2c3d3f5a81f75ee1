//! 필드 정의

use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// 모든 컬렉션에 암묵적으로 존재하는 시스템 필드
pub const SYSTEM_FIELDS: &[&str] = &["id", "created", "updated"];

/// 필드 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// 필드 이름
    pub name: String,

    /// 필드 타입
    #[serde(flatten)]
    pub field_type: FieldType,

    /// 필수 여부
    #[serde(default)]
    pub required: bool,

    /// 시스템 필드 여부 (id, created, updated)
    #[serde(default)]
    pub system: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            system: false,
        }
    }

    /// 시스템 필드 목록 생성
    pub fn system_fields() -> Vec<Field> {
        SYSTEM_FIELDS
            .iter()
            .map(|&name| {
                let field_type = if name == "id" {
                    FieldType::String
                } else {
                    FieldType::Timestamp
                };
                Field {
                    name: name.to_string(),
                    field_type,
                    required: true,
                    system: true,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_fields() {
        let fields = Field::system_fields();
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|f| f.system && f.required));
        assert_eq!(fields[0].field_type, FieldType::String);
        assert_eq!(fields[1].field_type, FieldType::Timestamp);
    }
}
