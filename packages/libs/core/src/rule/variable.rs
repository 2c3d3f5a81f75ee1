//! 규칙 변수 분류
//!
//! `@request.auth.*` 화이트리스트는 SQL 컴파일러와 검증기가 공유합니다.

/// `@request.auth.<field>`에서 허용되는 필드
pub const AUTH_FIELDS: &[&str] = &["id", "email", "role", "account_id"];

pub const REQUEST_AUTH_PREFIX: &str = "@request.auth.";
pub const REQUEST_DATA_PREFIX: &str = "@request.data.";

/// 변수 이름의 세 가지 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRef<'a> {
    /// `@request.auth.<field>`
    Auth(&'a str),

    /// `@request.data.<field>`
    Data(&'a str),

    /// 그 외: 컬렉션 필드
    Field(&'a str),
}

impl<'a> VariableRef<'a> {
    pub fn classify(name: &'a str) -> Self {
        if let Some(field) = name.strip_prefix(REQUEST_AUTH_PREFIX) {
            VariableRef::Auth(field)
        } else if let Some(field) = name.strip_prefix(REQUEST_DATA_PREFIX) {
            VariableRef::Data(field)
        } else {
            VariableRef::Field(name)
        }
    }
}

pub fn is_auth_field(field: &str) -> bool {
    AUTH_FIELDS.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(VariableRef::classify("@request.auth.id"), VariableRef::Auth("id"));
        assert_eq!(VariableRef::classify("@request.data.title"), VariableRef::Data("title"));
        assert_eq!(VariableRef::classify("owner_id"), VariableRef::Field("owner_id"));
        assert_eq!(VariableRef::classify("@request.other"), VariableRef::Field("@request.other"));
    }

    #[test]
    fn test_auth_whitelist() {
        assert!(is_auth_field("account_id"));
        assert!(!is_auth_field("password"));
        assert!(!is_auth_field(""));
    }
}
