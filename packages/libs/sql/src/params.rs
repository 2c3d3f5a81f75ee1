//! 컴파일 입력/출력 파라미터
//!
//! 컴파일 시점에 바인딩되는 인증 컨텍스트와, 컴파일 결과인 SQL 조각 + 바인드 파라미터입니다.

use std::collections::BTreeMap;

use rulekit_core::{Error, Result, Value};
use serde::Serialize;

/// 인증 컨텍스트
///
/// `@request.auth.<field>`가 컴파일될 때 `:auth_<field>`에 바인딩되는 값입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AuthContext(BTreeMap<String, Value>);

impl AuthContext {
    /// 빈 컨텍스트 (익명 요청)
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 추가
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// 필드 값 조회 (없으면 빈 문자열)
    pub fn get(&self, field: &str) -> Value {
        self.0
            .get(field)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()))
    }

    /// `key=value` 쌍에서 생성
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// JSON 객체에서 생성
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
            other => Err(Error::evaluation(format!(
                "auth context must be a JSON object, got {}",
                Value::from(other).type_name()
            ))),
        }
    }
}

/// 컴파일된 SQL 필터
///
/// `sql`은 WHERE 절에 그대로 넣을 수 있는 불리언 식이며,
/// 값은 모두 `:name` 형태의 이름 있는 바인드로만 등장합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFilter {
    /// SQL 불리언 식
    pub sql: String,

    /// 바인드 파라미터 (이름 -> 값)
    pub params: BTreeMap<String, Value>,
}

impl SqlFilter {
    /// 모두 거부
    pub fn deny_all() -> Self {
        Self {
            sql: "1=0".to_string(),
            params: BTreeMap::new(),
        }
    }

    /// 모두 허용
    pub fn allow_all() -> Self {
        Self {
            sql: "1=1".to_string(),
            params: BTreeMap::new(),
        }
    }

    /// 외부 쿼리 WHERE 절에 AND로 결합할 때 쓰는 괄호 식
    pub fn wrapped(&self) -> String {
        format!("({})", self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_context_defaults_to_empty_string() {
        let auth = AuthContext::new().with("id", "u1");
        assert_eq!(auth.get("id"), Value::from("u1"));
        assert_eq!(auth.get("email"), Value::from(""));
    }

    #[test]
    fn test_auth_context_from_json() {
        let auth = AuthContext::from_json(json!({ "id": "u1", "role": "admin" })).unwrap();
        assert_eq!(auth.get("role"), Value::from("admin"));

        assert!(AuthContext::from_json(json!(["u1"])).is_err());
    }

    #[test]
    fn test_sentinel_filters() {
        assert_eq!(SqlFilter::deny_all().sql, "1=0");
        assert_eq!(SqlFilter::allow_all().wrapped(), "(1=1)");
        assert!(SqlFilter::allow_all().params.is_empty());
    }

    #[test]
    fn test_filter_serialization() {
        let filter = SqlFilter {
            sql: "status = :param_0".to_string(),
            params: [("param_0".to_string(), Value::from("published"))]
                .into_iter()
                .collect(),
        };

        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            json!({ "sql": "status = :param_0", "params": { "param_0": "published" } })
        );
    }
}
