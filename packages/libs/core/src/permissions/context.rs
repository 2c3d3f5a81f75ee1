//! 규칙 평가 컨텍스트
//!
//! 규칙 표현식에서 참조할 수 있는 변수들을 담습니다.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::value::Value;

/// 평가 컨텍스트
///
/// # 관례적인 키
///
/// - `user`: 인증된 호출자 (`id`, `role`, `groups`, ...)
/// - `record`: 대상 레코드 (`owner_id`, ...)
/// - `permissions`: 컬렉션 이름 → 허용 action 목록
/// - `@request`: 요청 정보 (`auth`, `data`), `@request.auth.id`로 참조
///
/// 값은 맵이거나 `Attributes`를 구현한 객체일 수 있습니다.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    /// 빈 컨텍스트 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 호출자 설정
    pub fn with_user(self, user: impl Into<Value>) -> Self {
        self.with("user", user)
    }

    /// 대상 레코드 설정
    pub fn with_record(self, record: impl Into<Value>) -> Self {
        self.with("record", record)
    }

    /// 권한 맵 설정
    pub fn with_permissions(self, permissions: impl Into<Value>) -> Self {
        self.with("permissions", permissions)
    }

    /// 요청 정보 설정 (`@request.*`)
    pub fn with_request(self, request: impl Into<Value>) -> Self {
        self.with("@request", request)
    }

    /// 임의 키 설정
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// 점 경로 해석
    ///
    /// 중간 구성 요소가 없거나 null이면 에러 없이 `Value::Null`을 반환합니다.
    pub fn resolve(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let Some(head) = segments.next() else {
            return Value::Null;
        };

        let mut current = match self.values.get(head) {
            Some(value) => value.clone(),
            None => return Value::Null,
        };

        for segment in segments {
            if current.is_null() {
                return Value::Null;
            }
            current = current.member(segment);
        }

        current
    }

    /// JSON 객체에서 생성
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match Value::from(value) {
            Value::Map(values) => Ok(Self { values }),
            other => Err(Error::evaluation(format!(
                "context must be a JSON object, got {}",
                other.type_name()
            ))),
        }
    }
}
