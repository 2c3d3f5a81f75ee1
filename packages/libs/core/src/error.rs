//! 공통 에러 타입
//!
//! 규칙 엔진 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

use crate::rule::Violation;

pub type Result<T> = std::result::Result<T, Error>;

/// 규칙 엔진 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Rule Errors
    // ─────────────────────────────────────────────────────────────────────────────
    /// 렉싱/파싱 실패 (첫 번째 문제에서 즉시 중단)
    #[error("syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },

    /// 평가/컴파일 중 구조적 문제 (알 수 없는 함수, 인자 개수, 허용되지 않은 변수)
    #[error("evaluation error: {message}")]
    Evaluation { message: String },

    /// 검증기가 수집한 모든 위반 사항
    #[error("invalid rule: {}", display_violations(.violations))]
    Validation { violations: Vec<Violation> },

    // ─────────────────────────────────────────────────────────────────────────────
    // Schema Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema parse error: {message}")]
    SchemaParse { message: String },

    #[error("schema validation error: {message}")]
    SchemaValidation { message: String },

    #[error("duplicate collection name: {name}")]
    DuplicateCollection { name: String },

    #[error("invalid field type: {type_name}")]
    InvalidFieldType { type_name: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn display_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// 문법 에러 생성
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }

    /// 평가 에러 생성
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            message: message.into(),
        }
    }

    /// 문법 에러의 문자 위치 (0-based)
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// 검증 위반 목록
    pub fn violations(&self) -> &[Violation] {
        match self {
            Error::Validation { violations } => violations,
            _ => &[],
        }
    }

    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Syntax { .. }
            | Error::Evaluation { .. }
            | Error::Validation { .. }
            | Error::SchemaParse { .. }
            | Error::SchemaValidation { .. }
            | Error::InvalidFieldType { .. }
            | Error::Yaml(_)
            | Error::Json(_) => 400,

            // 409 Conflict
            Error::DuplicateCollection { .. } => 409,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::Syntax { .. } => "RULE_SYNTAX_ERROR",
            Error::Evaluation { .. } => "RULE_EVALUATION_ERROR",
            Error::Validation { .. } => "RULE_VALIDATION_ERROR",
            Error::SchemaParse { .. } => "SCHEMA_PARSE_ERROR",
            Error::SchemaValidation { .. } => "SCHEMA_VALIDATION_ERROR",
            Error::DuplicateCollection { .. } => "DUPLICATE_COLLECTION",
            Error::InvalidFieldType { .. } => "INVALID_FIELD_TYPE",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
