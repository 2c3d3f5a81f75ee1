//! rulekit-core: 컬렉션 접근 규칙 핵심 라이브러리
//!
//! 이 크레이트는 SQL 컴파일러와 CLI가 공유하는 핵심 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `rule`: 규칙 언어 (렉서, 파서, 평가기, 검증기)
//! - `permissions`: 작업 타입, 컬렉션 규칙, 평가 컨텍스트, 권한 평가기
//! - `schema`: 컬렉션 정의(YAML) 파싱
//! - `value`: 런타임 값
//! - `error`: 공통 에러 타입

pub mod error;
pub mod permissions;
pub mod rule;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use permissions::{AccessDecision, CollectionRules, Context, Operation, PermissionEvaluator};
pub use rule::{evaluate_rule, parse, validate_rule, Expr};
pub use value::{Attributes, Value};
