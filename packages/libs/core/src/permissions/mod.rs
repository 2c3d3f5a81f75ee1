//! 컬렉션 규칙과 권한 평가
//!
//! # 개요
//!
//! 컬렉션마다 작업별 규칙 문자열을 가지며, 요청 컨텍스트에 대해 평가하여
//! 접근을 허용/거부합니다.
//!
//! # 모듈 구조
//!
//! - `policy`: 작업 타입과 컬렉션 규칙 집합
//! - `context`: 평가 컨텍스트
//! - `evaluator`: 권한 평가기

mod context;
mod evaluator;
mod policy;

pub use context::Context;
pub use evaluator::{AccessDecision, PermissionEvaluator};
pub use policy::{CollectionRules, Operation};
