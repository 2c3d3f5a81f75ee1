//! 컬렉션 정의(YAML) 파싱
//!
//! # 개요
//!
//! 컬렉션은 `collections.yaml` 파일로 정의됩니다.
//! 각 컬렉션은 필드 목록과 작업별 규칙(list, view, create, update, delete)을 가집니다.
//!
//! # 모듈 구조
//!
//! - `types`: 논리적 필드 타입 (string, int, list, relation, ...)
//! - `field`: 필드 정의와 시스템 필드
//! - `collection`: 컬렉션과 컬렉션 집합
//! - `parser`: YAML 파싱 로직

mod collection;
mod field;
mod parser;
mod types;

pub use collection::{Collection, CollectionSet, RelationError};
pub use field::{Field, SYSTEM_FIELDS};
pub use parser::SchemaParser;
pub use types::FieldType;
