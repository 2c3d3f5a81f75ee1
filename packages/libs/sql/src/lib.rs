//! rulekit-sql: 규칙 → SQL 필터 컴파일 라이브러리
//!
//! 컬렉션 규칙을 파라미터 바인딩된 SQL 불리언 식으로 변환하여
//! 목록 쿼리의 행 필터로 밀어 넣습니다.
//!
//! # 모듈 구조
//!
//! - `compiler`: 규칙 AST → SQL 식
//! - `params`: 인증 컨텍스트와 컴파일 결과
//! - `access`: 평가/컴파일을 묶은 컬렉션 접근 게이트

pub mod access;
pub mod compiler;
pub mod params;

pub use access::CollectionAccess;
pub use compiler::{compile_to_sql, SqlCompiler};
pub use params::{AuthContext, SqlFilter};
