//! 규칙 표현식 언어
//!
//! # 개요
//!
//! 컬렉션 작업(list, view, create, update, delete)마다 붙는 불리언 접근 규칙입니다.
//! 규칙 문자열은 한 번 토큰화되고 한 번 AST로 파싱된 뒤,
//! 필요에 따라 평가기/SQL 컴파일러/검증기가 같은 AST를 소비합니다.
//!
//! # 모듈 구조
//!
//! - `token`, `lexer`: 문자열 → 토큰
//! - `ast`, `parser`: 토큰 → AST
//! - `evaluator`: AST + 컨텍스트 → 값
//! - `validator`: AST + 필드 목록 + 작업 → 위반 사항
//! - `function`: 내장 함수/매크로 테이블
//! - `variable`: `@request.*` 변수 분류와 auth 화이트리스트

mod ast;
mod evaluator;
mod function;
mod lexer;
mod parser;
mod token;
mod validator;
mod variable;

pub use ast::{BinaryOperator, Expr, Literal, UnaryOperator};
pub use evaluator::{evaluate_rule, Evaluator};
pub use function::Function;
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, Parser, MAX_DEPTH};
pub use token::{Token, TokenKind};
pub use validator::{validate_rule, RuleValidator, Violation};
pub use variable::{is_auth_field, VariableRef, AUTH_FIELDS, REQUEST_AUTH_PREFIX, REQUEST_DATA_PREFIX};
