//! 규칙 검증기
//!
//! 저장 전에 규칙이 컬렉션 스키마와 대상 작업에 맞는지 정적으로 검사합니다.
//! 파싱 실패는 즉시 반환하고, 의미 위반은 트리 전체에서 모아 한 번에 보고합니다.

use std::collections::HashSet;
use std::fmt;

use super::ast::Expr;
use super::function::Function;
use super::parser::parse;
use super::variable::{is_auth_field, VariableRef};
use crate::error::{Error, Result};
use crate::permissions::Operation;

/// 검증 위반 사항
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Violation {
    /// 컬렉션에 없는 필드
    UnknownField { name: String },

    /// 화이트리스트에 없는 `@request.auth.*` 필드
    DisallowedAuthField { field: String },

    /// create/update 외 작업에서 `@request.data.*` 사용
    DataNotAllowed { field: String, operation: Operation },

    /// 내장 테이블에 없는 함수
    UnknownFunction { name: String },

    /// 인자 개수 불일치
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownField { name } => write!(f, "unknown field '{}'", name),
            Violation::DisallowedAuthField { field } => {
                write!(f, "'@request.auth.{}' is not an allowed auth field", field)
            }
            Violation::DataNotAllowed { field, operation } => write!(
                f,
                "'@request.data.{}' is only allowed in create and update rules, not {}",
                field, operation
            ),
            Violation::UnknownFunction { name } => write!(f, "unknown function '{}'", name),
            Violation::WrongArity {
                name,
                expected,
                found,
            } => write!(f, "{}() takes {} argument(s), {} given", name, expected, found),
        }
    }
}

/// 규칙 검증기
pub struct RuleValidator<'a> {
    operation: Operation,
    fields: HashSet<&'a str>,
}

impl<'a> RuleValidator<'a> {
    /// # Arguments
    /// * `operation` - 규칙이 보호하는 작업
    /// * `fields` - 컬렉션에 선언된 필드 이름
    pub fn new(operation: Operation, fields: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            operation,
            fields: fields.into_iter().collect(),
        }
    }

    /// 규칙 검증
    ///
    /// 센티널(`None`, `""`)은 분석 없이 통과합니다.
    pub fn validate(&self, rule: Option<&str>) -> Result<()> {
        let source = match rule {
            None | Some("") => return Ok(()),
            Some(source) => source,
        };

        let expr = parse(source)?;
        let violations = self.check(&expr);
        if violations.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                rule = source,
                operation = %self.operation,
                count = violations.len(),
                "rule rejected"
            );
            Err(Error::Validation { violations })
        }
    }

    /// AST 전체의 위반 사항 수집 (중복 제거, 발견 순서 유지)
    pub fn check(&self, expr: &Expr) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.walk(expr, &mut violations);

        let mut seen = HashSet::new();
        violations.retain(|v| seen.insert(v.clone()));
        violations
    }

    fn walk(&self, expr: &Expr, out: &mut Vec<Violation>) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Variable(name) => self.variable(name, out),
            Expr::BinaryOp { left, right, .. } => {
                self.walk(left, out);
                self.walk(right, out);
            }
            Expr::UnaryOp { operand, .. } => self.walk(operand, out),
            Expr::FunctionCall { name, args } => {
                match Function::lookup(name) {
                    None => out.push(Violation::UnknownFunction { name: name.clone() }),
                    Some(function) if function.arity() != args.len() => {
                        out.push(Violation::WrongArity {
                            name: name.clone(),
                            expected: function.arity(),
                            found: args.len(),
                        })
                    }
                    Some(_) => {}
                }
                for arg in args {
                    self.walk(arg, out);
                }
            }
        }
    }

    fn variable(&self, name: &str, out: &mut Vec<Violation>) {
        match VariableRef::classify(name) {
            VariableRef::Auth(field) => {
                if !is_auth_field(field) {
                    out.push(Violation::DisallowedAuthField {
                        field: field.to_string(),
                    });
                }
            }
            VariableRef::Data(field) => {
                if !self.operation.allows_request_data() {
                    out.push(Violation::DataNotAllowed {
                        field: field.to_string(),
                        operation: self.operation,
                    });
                }
            }
            VariableRef::Field(field) => {
                if !self.fields.contains(field) {
                    out.push(Violation::UnknownField {
                        name: field.to_string(),
                    });
                }
            }
        }
    }
}

/// 규칙 검증 (단축 함수)
pub fn validate_rule(rule: Option<&str>, operation: Operation, fields: &[&str]) -> Result<()> {
    RuleValidator::new(operation, fields.iter().copied()).validate(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_data_only_for_create_and_update() {
        let rule = Some("@request.data.title == 'x'");
        assert!(validate_rule(rule, Operation::List, &["title"]).is_err());
        assert!(validate_rule(rule, Operation::Create, &["title"]).is_ok());
        assert!(validate_rule(rule, Operation::Update, &["title"]).is_ok());
        assert!(validate_rule(rule, Operation::Delete, &["title"]).is_err());
    }

    #[test]
    fn test_unknown_field_is_named() {
        let err = validate_rule(Some("ghost == 1"), Operation::List, &["title"]).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::UnknownField {
                name: "ghost".to_string()
            }]
        );
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_auth_whitelist() {
        let fields = ["owner"];
        assert!(validate_rule(Some("owner == @request.auth.id"), Operation::View, &fields).is_ok());

        let err = validate_rule(Some("owner == @request.auth.password"), Operation::View, &fields)
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::DisallowedAuthField {
                field: "password".to_string()
            }]
        );
    }

    #[test]
    fn test_violations_are_aggregated() {
        let err = validate_rule(
            Some("a == 1 and (b == @request.auth.secret or not @request.data.c)"),
            Operation::View,
            &["x"],
        )
        .unwrap_err();

        assert_eq!(err.violations().len(), 4);
    }

    #[test]
    fn test_duplicate_violations_reported_once() {
        let err = validate_rule(Some("ghost == 1 or ghost == 2"), Operation::List, &[]).unwrap_err();
        assert_eq!(err.violations().len(), 1);
    }

    #[test]
    fn test_function_calls_are_checked() {
        let err = validate_rule(
            Some("@is_admin() or @has_role() or contains(ghost, 'x')"),
            Operation::List,
            &["title"],
        )
        .unwrap_err();

        assert_eq!(
            err.violations(),
            &[
                Violation::UnknownFunction {
                    name: "@is_admin".to_string()
                },
                Violation::WrongArity {
                    name: "@has_role".to_string(),
                    expected: 1,
                    found: 0
                },
                Violation::UnknownField {
                    name: "ghost".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_sentinels_always_pass() {
        assert!(validate_rule(None, Operation::Delete, &[]).is_ok());
        assert!(validate_rule(Some(""), Operation::Delete, &[]).is_ok());
    }

    #[test]
    fn test_syntax_error_skips_analysis() {
        let err = validate_rule(Some("ghost =="), Operation::List, &[]).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn test_deeply_nested_rule_is_rejected_at_save_time() {
        let rule = format!("{}a{}", "(".repeat(1_000), ")".repeat(1_000));
        let err = validate_rule(Some(&rule), Operation::List, &["a"]).unwrap_err();
        assert!(matches!(err, Error::Syntax { position: 256, .. }));
    }
}
