//! 트리 순회 평가기
//!
//! AST를 컨텍스트에 대해 실행합니다.
//!
//! 구조적 문제(알 수 없는 함수, 인자 개수)는 항상 에러이고,
//! 데이터 문제(없는 필드, 타입 불일치, 비교 실패)는 `false`/`null`로 처리합니다.

use chrono::{Local, NaiveDateTime, Timelike};

use super::ast::{BinaryOperator, Expr, UnaryOperator};
use super::function::Function;
use super::parser::parse;
use crate::error::Result;
use crate::permissions::Context;
use crate::value::Value;

/// 평가기
pub struct Evaluator<'a> {
    context: &'a Context,
    now: Option<NaiveDateTime>,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self { context, now: None }
    }

    /// 현재 시각 고정 (기본값: 로컬 벽시계)
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// 표현식 평가
    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal.to_value()),
            Expr::Variable(name) => Ok(self.context.resolve(name)),
            Expr::BinaryOp { left, op, right } => self.binary(left, *op, right),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => Ok(Value::Bool(!self.evaluate(operand)?.is_truthy())),
            Expr::FunctionCall { name, args } => self.call(name, args),
        }
    }

    /// 표현식 평가 후 참/거짓 판정
    pub fn evaluate_bool(&self, expr: &Expr) -> Result<bool> {
        Ok(self.evaluate(expr)?.is_truthy())
    }

    fn binary(&self, left: &Expr, op: BinaryOperator, right: &Expr) -> Result<Value> {
        // and/or는 왼쪽만으로 결과가 정해지면 오른쪽을 평가하지 않음
        match op {
            BinaryOperator::And => {
                if !self.evaluate_bool(left)? {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.evaluate_bool(right)?));
            }
            BinaryOperator::Or => {
                if self.evaluate_bool(left)? {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.evaluate_bool(right)?));
            }
            _ => {}
        }

        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;

        let result = match op {
            BinaryOperator::Eq => lhs == rhs,
            BinaryOperator::Ne => lhs != rhs,
            BinaryOperator::In => rhs.contains(&lhs).unwrap_or(false),
            BinaryOperator::Lt | BinaryOperator::Gt | BinaryOperator::Le | BinaryOperator::Ge => {
                match lhs.compare(&rhs) {
                    Some(ordering) => match op {
                        BinaryOperator::Lt => ordering.is_lt(),
                        BinaryOperator::Gt => ordering.is_gt(),
                        BinaryOperator::Le => ordering.is_le(),
                        _ => ordering.is_ge(),
                    },
                    None => {
                        tracing::warn!(
                            op = op.symbol(),
                            left = lhs.type_name(),
                            right = rhs.type_name(),
                            "incomparable operands, treating comparison as false"
                        );
                        false
                    }
                }
            }
            BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
        };

        Ok(Value::Bool(result))
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Value> {
        let function = Function::resolve(name)?;
        function.check_arity(args.len())?;

        let args = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>>>()?;

        let result = match function {
            Function::Contains => args[0].contains(&args[1]).unwrap_or(false),
            Function::StartsWith => match (&args[0], &args[1]) {
                (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            Function::EndsWith => match (&args[0], &args[1]) {
                (Value::String(s), Value::String(suffix)) => s.ends_with(suffix.as_str()),
                _ => false,
            },
            Function::HasGroup => self
                .context
                .resolve("user.groups")
                .contains(&args[0])
                .unwrap_or(false),
            Function::HasRole => {
                let role = self.context.resolve("user.role");
                !role.is_null() && role == args[0]
            }
            Function::OwnsRecord | Function::IsCreator => {
                let user_id = self.context.resolve("user.id");
                let owner_id = self.context.resolve("record.owner_id");
                !user_id.is_null() && !owner_id.is_null() && user_id == owner_id
            }
            Function::InTimeRange => self.in_time_range(&args[0], &args[1]),
            Function::HasPermission => match &args[1] {
                Value::String(collection) => match self.context.resolve("permissions").member(collection) {
                    actions @ Value::List(_) => actions.contains(&args[0]).unwrap_or(false),
                    _ => false,
                },
                _ => false,
            },
        };

        tracing::trace!(function = function.name(), result, "function evaluated");
        Ok(Value::Bool(result))
    }

    /// `start <= 현재 시 < end`
    fn in_time_range(&self, start: &Value, end: &Value) -> bool {
        let now = self.now.unwrap_or_else(|| Local::now().naive_local());
        let hour = Value::Int(i64::from(now.hour()));

        match (start.compare(&hour), hour.compare(end)) {
            (Some(lower), Some(upper)) => lower.is_le() && upper.is_lt(),
            _ => false,
        }
    }
}

/// 규칙 평가 (센티널 처리 포함)
///
/// - `None`: 모두 거부
/// - `""`: 모두 허용
pub fn evaluate_rule(rule: Option<&str>, context: &Context) -> Result<bool> {
    match rule {
        None => Ok(false),
        Some("") => Ok(true),
        Some(source) => {
            let expr = parse(source)?;
            Evaluator::new(context).evaluate_bool(&expr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::value::Attributes;
    use chrono::NaiveDate;
    use serde_json::json;

    fn eval(source: &str, ctx: &Context) -> Result<Value> {
        Evaluator::new(ctx).evaluate(&parse(source)?)
    }

    fn eval_bool(source: &str, ctx: &Context) -> bool {
        Evaluator::new(ctx).evaluate_bool(&parse(source).unwrap()).unwrap()
    }

    fn at_hour(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn owner_ctx(owner: &str) -> Context {
        Context::new()
            .with_user(json!({ "id": "u1" }))
            .with_record(json!({ "owner_id": owner }))
    }

    #[test]
    fn test_owns_record() {
        assert!(eval_bool("@owns_record()", &owner_ctx("u1")));
        assert!(!eval_bool("@owns_record()", &owner_ctx("u2")));
        assert!(eval_bool("@is_creator()", &owner_ctx("u1")));
    }

    #[test]
    fn test_owns_record_requires_both_sides() {
        let ctx = Context::new().with_record(json!({ "owner_id": null }));
        assert!(!eval_bool("@owns_record()", &ctx));
        assert!(!eval_bool("@owns_record()", &Context::new()));
    }

    #[test]
    fn test_short_circuit_skips_erroring_operand() {
        let ctx = Context::new();
        assert!(!eval_bool("false and @no_such_macro()", &ctx));
        assert!(eval_bool("true or @no_such_macro()", &ctx));
        assert!(eval("true and @no_such_macro()", &ctx).is_err());
    }

    #[test]
    fn test_missing_path_resolves_to_null() {
        let ctx = Context::new();
        assert_eq!(eval("a.b.c", &ctx).unwrap(), Value::Null);
        assert!(eval_bool("a.b.c == null", &ctx));
    }

    #[test]
    fn test_equality_and_ordering() {
        let ctx = Context::new().with_record(json!({ "views": 10, "status": "published" }));
        assert!(eval_bool("record.status == 'published'", &ctx));
        assert!(eval_bool("record.views > 5 and record.views <= 10", &ctx));
        assert!(eval_bool("record.views == 10.0", &ctx));
        assert!(!eval_bool("record.views == '10'", &ctx));
    }

    #[test]
    fn test_incomparable_ordering_is_false() {
        let ctx = Context::new();
        assert!(!eval_bool("missing < 3", &ctx));
        assert!(!eval_bool("missing >= 3", &ctx));
        assert!(!eval_bool("'a' < 1", &ctx));
    }

    #[test]
    fn test_not_uses_truthiness() {
        let ctx = Context::new().with_record(json!({ "tags": [], "count": 0, "name": "x" }));
        assert!(eval_bool("not record.tags", &ctx));
        assert!(eval_bool("not record.count", &ctx));
        assert!(eval_bool("not missing", &ctx));
        assert!(!eval_bool("not record.name", &ctx));
    }

    #[test]
    fn test_membership() {
        let ctx = Context::new().with_record(json!({ "status": "draft", "tags": ["a", "b"] }));
        assert!(eval_bool("record.status in ['draft', 'review']", &ctx));
        assert!(!eval_bool("record.status in []", &ctx));
        assert!(eval_bool("'a' in record.tags", &ctx));
        assert!(!eval_bool("'a' in record.missing", &ctx));
    }

    #[test]
    fn test_string_functions() {
        let ctx = Context::new().with_record(json!({ "title": "Re: hello", "n": 3 }));
        assert!(eval_bool("starts_with(record.title, 'Re:')", &ctx));
        assert!(eval_bool("ends_with(record.title, 'hello')", &ctx));
        assert!(eval_bool("contains(record.title, 'e: h')", &ctx));
        assert!(!eval_bool("starts_with(record.n, '3')", &ctx));
        assert!(!eval_bool("contains(null, 'x')", &ctx));
        assert!(!eval_bool("contains(record.n, 3)", &ctx));
    }

    #[test]
    fn test_has_group_and_role() {
        let ctx = Context::new().with_user(json!({ "role": "admin", "groups": ["staff", "ops"] }));
        assert!(eval_bool("@has_group('ops')", &ctx));
        assert!(!eval_bool("@has_group('sales')", &ctx));
        assert!(eval_bool("@has_role('admin')", &ctx));
        assert!(!eval_bool("@has_role('editor')", &ctx));

        let anonymous = Context::new();
        assert!(!eval_bool("@has_role(null)", &anonymous));
        assert!(!eval_bool("@has_group('ops')", &anonymous));
    }

    #[test]
    fn test_has_permission() {
        let ctx = Context::new().with_permissions(json!({
            "posts": ["read", "write"],
            "comments": "read",
        }));
        assert!(eval_bool("@has_permission('write', 'posts')", &ctx));
        assert!(!eval_bool("@has_permission('delete', 'posts')", &ctx));
        assert!(!eval_bool("@has_permission('read', 'comments')", &ctx));
        assert!(!eval_bool("@has_permission('read', 'users')", &ctx));
    }

    #[test]
    fn test_in_time_range_uses_clock() {
        let ctx = Context::new();
        let expr = parse("@in_time_range(9, 17)").unwrap();

        let evaluator = Evaluator::new(&ctx).with_clock(at_hour(9));
        assert!(evaluator.evaluate_bool(&expr).unwrap());

        let evaluator = Evaluator::new(&ctx).with_clock(at_hour(17));
        assert!(!evaluator.evaluate_bool(&expr).unwrap());

        let expr = parse("@in_time_range('9', 17)").unwrap();
        let evaluator = Evaluator::new(&ctx).with_clock(at_hour(12));
        assert!(!evaluator.evaluate_bool(&expr).unwrap());
    }

    #[test]
    fn test_unknown_function_is_error() {
        let err = eval("@is_admin()", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::Evaluation { .. }));
    }

    #[test]
    fn test_wrong_arity_is_error() {
        let err = eval("@has_role()", &Context::new()).unwrap_err();
        assert!(err.to_string().contains("takes 1 argument"));
    }

    #[test]
    fn test_request_variables_resolve_in_process() {
        let ctx = Context::new()
            .with_record(json!({ "created_by": "u1" }))
            .with_request(json!({ "auth": { "id": "u1" } }));
        assert!(eval_bool("record.created_by == @request.auth.id", &ctx));
    }

    #[test]
    fn test_evaluate_rule_sentinels() {
        let ctx = Context::new();
        assert!(!evaluate_rule(None, &ctx).unwrap());
        assert!(evaluate_rule(Some(""), &ctx).unwrap());
        assert!(evaluate_rule(Some("1 == 1"), &ctx).unwrap());
        assert!(evaluate_rule(Some("1 ="), &ctx).is_err());
    }

    #[derive(Debug)]
    struct Member {
        id: &'static str,
        role: &'static str,
        groups: Vec<&'static str>,
    }

    impl Attributes for Member {
        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::from(self.id)),
                "role" => Some(Value::from(self.role)),
                "groups" => Some(Value::from(self.groups.clone())),
                _ => None,
            }
        }
    }

    #[test]
    fn test_macros_accept_object_user() {
        let record = json!({ "owner_id": "u1" });
        let as_map = Context::new()
            .with_user(json!({ "id": "u1", "role": "admin", "groups": ["staff", "ops"] }))
            .with_record(record.clone());
        let as_object = Context::new()
            .with_user(Value::object(Member {
                id: "u1",
                role: "admin",
                groups: vec!["staff", "ops"],
            }))
            .with_record(record);

        for rule in [
            "@has_group('ops')",
            "@has_group('sales')",
            "@has_role('admin')",
            "@has_role('editor')",
            "@owns_record()",
            "@is_creator()",
            "user.groups == ['staff', 'ops']",
        ] {
            assert_eq!(
                eval_bool(rule, &as_object),
                eval_bool(rule, &as_map),
                "{rule}"
            );
        }
        assert!(eval_bool("@has_group('ops') and @has_role('admin') and @owns_record()", &as_object));
        assert!(!eval_bool("@has_group('sales') or @has_role('editor')", &as_object));
    }

    #[test]
    fn test_deep_rule_is_error_not_crash() {
        let rule = format!("{}true{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            evaluate_rule(Some(&rule), &Context::new()),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn test_context_is_not_mutated() {
        let ctx = owner_ctx("u1");
        let before = format!("{:?}", ctx);
        eval_bool("@owns_record() and record.owner_id == 'u1'", &ctx);
        assert_eq!(format!("{:?}", ctx), before);
    }
}
