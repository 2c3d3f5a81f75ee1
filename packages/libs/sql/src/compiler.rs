//! 규칙 → SQL 컴파일러
//!
//! 규칙 AST를 SQL 불리언 식과 바인드 파라미터로 변환합니다.
//! 리터럴은 항상 `:param_N` 바인드로만 등장하고 SQL 텍스트에 보간되지 않습니다.

use std::collections::BTreeMap;

use rulekit_core::rule::{
    is_auth_field, parse, BinaryOperator, Expr, Function, Literal, UnaryOperator, VariableRef,
};
use rulekit_core::{Error, Result, Value};

use crate::params::{AuthContext, SqlFilter};

/// 소유자 매크로가 비교하는 컬럼
const OWNER_COLUMN: &str = "owner_id";

/// SQL 컴파일러
///
/// 인증 컨텍스트는 컴파일 시점에 `:auth_<field>`로 바인딩됩니다.
/// `compile` 호출 간에 상태를 공유하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct SqlCompiler {
    auth: AuthContext,
}

impl SqlCompiler {
    pub fn new(auth: AuthContext) -> Self {
        Self { auth }
    }

    /// 규칙 문자열 컴파일
    ///
    /// - `None` → `1=0` (모두 거부)
    /// - `""` → `1=1` (모두 허용)
    pub fn compile(&self, rule: Option<&str>) -> Result<SqlFilter> {
        let source = match rule {
            None => return Ok(SqlFilter::deny_all()),
            Some("") => return Ok(SqlFilter::allow_all()),
            Some(source) => source,
        };

        let expr = parse(source)?;
        let filter = self.compile_expr(&expr)?;
        tracing::debug!(rule = source, sql = %filter.sql, params = filter.params.len(), "rule compiled");
        Ok(filter)
    }

    /// 파싱된 AST 컴파일
    pub fn compile_expr(&self, expr: &Expr) -> Result<SqlFilter> {
        let mut compilation = Compilation::new(&self.auth);
        let sql = compilation.expr(expr)?;
        Ok(SqlFilter {
            sql,
            params: compilation.params,
        })
    }
}

/// 규칙 컴파일 (단축 함수)
pub fn compile_to_sql(rule: Option<&str>, auth: &AuthContext) -> Result<SqlFilter> {
    SqlCompiler::new(auth.clone()).compile(rule)
}

// ─────────────────────────────────────────────────────────────────────────────
// 호출 단위 상태
// ─────────────────────────────────────────────────────────────────────────────

struct Compilation<'a> {
    auth: &'a AuthContext,
    counter: usize,
    params: BTreeMap<String, Value>,
}

impl<'a> Compilation<'a> {
    fn new(auth: &'a AuthContext) -> Self {
        Self {
            auth,
            counter: 0,
            params: BTreeMap::new(),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Literal(Literal::List(_)) => Err(Error::evaluation(
                "list literals are only supported on the right of 'in'",
            )),
            Expr::Literal(literal) => Ok(self.bind(literal.to_value())),
            Expr::Variable(name) => self.variable(name),
            Expr::BinaryOp { left, op, right } => self.binary(left, *op, right),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                operand,
            } => Ok(format!("NOT ({})", self.expr(operand)?)),
            Expr::FunctionCall { name, args } => self.call(name, args),
        }
    }

    /// 새 `:param_N` 바인드 생성
    fn bind(&mut self, value: Value) -> String {
        let name = format!("param_{}", self.counter);
        self.counter += 1;
        self.params.insert(name.clone(), value);
        format!(":{}", name)
    }

    fn auth(&mut self, field: &str) -> Result<String> {
        if !is_auth_field(field) {
            return Err(Error::evaluation(format!(
                "'@request.auth.{}' is not an allowed auth field",
                field
            )));
        }
        let name = format!("auth_{}", field);
        self.params.insert(name.clone(), self.auth.get(field));
        Ok(format!(":{}", name))
    }

    fn variable(&mut self, name: &str) -> Result<String> {
        match VariableRef::classify(name) {
            VariableRef::Auth(field) => self.auth(field),
            VariableRef::Data(field) => {
                // 실제 값은 실행 시점에 호출자가 바인딩
                ensure_identifier(field, name)?;
                let param = format!("data_{}", field);
                self.params.insert(param.clone(), Value::Null);
                Ok(format!(":{}", param))
            }
            VariableRef::Field(column) => {
                ensure_identifier(column, name)?;
                Ok(column.to_string())
            }
        }
    }

    fn binary(&mut self, left: &Expr, op: BinaryOperator, right: &Expr) -> Result<String> {
        let lhs = self.expr(left)?;

        let sql = match op {
            BinaryOperator::And => format!("({} AND {})", lhs, self.expr(right)?),
            BinaryOperator::Or => format!("({} OR {})", lhs, self.expr(right)?),
            BinaryOperator::In => self.membership(lhs, right)?,
            BinaryOperator::Eq => format!("{} = {}", lhs, self.expr(right)?),
            BinaryOperator::Ne => format!("{} <> {}", lhs, self.expr(right)?),
            BinaryOperator::Lt => format!("{} < {}", lhs, self.expr(right)?),
            BinaryOperator::Gt => format!("{} > {}", lhs, self.expr(right)?),
            BinaryOperator::Le => format!("{} <= {}", lhs, self.expr(right)?),
            BinaryOperator::Ge => format!("{} >= {}", lhs, self.expr(right)?),
        };

        Ok(sql)
    }

    fn membership(&mut self, lhs: String, right: &Expr) -> Result<String> {
        let Expr::Literal(Literal::List(items)) = right else {
            return Err(Error::evaluation(
                "'in' requires a list literal on the right when compiled to SQL",
            ));
        };

        if items.is_empty() {
            return Ok("1=0".to_string());
        }

        let binds: Vec<String> = items.iter().map(|item| self.bind(item.to_value())).collect();
        Ok(format!("{} IN ({})", lhs, binds.join(", ")))
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<String> {
        let function = Function::resolve(name)?;
        function.check_arity(args.len())?;

        match function {
            Function::Contains => {
                let (haystack, needle) = self.pair(args)?;
                Ok(format!("{} LIKE '%' || {} || '%'", haystack, needle))
            }
            Function::StartsWith => {
                let (haystack, prefix) = self.pair(args)?;
                Ok(format!("{} LIKE {} || '%'", haystack, prefix))
            }
            Function::EndsWith => {
                let (haystack, suffix) = self.pair(args)?;
                Ok(format!("{} LIKE '%' || {}", haystack, suffix))
            }
            Function::HasRole => {
                let role = self.auth("role")?;
                let expected = self.expr(&args[0])?;
                Ok(format!("{} = {}", role, expected))
            }
            Function::OwnsRecord | Function::IsCreator => {
                let id = self.auth("id")?;
                Ok(format!("{} = {}", OWNER_COLUMN, id))
            }
            Function::HasGroup | Function::InTimeRange | Function::HasPermission => {
                Err(Error::evaluation(format!(
                    "{}() cannot be compiled to SQL",
                    function.name()
                )))
            }
        }
    }

    fn pair(&mut self, args: &[Expr]) -> Result<(String, String)> {
        let first = self.expr(&args[0])?;
        let second = self.expr(&args[1])?;
        Ok((first, second))
    }
}

/// 컬럼/파라미터 이름 검사: `^[A-Za-z_][A-Za-z0-9_]*$`
fn ensure_identifier(ident: &str, original: &str) -> Result<()> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::evaluation(format!(
            "'{}' is not a valid column reference",
            original
        )))
    }
}
