//! 컬렉션 접근 게이트
//!
//! 같은 규칙을 두 방식으로 적용합니다.
//! - `authorize`: 단건 요청을 프로세스 내에서 평가
//! - `filter`: 목록 쿼리에 붙일 WHERE 조건으로 컴파일

use chrono::NaiveDateTime;
use rulekit_core::schema::Collection;
use rulekit_core::{AccessDecision, Context, Operation, PermissionEvaluator, Result};

use crate::compiler::SqlCompiler;
use crate::params::{AuthContext, SqlFilter};

/// 컬렉션 접근 게이트
pub struct CollectionAccess<'a> {
    collection: &'a Collection,
    now: Option<NaiveDateTime>,
}

impl<'a> CollectionAccess<'a> {
    pub fn new(collection: &'a Collection) -> Self {
        Self {
            collection,
            now: None,
        }
    }

    /// 시간 규칙 평가에 쓸 현재 시각 고정
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// 작업 권한 평가
    pub fn authorize(&self, op: Operation, ctx: &Context) -> Result<AccessDecision> {
        let mut evaluator = PermissionEvaluator::new(&self.collection.rules);
        if let Some(now) = self.now {
            evaluator = evaluator.with_clock(now);
        }

        let decision = evaluator.evaluate(op, ctx)?;
        if !decision.allowed {
            tracing::info!(
                collection = %self.collection.name,
                operation = %op,
                reason = decision.reason.as_deref().unwrap_or_default(),
                "access denied"
            );
        }
        Ok(decision)
    }

    /// 작업 규칙을 SQL 필터로 컴파일
    pub fn filter(&self, op: Operation, auth: &AuthContext) -> Result<SqlFilter> {
        SqlCompiler::new(auth.clone()).compile(self.collection.rules.rule(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulekit_core::schema::SchemaParser;
    use serde_json::json;

    fn posts() -> Collection {
        let yaml = r#"
collections:
  posts:
    fields:
      status: string
      owner_id: string
    rules:
      list: "status == 'published' or @owns_record()"
      view: ""
      delete: "@has_group('moderators')"
"#;
        SchemaParser::parse_yaml(yaml).unwrap().remove(0)
    }

    #[test]
    fn test_authorize() {
        let posts = posts();
        let access = CollectionAccess::new(&posts);

        let ctx = Context::new()
            .with_user(json!({ "id": "u1", "groups": ["moderators"] }))
            .with_record(json!({ "status": "draft", "owner_id": "u2" }));

        assert!(access.authorize(Operation::View, &ctx).unwrap().allowed);
        assert!(access.authorize(Operation::Delete, &ctx).unwrap().allowed);
        assert!(!access.authorize(Operation::Update, &ctx).unwrap().allowed);
    }

    #[test]
    fn test_filter() {
        let posts = posts();
        let access = CollectionAccess::new(&posts);
        let auth = AuthContext::new().with("id", "u1");

        let filter = access.filter(Operation::List, &auth).unwrap();
        assert_eq!(filter.sql, "(status = :param_0 OR owner_id = :auth_id)");

        assert_eq!(access.filter(Operation::Update, &auth).unwrap(), SqlFilter::deny_all());
        assert!(access.filter(Operation::Delete, &auth).is_err());
    }
}
