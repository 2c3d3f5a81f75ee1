//! 권한 평가기
//!
//! 요청 컨텍스트에 대해 컬렉션 작업 규칙을 평가합니다.

use chrono::NaiveDateTime;

use super::context::Context;
use super::policy::{CollectionRules, Operation};
use crate::error::Result;
use crate::rule::{parse, Evaluator};

/// 접근 판정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    /// 허용 여부
    pub allowed: bool,

    /// 거부 사유 (allowed=false인 경우)
    pub reason: Option<String>,
}

impl AccessDecision {
    /// 허용 결과 생성
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// 거부 결과 생성
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// 권한 평가기
///
/// 컬렉션 규칙과 컨텍스트를 기반으로 접근을 허용/거부합니다.
pub struct PermissionEvaluator<'a> {
    rules: &'a CollectionRules,
    now: Option<NaiveDateTime>,
}

impl<'a> PermissionEvaluator<'a> {
    /// 새 평가기 생성
    pub fn new(rules: &'a CollectionRules) -> Self {
        Self { rules, now: None }
    }

    /// 시간 규칙 평가에 쓸 현재 시각 고정
    pub fn with_clock(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// 작업 권한 평가
    ///
    /// # Arguments
    /// * `op` - 작업 타입
    /// * `ctx` - 평가 컨텍스트
    pub fn evaluate(&self, op: Operation, ctx: &Context) -> Result<AccessDecision> {
        let source = match self.rules.rule(op) {
            None => return Ok(AccessDecision::deny(format!("no {} rule defined", op))),
            Some("") => return Ok(AccessDecision::allow()),
            Some(source) => source,
        };

        let expr = parse(source)?;
        let mut evaluator = Evaluator::new(ctx);
        if let Some(now) = self.now {
            evaluator = evaluator.with_clock(now);
        }

        let decision = if evaluator.evaluate_bool(&expr)? {
            AccessDecision::allow()
        } else {
            AccessDecision::deny(format!("{} rule evaluated to false", op))
        };

        tracing::debug!(operation = %op, rule = source, allowed = decision.allowed, "access evaluated");
        Ok(decision)
    }
}
