//! 규칙 평가 명령어
//!
//! JSON 컨텍스트 파일에 대해 규칙을 프로세스 내에서 평가합니다.

use std::path::Path;

use chrono::NaiveDateTime;
use rulekit_core::rule::Evaluator;
use rulekit_core::{AccessDecision, Context};
use rulekit_sql::CollectionAccess;

use crate::commands::compile::Target;
use crate::commands::{find_collection, load_collections, print_json};
use crate::config::OutputFormat;
use crate::context::EffectiveContext;

pub fn run(
    ctx: &EffectiveContext,
    target: Target,
    context_file: Option<&Path>,
    now: Option<NaiveDateTime>,
) -> anyhow::Result<()> {
    let context = match context_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?;
            Context::from_json(serde_json::from_str(&content)?)?
        }
        None => Context::new(),
    };

    let decision = match target {
        Target::Rule(rule) => {
            let expr = rulekit_core::parse(&rule)?;
            let mut evaluator = Evaluator::new(&context);
            if let Some(now) = now {
                evaluator = evaluator.with_clock(now);
            }
            if evaluator.evaluate_bool(&expr)? {
                AccessDecision::allow()
            } else {
                AccessDecision::deny("rule evaluated to false")
            }
        }
        Target::Collection { name, op } => {
            let set = load_collections(ctx.require_collections()?)?;
            let collection = find_collection(&set, &name)?;
            let mut access = CollectionAccess::new(collection);
            if let Some(now) = now {
                access = access.with_clock(now);
            }
            access.authorize(op, &context)?
        }
    };

    match ctx.format {
        OutputFormat::Json => print_json(&decision_json(&decision))?,
        OutputFormat::Text => match &decision.reason {
            None => println!("allowed"),
            Some(reason) => println!("denied: {}", reason),
        },
    }

    Ok(())
}

fn decision_json(decision: &AccessDecision) -> serde_json::Value {
    serde_json::json!({
        "allowed": decision.allowed,
        "reason": decision.reason,
    })
}
