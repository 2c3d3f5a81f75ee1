//! 규칙 검증 명령어
//!
//! 모든 컬렉션의 모든 작업 규칙을 검증합니다. 실패가 있으면 0이 아닌 종료 코드로 끝납니다.

use std::path::Path;

use rulekit_core::{Error, Operation};
use serde::Serialize;

use crate::commands::{find_collection, load_collections, print_json};
use crate::config::OutputFormat;

#[derive(Serialize)]
struct Failure<'a> {
    collection: &'a str,
    operation: String,
    code: &'static str,
    message: String,
    violations: Vec<String>,
}

pub fn run(path: &Path, only: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let set = load_collections(path)?;

    let results: Vec<(&str, Operation, Error)> = match only {
        Some(name) => find_collection(&set, name)?
            .validate_rules()
            .into_iter()
            .map(|(op, e)| (name, op, e))
            .collect(),
        None => set.validate_rules(),
    };

    let failures: Vec<Failure> = results
        .iter()
        .map(|(collection, op, e)| Failure {
            collection: *collection,
            operation: op.to_string(),
            code: e.code(),
            message: e.to_string(),
            violations: e.violations().iter().map(|v| v.to_string()).collect(),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&failures)?,
        OutputFormat::Text => {
            let checked = only.map_or(set.len(), |_| 1);
            for f in &failures {
                println!("✗ {}.{}: {}", f.collection, f.operation, f.message);
            }
            if failures.is_empty() {
                println!("✓ {} collection(s) checked, all rules valid", checked);
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} rule(s) failed validation", failures.len())
    }
}
