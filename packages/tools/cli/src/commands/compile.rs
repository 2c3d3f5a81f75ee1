//! SQL 컴파일 명령어

use rulekit_core::Operation;
use rulekit_sql::{AuthContext, CollectionAccess, SqlCompiler, SqlFilter};

use crate::commands::{find_collection, load_collections, print_json};
use crate::config::OutputFormat;
use crate::context::EffectiveContext;

/// 컴파일 대상
pub enum Target {
    /// 명령행에 직접 준 규칙
    Rule(String),

    /// 컬렉션 정의의 작업 규칙
    Collection { name: String, op: Operation },
}

pub fn run(ctx: &EffectiveContext, target: Target, auth: Vec<(String, String)>) -> anyhow::Result<()> {
    let auth = AuthContext::from_pairs(auth);

    let filter = match target {
        Target::Rule(rule) => SqlCompiler::new(auth).compile(Some(&rule))?,
        Target::Collection { name, op } => {
            let set = load_collections(ctx.require_collections()?)?;
            let collection = find_collection(&set, &name)?;
            CollectionAccess::new(collection).filter(op, &auth)?
        }
    };

    match ctx.format {
        OutputFormat::Json => print_json(&filter)?,
        OutputFormat::Text => print_text(&filter),
    }

    Ok(())
}

fn print_text(filter: &SqlFilter) {
    println!("{}", filter.sql);
    if !filter.params.is_empty() {
        println!();
        for (name, value) in &filter.params {
            println!("  :{} = {}", name, value.to_json());
        }
    }
}
