//! rulekit CLI (`rk`)
//!
//! 컬렉션 규칙을 파싱, 검증, 컴파일, 평가하는 Operator 도구입니다.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use rulekit_core::Operation;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;

use commands::compile::Target;
use config::{CliConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "rk")]
#[command(author, version, about = "rulekit CLI - check, compile and evaluate collection access rules", long_about = None)]
struct Cli {
    /// Collections file or directory (overrides env and context)
    #[arg(long, global = true)]
    collections: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Rules
    // ─────────────────────────────────────────────────────────────────────────
    /// Parse a rule and print its AST
    Parse {
        /// Rule expression
        rule: String,
    },

    /// Validate every rule of every collection
    Check {
        /// Only check this collection
        #[arg(long)]
        collection: Option<String>,
    },

    /// Compile a rule into a parameterized SQL filter
    Compile {
        /// Rule expression (instead of --collection/--op)
        rule: Option<String>,

        #[arg(long)]
        collection: Option<String>,

        #[arg(long, value_parser = commands::parse_operation)]
        op: Option<Operation>,

        /// Auth field bound at compile time (repeatable, e.g. --auth id=u1)
        #[arg(long = "auth", value_parser = commands::parse_key_val)]
        auth: Vec<(String, String)>,
    },

    /// Evaluate a rule against a JSON context
    Eval {
        /// Rule expression (instead of --collection/--op)
        rule: Option<String>,

        #[arg(long)]
        collection: Option<String>,

        #[arg(long, value_parser = commands::parse_operation)]
        op: Option<Operation>,

        /// JSON file with the evaluation context (user, record, permissions, @request)
        #[arg(long = "context")]
        context_file: Option<PathBuf>,

        /// Fixed local time for time-window rules (e.g. 2024-05-01T10:30:00)
        #[arg(long)]
        now: Option<NaiveDateTime>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Context
    // ─────────────────────────────────────────────────────────────────────────
    /// Manage repo context
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },
}

#[derive(Subcommand)]
enum ContextAction {
    /// Set repo context
    Set {
        #[arg(long)]
        collections: Option<PathBuf>,
    },
    /// Show current context
    Show,
    /// Clear context
    Clear,
}

/// 규칙 인자 또는 --collection/--op 조합에서 대상 결정
fn target(
    rule: Option<String>,
    collection: Option<String>,
    op: Option<Operation>,
) -> anyhow::Result<Target> {
    match (rule, collection, op) {
        (Some(rule), None, None) => Ok(Target::Rule(rule)),
        (None, Some(name), Some(op)) => Ok(Target::Collection { name, op }),
        (None, Some(_), None) => anyhow::bail!("--op is required with --collection"),
        (Some(_), _, _) => anyhow::bail!("Give either a rule or --collection/--op, not both"),
        (None, None, _) => anyhow::bail!("Specify a rule or --collection with --op"),
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 로그는 stderr로 (stdout은 명령 출력 전용)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "rk=info,rulekit_core=warn,rulekit_sql=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 설정 로드
    let config = CliConfig::load()?;

    // 컨텍스트 결정 (CLI 옵션 > 환경 변수 > repo context > 설정)
    let effective_context = context::resolve_context(&config, cli.collections, cli.format);

    // 명령 실행
    match cli.command {
        Commands::Parse { rule } => commands::parse::run(&rule, effective_context.format),

        Commands::Check { collection } => commands::check::run(
            effective_context.require_collections()?,
            collection.as_deref(),
            effective_context.format,
        ),

        Commands::Compile {
            rule,
            collection,
            op,
            auth,
        } => commands::compile::run(&effective_context, target(rule, collection, op)?, auth),

        Commands::Eval {
            rule,
            collection,
            op,
            context_file,
            now,
        } => commands::eval::run(
            &effective_context,
            target(rule, collection, op)?,
            context_file.as_deref(),
            now,
        ),

        Commands::Context { action } => match action {
            ContextAction::Set { collections } => commands::context::set(collections),
            ContextAction::Show => commands::context::show(),
            ContextAction::Clear => commands::context::clear(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_arguments() {
        let cli = Cli::parse_from([
            "rk",
            "compile",
            "--collection",
            "posts",
            "--op",
            "list",
            "--auth",
            "id=u1",
            "--format",
            "json",
        ]);
        assert_eq!(cli.format, Some(OutputFormat::Json));

        let Commands::Compile {
            rule,
            collection,
            op,
            auth,
        } = cli.command
        else {
            panic!("expected compile command");
        };
        assert!(rule.is_none());
        assert_eq!(collection.as_deref(), Some("posts"));
        assert_eq!(op, Some(Operation::List));
        assert_eq!(auth, vec![("id".to_string(), "u1".to_string())]);
    }

    #[test]
    fn test_target_selection() {
        assert!(matches!(
            target(Some("a == 1".to_string()), None, None),
            Ok(Target::Rule(_))
        ));
        assert!(matches!(
            target(None, Some("posts".to_string()), Some(Operation::View)),
            Ok(Target::Collection { .. })
        ));
        assert!(target(None, Some("posts".to_string()), None).is_err());
        assert!(target(None, None, None).is_err());
    }
}
