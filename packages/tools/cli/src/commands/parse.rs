//! 규칙 파싱 명령어

use crate::commands::print_json;
use crate::config::OutputFormat;

pub fn run(source: &str, format: OutputFormat) -> anyhow::Result<()> {
    let expr = match rulekit_core::parse(source) {
        Ok(expr) => expr,
        Err(e) => {
            if let Some(position) = e.position() {
                eprintln!("  {}", source);
                eprintln!("  {}^", " ".repeat(position));
            }
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Text => println!("{}", expr),
        OutputFormat::Json => print_json(&expr)?,
    }

    Ok(())
}
