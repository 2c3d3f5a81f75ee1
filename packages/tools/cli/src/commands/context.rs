//! 컨텍스트 명령어

use std::path::PathBuf;

use crate::context::RepoContext;

pub fn set(collections: Option<PathBuf>) -> anyhow::Result<()> {
    let mut ctx = RepoContext::load().unwrap_or_default();

    if let Some(c) = collections {
        ctx.collections = Some(c);
    }

    ctx.save()?;
    println!("Context updated.");
    show()
}

pub fn show() -> anyhow::Result<()> {
    let ctx = RepoContext::load().unwrap_or_default();

    println!("Current context (.rulekit/context.json):");
    println!(
        "  collections: {}",
        ctx.collections
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );

    Ok(())
}

pub fn clear() -> anyhow::Result<()> {
    RepoContext::clear()?;
    println!("Context cleared.");
    Ok(())
}
