//! Repo Context 관리
//!
//! `.rulekit/context.json` 파일을 통해 repo-local 컨텍스트를 관리합니다.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{CliConfig, OutputFormat};

/// 컬렉션 파일 경로 환경 변수
pub const COLLECTIONS_ENV: &str = "RULEKIT_COLLECTIONS";

/// Repo Context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<PathBuf>,
}

/// Effective Context (최종 결정된 컨텍스트)
#[derive(Debug, Clone)]
pub struct EffectiveContext {
    pub collections: Option<PathBuf>,
    pub format: OutputFormat,
}

impl EffectiveContext {
    /// 컬렉션 파일 필수 검증
    pub fn require_collections(&self) -> anyhow::Result<&PathBuf> {
        self.collections.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "Collections file not specified. Use --collections, {} or 'rk context set'",
                COLLECTIONS_ENV
            )
        })
    }
}

impl RepoContext {
    /// 컨텍스트 파일 경로
    fn context_path() -> PathBuf {
        PathBuf::from(".rulekit/context.json")
    }

    /// 컨텍스트 로드
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::context_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let ctx: RepoContext = serde_json::from_str(&content)?;
            Ok(ctx)
        } else {
            Ok(Self::default())
        }
    }

    /// 컨텍스트 저장
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::context_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// 컨텍스트 삭제
    pub fn clear() -> anyhow::Result<()> {
        let path = Self::context_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// 컨텍스트 결정 (CLI 옵션 > 환경 변수 > repo context > 사용자 설정)
pub fn resolve_context(
    config: &CliConfig,
    collections: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> EffectiveContext {
    let repo_ctx = RepoContext::load().unwrap_or_default();
    let from_env = std::env::var_os(COLLECTIONS_ENV).map(PathBuf::from);

    EffectiveContext {
        collections: collections
            .or(from_env)
            .or(repo_ctx.collections)
            .or_else(|| config.collections.clone()),
        format: format.or(config.format).unwrap_or_default(),
    }
}
