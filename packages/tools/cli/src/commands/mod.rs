//! CLI 명령어 구현

pub mod check;
pub mod compile;
pub mod context;
pub mod eval;
pub mod parse;

use std::path::Path;

use rulekit_core::schema::{Collection, CollectionSet, SchemaParser};
use rulekit_core::Operation;
use serde::Serialize;

/// 컬렉션 정의 로드
///
/// 경로가 디렉터리이면 그 안의 `*.yaml`/`*.yml` 파일을 이름순으로 모두 읽습니다.
pub fn load_collections(path: &Path) -> anyhow::Result<CollectionSet> {
    let mut files = Vec::new();

    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let file = entry?.path();
            let is_yaml = matches!(
                file.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if is_yaml {
                files.push(file);
            }
        }
        files.sort();
    } else {
        files.push(path.to_path_buf());
    }

    let mut contents = Vec::with_capacity(files.len());
    for file in &files {
        let content = std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;
        contents.push(content);
    }

    let docs: Vec<&str> = contents.iter().map(|s| s.as_str()).collect();
    let set = SchemaParser::parse_multiple(&docs)?;
    tracing::debug!(files = files.len(), collections = set.len(), "collections loaded");
    Ok(set)
}

/// 컬렉션 조회 (없으면 사용 가능한 이름과 함께 에러)
pub fn find_collection<'a>(set: &'a CollectionSet, name: &str) -> anyhow::Result<&'a Collection> {
    set.get(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Collection '{}' not found. Available: {}",
            name,
            set.names().collect::<Vec<_>>().join(", ")
        )
    })
}

/// `--op` 값 파싱
pub fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::from_str(s)
        .ok_or_else(|| format!("unknown operation '{}' (expected list, view, create, update or delete)", s))
}

/// `--auth key=value` 값 파싱
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
