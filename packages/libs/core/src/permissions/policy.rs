//! 컬렉션 규칙 정의
//!
//! 컬렉션의 작업별 규칙 문자열을 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rule::RuleValidator;

/// 컬렉션 작업 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    View,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::View,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    /// 문자열에서 파싱
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "list" => Some(Operation::List),
            "view" => Some(Operation::View),
            "create" => Some(Operation::Create),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            _ => None,
        }
    }

    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::View => "view",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// `@request.data.*` 참조 허용 여부 (요청 본문이 있는 작업만)
    pub fn allows_request_data(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 컬렉션 규칙 집합
///
/// 각 값의 의미:
/// - `None` (키 생략 또는 YAML `null`): 모두 거부
/// - `Some("")`: 모두 허용
/// - `Some(expr)`: 규칙 표현식
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRules {
    #[serde(default)]
    pub list: Option<String>,

    #[serde(default)]
    pub view: Option<String>,

    #[serde(default)]
    pub create: Option<String>,

    #[serde(default)]
    pub update: Option<String>,

    #[serde(default)]
    pub delete: Option<String>,
}

impl CollectionRules {
    /// 특정 작업의 규칙 가져오기
    pub fn rule(&self, op: Operation) -> Option<&str> {
        match op {
            Operation::List => self.list.as_deref(),
            Operation::View => self.view.as_deref(),
            Operation::Create => self.create.as_deref(),
            Operation::Update => self.update.as_deref(),
            Operation::Delete => self.delete.as_deref(),
        }
    }

    /// 특정 작업의 규칙 설정
    pub fn set(&mut self, op: Operation, rule: Option<String>) {
        let slot = match op {
            Operation::List => &mut self.list,
            Operation::View => &mut self.view,
            Operation::Create => &mut self.create,
            Operation::Update => &mut self.update,
            Operation::Delete => &mut self.delete,
        };
        *slot = rule;
    }

    /// 모든 작업의 규칙 검증
    ///
    /// 실패한 작업마다 (작업, 에러)를 반환합니다. 빈 목록이면 전부 통과입니다.
    pub fn validate_all<'a>(&self, fields: &[&'a str]) -> Vec<(Operation, Error)> {
        Operation::ALL
            .iter()
            .filter_map(|&op| {
                RuleValidator::new(op, fields.iter().copied())
                    .validate(self.rule(op))
                    .err()
                    .map(|e| (op, e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules_yaml() {
        let yaml = r#"
list: "status == 'published'"
view: ""
delete: null
"#;

        let rules: CollectionRules = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.rule(Operation::List), Some("status == 'published'"));
        assert_eq!(rules.rule(Operation::View), Some(""));
        assert_eq!(rules.rule(Operation::Create), None);
        assert_eq!(rules.rule(Operation::Delete), None);
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!(Operation::from_str("LIST"), Some(Operation::List));
        assert_eq!(Operation::from_str("delete"), Some(Operation::Delete));
        assert_eq!(Operation::from_str("select"), None);
        assert_eq!(Operation::Update.to_string(), "update");
        assert!(Operation::Create.allows_request_data());
        assert!(!Operation::View.allows_request_data());
    }

    #[test]
    fn test_set_rule() {
        let mut rules = CollectionRules::default();
        rules.set(Operation::Update, Some("@owns_record()".to_string()));
        assert_eq!(rules.rule(Operation::Update), Some("@owns_record()"));
    }

    #[test]
    fn test_validate_all_reports_each_operation() {
        let rules = CollectionRules {
            list: Some("ghost == 1".to_string()),
            view: Some("title == 'x'".to_string()),
            create: Some("title ==".to_string()),
            update: Some("@request.data.title != ''".to_string()),
            delete: Some("@request.data.title != ''".to_string()),
        };

        let failures = rules.validate_all(&["title"]);
        let ops: Vec<Operation> = failures.iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![Operation::List, Operation::Create, Operation::Delete]);
        assert!(matches!(failures[1].1, Error::Syntax { .. }));
    }
}
