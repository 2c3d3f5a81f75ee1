//! 내장 함수/매크로 테이블
//!
//! 이름 → 함수는 닫힌 집합입니다. 평가기, SQL 컴파일러, 검증기가 같은 테이블을 씁니다.

use crate::error::{Error, Result};

/// 내장 함수
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Contains,
    StartsWith,
    EndsWith,
    HasGroup,
    HasRole,
    OwnsRecord,
    IsCreator,
    InTimeRange,
    HasPermission,
}

const FUNCTIONS: &[(&str, Function)] = &[
    ("contains", Function::Contains),
    ("starts_with", Function::StartsWith),
    ("ends_with", Function::EndsWith),
    ("@has_group", Function::HasGroup),
    ("@has_role", Function::HasRole),
    ("@owns_record", Function::OwnsRecord),
    ("@is_creator", Function::IsCreator),
    ("@in_time_range", Function::InTimeRange),
    ("@has_permission", Function::HasPermission),
];

impl Function {
    /// 이름으로 조회 (정확히 일치해야 함)
    pub fn lookup(name: &str) -> Option<Self> {
        FUNCTIONS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// 이름으로 조회, 없으면 평가 에러
    pub fn resolve(name: &str) -> Result<Self> {
        Self::lookup(name).ok_or_else(|| Error::evaluation(format!("unknown function '{}'", name)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Contains => "contains",
            Function::StartsWith => "starts_with",
            Function::EndsWith => "ends_with",
            Function::HasGroup => "@has_group",
            Function::HasRole => "@has_role",
            Function::OwnsRecord => "@owns_record",
            Function::IsCreator => "@is_creator",
            Function::InTimeRange => "@in_time_range",
            Function::HasPermission => "@has_permission",
        }
    }

    /// 인자 개수
    pub fn arity(&self) -> usize {
        match self {
            Function::OwnsRecord | Function::IsCreator => 0,
            Function::HasGroup | Function::HasRole => 1,
            Function::Contains
            | Function::StartsWith
            | Function::EndsWith
            | Function::InTimeRange
            | Function::HasPermission => 2,
        }
    }

    pub fn check_arity(&self, found: usize) -> Result<()> {
        if found == self.arity() {
            Ok(())
        } else {
            Err(Error::evaluation(format!(
                "{}() takes {} argument(s), {} given",
                self.name(),
                self.arity(),
                found
            )))
        }
    }

    /// 전체 목록
    pub fn all() -> impl Iterator<Item = Function> {
        FUNCTIONS.iter().map(|(_, f)| *f)
    }
}
