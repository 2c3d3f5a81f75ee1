//! 컬렉션 정의
//!
//! 필드 목록과 작업별 규칙을 묶은 컬렉션, 그리고 전체 컬렉션 집합입니다.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::field::Field;
use crate::error::Error;
use crate::permissions::{CollectionRules, Operation};

/// 컬렉션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// 컬렉션 이름
    pub name: String,

    /// 필드 목록 (시스템 필드 포함)
    pub fields: Vec<Field>,

    /// 작업별 규칙
    #[serde(default)]
    pub rules: CollectionRules,
}

impl Collection {
    /// 시스템 필드만 가진 새 컬렉션
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Field::system_fields(),
            rules: CollectionRules::default(),
        }
    }

    /// 필드 추가 (같은 이름이 있으면 교체)
    pub fn add_field(&mut self, field: Field) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// 필드 조회
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 규칙 검증에 쓰는 필드 이름 목록
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// 모든 작업 규칙 검증
    pub fn validate_rules(&self) -> Vec<(Operation, Error)> {
        self.rules.validate_all(&self.field_names())
    }
}

/// 관계 검증 에러
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationError {
    pub collection: String,
    pub field: String,
    pub target: String,
}

/// 컬렉션 집합
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionSet {
    /// 컬렉션 맵 (이름 -> 정의)
    pub collections: BTreeMap<String, Collection>,
}

impl CollectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 컬렉션 추가
    ///
    /// 같은 이름이 이미 있으면 `DuplicateCollection` 에러를 반환합니다.
    pub fn insert(&mut self, collection: Collection) -> crate::error::Result<()> {
        if self.collections.contains_key(&collection.name) {
            return Err(Error::DuplicateCollection {
                name: collection.name,
            });
        }
        self.collections.insert(collection.name.clone(), collection);
        Ok(())
    }

    /// 컬렉션 조회
    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// 모든 컬렉션 이름 (정렬됨)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(|s| s.as_str())
    }

    /// 모든 컬렉션
    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// relation 필드가 존재하는 컬렉션을 가리키는지 확인
    pub fn validate_relations(&self) -> Vec<RelationError> {
        let mut errors = Vec::new();

        for collection in self.collections.values() {
            for field in &collection.fields {
                if let Some(target) = field.field_type.relation_target() {
                    if !self.collections.contains_key(target) {
                        errors.push(RelationError {
                            collection: collection.name.clone(),
                            field: field.name.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        errors
    }

    /// 모든 컬렉션의 규칙 검증
    ///
    /// 실패마다 (컬렉션 이름, 작업, 에러)를 반환합니다.
    pub fn validate_rules(&self) -> Vec<(&str, Operation, Error)> {
        self.collections
            .values()
            .flat_map(|c| {
                c.validate_rules()
                    .into_iter()
                    .map(move |(op, e)| (c.name.as_str(), op, e))
            })
            .collect()
    }
}
