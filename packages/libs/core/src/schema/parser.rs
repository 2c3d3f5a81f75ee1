//! 컬렉션 YAML 파서
//!
//! `collections.yaml` 형식을 파싱하여 `CollectionSet`으로 변환합니다.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::collection::{Collection, CollectionSet};
use super::field::{Field, SYSTEM_FIELDS};
use super::types::FieldType;
use crate::error::{Error, Result};
use crate::permissions::CollectionRules;

const SUPPORTED_VERSION: u32 = 1;

/// 컬렉션 파서
pub struct SchemaParser;

impl SchemaParser {
    /// 단일 YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<Vec<Collection>> {
        let raw: RawDocument = serde_yaml::from_str(yaml)?;
        if raw.version != SUPPORTED_VERSION {
            return Err(Error::SchemaParse {
                message: format!("unsupported version {}", raw.version),
            });
        }

        raw.collections
            .into_iter()
            .map(|(name, raw)| Self::convert_raw_collection(name, raw))
            .collect()
    }

    /// 여러 YAML 문서를 파싱하여 CollectionSet 생성
    pub fn parse_multiple(yamls: &[&str]) -> Result<CollectionSet> {
        let mut collections = Vec::new();

        for yaml in yamls {
            collections.extend(Self::parse_yaml(yaml)?);
        }

        Self::build_collection_set(collections)
    }

    /// 컬렉션 목록을 CollectionSet으로 변환
    pub fn build_collection_set(collections: Vec<Collection>) -> Result<CollectionSet> {
        let mut set = CollectionSet::new();

        for collection in collections {
            set.insert(collection)?;
        }

        // 관계 검증
        if let Some(error) = set.validate_relations().into_iter().next() {
            return Err(Error::SchemaValidation {
                message: format!(
                    "field '{}.{}' references unknown collection '{}'",
                    error.collection, error.field, error.target
                ),
            });
        }

        tracing::debug!(count = set.len(), "collections loaded");
        Ok(set)
    }

    /// Raw 컬렉션을 Collection으로 변환
    fn convert_raw_collection(name: String, raw: RawCollection) -> Result<Collection> {
        let mut collection = Collection::new(name);

        for (field_name, raw_field) in raw.fields {
            if SYSTEM_FIELDS.contains(&field_name.as_str()) {
                return Err(Error::SchemaValidation {
                    message: format!(
                        "field '{}.{}' is a reserved system field",
                        collection.name, field_name
                    ),
                });
            }
            let field = Self::convert_raw_field(field_name, raw_field)?;
            collection.add_field(field);
        }

        collection.rules = raw.rules;
        Ok(collection)
    }

    /// Raw 필드 변환
    fn convert_raw_field(name: String, raw: RawField) -> Result<Field> {
        let def = match raw {
            RawField::Simple(type_name) => RawFieldDef {
                field_type: Some(type_name),
                ..Default::default()
            },
            RawField::Full(def) => def,
        };

        let field_type = Self::parse_field_type(&name, &def)?;
        Ok(Field {
            name,
            field_type,
            required: def.required.unwrap_or(false),
            system: false,
        })
    }

    /// 필드 타입 파싱
    fn parse_field_type(name: &str, def: &RawFieldDef) -> Result<FieldType> {
        let type_str = def.field_type.as_deref().unwrap_or("string");

        if let Some(simple) = FieldType::from_simple_str(type_str) {
            return Ok(simple);
        }

        match type_str {
            "list" => {
                let items = def.items.as_deref().unwrap_or("string");
                let items = FieldType::from_simple_str(items).ok_or_else(|| {
                    Error::InvalidFieldType {
                        type_name: items.to_string(),
                    }
                })?;
                Ok(FieldType::List {
                    items: Box::new(items),
                })
            }
            "relation" => {
                let collection = def.collection.clone().ok_or_else(|| Error::SchemaParse {
                    message: format!("relation field '{}' requires 'collection'", name),
                })?;
                Ok(FieldType::Relation { collection })
            }
            _ => Err(Error::InvalidFieldType {
                type_name: type_str.to_string(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw YAML 구조체 (serde 역직렬화용)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    collections: BTreeMap<String, RawCollection>,
}

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(default)]
    fields: BTreeMap<String, RawField>,
    #[serde(default)]
    rules: CollectionRules,
}

/// `title: string` 또는 `title: { type: string, required: true }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Simple(String),
    Full(RawFieldDef),
}

#[derive(Debug, Default, Deserialize)]
struct RawFieldDef {
    #[serde(rename = "type")]
    field_type: Option<String>,
    required: Option<bool>,
    // list
    items: Option<String>,
    // relation
    collection: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Operation;

    const POSTS: &str = r#"
version: 1
collections:
  posts:
    fields:
      title: { type: string, required: true }
      owner_id: { type: string }
      status: string
      tags: { type: list, items: string }
    rules:
      list: "status == 'published' or owner_id == @request.auth.id"
      view: ""
      create: "@request.auth.id != ''"
      delete: "@owns_record()"
"#;

    #[test]
    fn test_parse_collection() {
        let collections = SchemaParser::parse_yaml(POSTS).unwrap();
        assert_eq!(collections.len(), 1);

        let posts = &collections[0];
        assert_eq!(posts.name, "posts");
        assert_eq!(
            posts.field_names(),
            vec!["id", "created", "updated", "owner_id", "status", "tags", "title"]
        );
        assert!(posts.find_field("title").unwrap().required);
        assert_eq!(posts.find_field("status").unwrap().field_type, FieldType::String);
        assert!(matches!(
            posts.find_field("tags").unwrap().field_type,
            FieldType::List { .. }
        ));
    }

    #[test]
    fn test_rule_sentinels() {
        let collections = SchemaParser::parse_yaml(POSTS).unwrap();
        let rules = &collections[0].rules;
        assert_eq!(rules.rule(Operation::View), Some(""));
        assert_eq!(rules.rule(Operation::Update), None);
        assert!(collections[0].validate_rules().is_empty());
    }

    #[test]
    fn test_relation_requires_known_collection() {
        let yaml = r#"
collections:
  comments:
    fields:
      post: { type: relation, collection: posts }
"#;
        let err = SchemaParser::parse_multiple(&[yaml]).unwrap_err();
        assert!(matches!(err, Error::SchemaValidation { .. }));

        let set = SchemaParser::parse_multiple(&[yaml, POSTS]).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["comments", "posts"]);
    }

    #[test]
    fn test_duplicate_collection_across_files() {
        let err = SchemaParser::parse_multiple(&[POSTS, POSTS]).unwrap_err();
        assert!(matches!(err, Error::DuplicateCollection { .. }));
    }

    #[test]
    fn test_invalid_field_type() {
        let yaml = r#"
collections:
  posts:
    fields:
      body: blob
"#;
        let err = SchemaParser::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidFieldType { ref type_name } if type_name == "blob"));
    }

    #[test]
    fn test_reserved_field_name() {
        let yaml = r#"
collections:
  posts:
    fields:
      created: timestamp
"#;
        assert!(SchemaParser::parse_yaml(yaml).is_err());
    }

    #[test]
    fn test_unsupported_version() {
        let err = SchemaParser::parse_yaml("version: 2\ncollections: {}\n").unwrap_err();
        assert!(matches!(err, Error::SchemaParse { .. }));
    }
}
