use chrono::NaiveDate;
use rulekit_core::schema::SchemaParser;
use rulekit_core::{Context, Error, Operation, Value};
use rulekit_sql::{AuthContext, CollectionAccess, SqlFilter};
use serde_json::json;

const COLLECTIONS: &str = r#"
version: 1
collections:
  users:
    fields:
      email: { type: string, required: true }
      role: string
  posts:
    fields:
      title: { type: string, required: true }
      status: string
      owner_id: string
      author: { type: relation, collection: users }
    rules:
      list: "status == 'published' or owner_id == @request.auth.id"
      view: ""
      create: "@request.auth.id != '' and @request.data.status in ['draft', 'published']"
      update: "@owns_record() or @has_role('admin')"
      delete: null
  reports:
    fields:
      body: string
    rules:
      list: "@in_time_range(9, 17)"
"#;

#[test]
fn test_collections_load_and_validate() {
    let set = SchemaParser::parse_multiple(&[COLLECTIONS]).unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), vec!["posts", "reports", "users"]);
    assert!(set.validate_rules().is_empty());
}

#[test]
fn test_invalid_rule_is_reported_with_operation() {
    let yaml = r#"
collections:
  posts:
    fields:
      title: string
    rules:
      list: "ghost == 1 or @request.auth.password == ''"
      view: "@request.data.title != ''"
"#;
    let set = SchemaParser::parse_multiple(&[yaml]).unwrap();
    let failures = set.validate_rules();
    assert_eq!(failures.len(), 2);

    let (collection, op, err) = &failures[0];
    assert_eq!(*collection, "posts");
    assert_eq!(*op, Operation::List);
    assert_eq!(err.violations().len(), 2);
    assert_eq!(failures[1].1, Operation::View);
}

#[test]
fn test_same_rule_in_both_modes() {
    let set = SchemaParser::parse_multiple(&[COLLECTIONS]).unwrap();
    let posts = set.get("posts").unwrap();
    let access = CollectionAccess::new(posts);

    let ctx = Context::new()
        .with_user(json!({ "id": "u1", "role": "writer" }))
        .with_request(json!({ "auth": { "id": "u1" } }))
        .with("status", "draft")
        .with("owner_id", "u1");
    assert!(access.authorize(Operation::List, &ctx).unwrap().allowed);

    let ctx = Context::new()
        .with_request(json!({ "auth": { "id": "u2" } }))
        .with("status", "draft")
        .with("owner_id", "u1");
    assert!(!access.authorize(Operation::List, &ctx).unwrap().allowed);

    let filter = access
        .filter(Operation::List, &AuthContext::new().with("id", "u1"))
        .unwrap();
    assert_eq!(filter.sql, "(status = :param_0 OR owner_id = :auth_id)");
    assert_eq!(filter.params.get("param_0"), Some(&Value::from("published")));
    assert_eq!(filter.params.get("auth_id"), Some(&Value::from("u1")));
}

#[test]
fn test_sentinels_in_both_modes() {
    let set = SchemaParser::parse_multiple(&[COLLECTIONS]).unwrap();
    let posts = set.get("posts").unwrap();
    let access = CollectionAccess::new(posts);
    let auth = AuthContext::new();

    assert!(access.authorize(Operation::View, &Context::new()).unwrap().allowed);
    assert_eq!(access.filter(Operation::View, &auth).unwrap(), SqlFilter::allow_all());

    assert!(!access.authorize(Operation::Delete, &Context::new()).unwrap().allowed);
    assert_eq!(access.filter(Operation::Delete, &auth).unwrap(), SqlFilter::deny_all());
}

#[test]
fn test_create_rule_reserves_data_params() {
    let set = SchemaParser::parse_multiple(&[COLLECTIONS]).unwrap();
    let access = CollectionAccess::new(set.get("posts").unwrap());

    let filter = access
        .filter(Operation::Create, &AuthContext::new().with("id", "u1"))
        .unwrap();
    assert_eq!(
        filter.sql,
        "(:auth_id <> :param_0 AND :data_status IN (:param_1, :param_2))"
    );
    assert_eq!(filter.params.get("data_status"), Some(&Value::Null));
}

#[test]
fn test_time_window_is_in_process_only() {
    let set = SchemaParser::parse_multiple(&[COLLECTIONS]).unwrap();
    let reports = set.get("reports").unwrap();

    let morning = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(10, 30, 0))
        .unwrap();
    let night = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(23, 0, 0))
        .unwrap();

    let ctx = Context::new();
    let access = CollectionAccess::new(reports).with_clock(morning);
    assert!(access.authorize(Operation::List, &ctx).unwrap().allowed);

    let access = CollectionAccess::new(reports).with_clock(night);
    assert!(!access.authorize(Operation::List, &ctx).unwrap().allowed);

    let err = access.filter(Operation::List, &AuthContext::new()).unwrap_err();
    assert!(matches!(err, Error::Evaluation { .. }));
}
