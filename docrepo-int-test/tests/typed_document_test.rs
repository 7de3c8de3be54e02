use docrepo::common::Value;
use docrepo::document::{Document, DocumentOptions};
use docrepo::driver::{FetchOptions, ReplaceOptions, SaveOptions, UpdateOptions};
use docrepo::errors::{DocRepoResult, ErrorKind};
use docrepo::repository::{RepositoryType, TypedRepositoryType};
use docrepo_int_test::test_util::{
    cleanup, create_test_context, run_test, USER_COLLECTION, USER_TYPE,
};
use std::sync::Arc;
use serde::{Deserialize, Serialize};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    age: u32,
    tags: Vec<String>,
    address: Option<Address>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Address {
    city: String,
    zip: String,
}

struct UserRepository;

impl RepositoryType for UserRepository {
    const TYPE_NAME: &'static str = USER_TYPE;
    const COLLECTION: &'static str = USER_COLLECTION;
}

impl TypedRepositoryType for UserRepository {
    type Document = User;
}

fn ann() -> User {
    User {
        id: None,
        name: "Ann".to_string(),
        age: 30,
        tags: vec!["admin".to_string()],
        address: Some(Address {
            city: "Oslo".to_string(),
            zip: "0150".to_string(),
        }),
    }
}

#[test]
fn test_typed_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.connection().repository(USER_TYPE)?;

            let mut document = Document::from_serializable(&ann())?;
            assert!(document.is_new());
            let id = users.save(&mut document, &SaveOptions::default())?;

            let fetched: User = users
                .get_by_id(&id, &FetchOptions::default())?
                .deserialize_into()?;
            assert_eq!(fetched.id.as_deref(), Some(id.as_str()));
            assert_eq!(User { id: None, ..fetched }, ann());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_typed_update() {
    run_test(
        create_test_context,
        |ctx| -> DocRepoResult<()> {
            let users = ctx.connection().repository(USER_TYPE)?;
            let mut document = Document::from_serializable(&ann())?;
            let id = users.save(&mut document, &SaveOptions::default())?;

            let mut patch = Document::new();
            patch.put("age", 31)?;
            patch.put("address", Value::Null)?;
            users.update_by_id(&id, &mut patch, &UpdateOptions::default())?;

            let user: User = users
                .get_by_id(&id, &FetchOptions::default())?
                .deserialize_into()?;
            assert_eq!(user.age, 31);
            assert_eq!(user.address, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_repository_bound_to_document_type() {
    run_test(
        create_test_context,
        |ctx| {
            let connection = ctx.connection();
            let users = connection.repository_for::<UserRepository>()?;
            assert_eq!(users.collection_name(), USER_COLLECTION);

            let saved = users.save(&ann(), &SaveOptions::default())?;
            let id = saved.id.clone().expect("saved user has an id");

            let by_alias = connection.typed_repository::<User>("App:User")?;
            assert!(Arc::ptr_eq(by_alias.repository(), users.repository()));
            assert_eq!(by_alias.get_by_id(&id, &FetchOptions::default())?, saved);

            let mut birthday = saved.clone();
            birthday.age = 31;
            let updated = users.update(&birthday, &UpdateOptions::default())?;
            assert_eq!(updated.age, 31);

            let fetched = users.get_by_id(&id, &FetchOptions::default())?;
            assert_eq!(fetched.age, 31);
            assert_eq!(fetched.tags, vec!["admin".to_string()]);

            let replaced = users.replace_by_id(&id, &ann(), &ReplaceOptions::default())?;
            assert_eq!(replaced.id.as_deref(), Some(id.as_str()));
            assert_eq!(users.get_by_id(&id, &FetchOptions::default())?.age, 30);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_typed_fetch_of_foreign_shape_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let connection = ctx.connection();
            let mut raw = Document::new();
            raw.put("name", "Ann")?;
            raw.put("age", "thirty")?;
            let id = connection
                .repository(USER_TYPE)?
                .save(&mut raw, &SaveOptions::default())?;

            let users = connection.repository_for::<UserRepository>()?;
            let err = users.get_by_id(&id, &FetchOptions::default()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            assert!(users.has(&id)?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_serializable_with_id() {
    let mut user = ann();
    user.id = Some("u1".to_string());
    let document = Document::from_serializable(&user).unwrap();
    assert_eq!(document.id(), Some("u1"));
    assert!(!document.contains_key("_id"));
}

#[test]
fn test_non_map_serializable_is_rejected() {
    let err = Document::from_serializable(&vec![1, 2, 3]).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}

#[test]
fn test_deserialize_mismatch_is_invalid_argument() {
    let mut document = Document::new();
    document.put("name", 42).unwrap();
    let err = document.deserialize_into::<User>().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}

#[test]
fn test_create_from_json_options() {
    let json = r#"{"_id": "u1", "_rev": "r1", "_key": "k", "name": "Ann"}"#;

    let full = Document::create_from_json(json, &DocumentOptions::default()).unwrap();
    assert_eq!(full.id(), Some("u1"));
    assert_eq!(full.revision(), Some("r1"));
    assert!(full.contains_key("_key"));

    let options = DocumentOptions::default()
        .include_internals(false)
        .ignore_hidden_attributes(true);
    let plain = Document::create_from_json(json, &options).unwrap();
    assert_eq!(plain.id(), None);
    assert_eq!(plain.len(), 1);

    let err = Document::create_from_json("[1]", &options).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    let err = Document::create_from_json("{", &options).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}
