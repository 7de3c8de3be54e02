use docrepo::connection::Connection;
use docrepo::doc;
use docrepo::driver::{
    DocumentDriver, FetchOptions, InMemoryDriver, ReplaceOptions, SaveOptions, UpdateOptions,
    WritePolicy,
};
use docrepo::errors::ErrorKind;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test, USER_TYPE};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_default_builder_uses_memory_driver() {
    let connection = Connection::builder()
        .register_collection(USER_TYPE, "users")
        .open()
        .unwrap();

    let users = connection.repository(USER_TYPE).unwrap();
    let mut ann = doc! { name: "Ann" };
    let err = users.save(&mut ann, &SaveOptions::default()).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);

    let id = users.save(&mut ann, &SaveOptions::new().create(true)).unwrap();
    assert!(users.has(&id).unwrap());
}

#[test]
fn test_invalid_configuration() {
    let cases = vec![
        Connection::builder().alias_separator(""),
        Connection::builder().namespace_separator(""),
        Connection::builder().alias_separator("."),
        Connection::builder().repository_namespace("my repos"),
        Connection::builder().register_collection("", "users"),
        Connection::builder().register_collection(USER_TYPE, " "),
    ];

    for builder in cases {
        let err = builder.open().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }
}

#[test]
fn test_default_policy_last() {
    let connection = Connection::builder()
        .driver(InMemoryDriver::with_auto_create())
        .default_policy(WritePolicy::Last)
        .register_collection(USER_TYPE, "users")
        .open()
        .unwrap();

    let users = connection.repository(USER_TYPE).unwrap();
    let mut ann = doc! { name: "Ann" };
    users.save(&mut ann, &SaveOptions::default()).unwrap();

    let mut stale = ann.clone();
    stale.set_revision("stale");
    assert!(users.replace(&mut stale, &ReplaceOptions::default()).unwrap());

    stale.set_revision("stale");
    assert!(users.update(&mut stale, &UpdateOptions::default()).unwrap());

    stale.set_revision("stale");
    let err = users
        .update(&mut stale, &UpdateOptions::new().policy(WritePolicy::Error))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Conflict);
}

#[test]
fn test_policy_parsed_from_text() {
    let policy: WritePolicy = "last".parse().unwrap();
    let connection = Connection::builder().default_policy(policy).open().unwrap();
    assert_eq!(connection.config().write_defaults().policy, WritePolicy::Last);

    let err = "newest".parse::<WritePolicy>().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}

#[test]
fn test_connections_sharing_a_driver() {
    run_test(
        create_test_context,
        |ctx| {
            let other = Connection::builder()
                .driver_handle(ctx.connection().driver().clone())
                .register_collection("other.repository.Person", "users")
                .open()?;

            let mut ann = doc! { name: "Ann" };
            let id = ctx
                .connection()
                .repository(USER_TYPE)?
                .save(&mut ann, &SaveOptions::default())?;

            let person = other
                .repository("other.repository.Person")?
                .get_by_id(&id, &FetchOptions::default())?;
            assert_eq!(person.get("name"), ann.get("name"));
            assert!(!other.same_connection(&ctx.connection()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_registry_outliving_connection() {
    let registry = {
        let connection = Connection::builder()
            .driver_handle(DocumentDriver::new(InMemoryDriver::new()))
            .register_collection(USER_TYPE, "users")
            .open()
            .unwrap();
        connection.registry().clone()
    };

    let err = registry.get(USER_TYPE).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InternalError);
}
