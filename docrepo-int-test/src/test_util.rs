use docrepo::connection::Connection;
use docrepo::driver::InMemoryDriver;
use docrepo::errors::DocRepoResult;
use docrepo::repository::{RepositoryType, StaticAliasResolver};
use std::backtrace::Backtrace;
use std::time::Instant;

pub const USER_TYPE: &str = "app.repository.User";
pub const USER_COLLECTION: &str = "users";

/// Repository of orders, wired through [RepositoryType].
pub struct OrderRepository;

impl RepositoryType for OrderRepository {
    const TYPE_NAME: &'static str = "shop.repository.Order";
    const COLLECTION: &'static str = "orders";
}

/// Runs `test` between `before` and `after`.
///
/// `after` runs even when the test fails; failures and panics are reported
/// with a backtrace and fail the calling test.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocRepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> DocRepoResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> DocRepoResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => after(ctx)
                    .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();
    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed: {}", error);
}

#[derive(Clone)]
pub struct TestContext {
    driver: InMemoryDriver,
    connection: Connection,
}

impl TestContext {
    pub fn new(driver: InMemoryDriver, connection: Connection) -> Self {
        Self { driver, connection }
    }

    /// The in-memory driver behind the connection.
    pub fn driver(&self) -> InMemoryDriver {
        self.driver.clone()
    }

    pub fn connection(&self) -> Connection {
        self.connection.clone()
    }
}

/// Random collection name, unique per call.
pub fn random_collection() -> String {
    format!("c_{}", uuid::Uuid::new_v4().simple())
}

/// Connection over a fresh [InMemoryDriver] with the `users` collection,
/// the `App` and `Shop` aliases and the test repository types registered.
pub fn create_test_context() -> DocRepoResult<TestContext> {
    let driver = InMemoryDriver::new();
    driver.create_collection(USER_COLLECTION)?;
    driver.create_collection(OrderRepository::COLLECTION)?;

    let connection = Connection::builder()
        .driver(driver.clone())
        .alias_resolver(
            StaticAliasResolver::new()
                .with_alias("App", "app")
                .with_alias("Shop", "shop"),
        )
        .register_collection(USER_TYPE, USER_COLLECTION)
        .register_type::<OrderRepository>()
        .open()?;

    Ok(TestContext::new(driver, connection))
}

/// Drops every collection and every cached repository of `ctx`.
pub fn cleanup(ctx: TestContext) -> DocRepoResult<()> {
    if ctx.connection.has_registry() {
        ctx.connection.registry().clear();
    }
    for name in ctx.driver.collection_names() {
        ctx.driver.drop_collection(&name);
    }
    Ok(())
}
