use crate::connection::Connection;
use crate::connection_config::ConnectionConfig;
use crate::driver::{DocumentDriver, DocumentDriverProvider, InMemoryDriver, WritePolicy};
use crate::errors::{DocRepoError, DocRepoResult};
use crate::repository::{
    AliasResolver, DocumentRepository, NoAliasResolver, RepositoryTable, RepositoryType,
};
use std::sync::Arc;

/// Builder of a [Connection].
///
/// Configuration errors are captured while chaining and returned by
/// [ConnectionBuilder::open]; after the first error the remaining calls are
/// ignored.
///
/// # Examples
///
/// ```rust
/// use docrepo::connection::Connection;
/// use docrepo::driver::{InMemoryDriver, WritePolicy};
///
/// let connection = Connection::builder()
///     .driver(InMemoryDriver::with_auto_create())
///     .default_policy(WritePolicy::Last)
///     .register_collection("app.repository.User", "users")
///     .open()?;
/// assert_eq!(connection.config().default_policy(), WritePolicy::Last);
///
/// let err = Connection::builder().alias_separator("").open().unwrap_err();
/// assert_eq!(err.kind(), &docrepo::errors::ErrorKind::ConfigurationError);
/// # Ok::<(), docrepo::errors::DocRepoError>(())
/// ```
#[derive(Default)]
pub struct ConnectionBuilder {
    error: Option<DocRepoError>,
    config: ConnectionConfig,
    driver: Option<DocumentDriver>,
    resolver: Option<Arc<dyn AliasResolver>>,
    repositories: RepositoryTable,
}

impl ConnectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `driver` for every repository of the connection.
    pub fn driver<T: DocumentDriverProvider + 'static>(mut self, driver: T) -> Self {
        self.driver = Some(DocumentDriver::new(driver));
        self
    }

    /// Uses a driver handle shared with other connections.
    pub fn driver_handle(mut self, driver: DocumentDriver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Resolver for alias-qualified repository names. Without one, every
    /// alias is unknown.
    pub fn alias_resolver<R: AliasResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Registers `factory` under the fully qualified `type_name`.
    pub fn register_repository<F>(mut self, type_name: &str, factory: F) -> Self
    where
        F: Fn(&Connection) -> DocRepoResult<DocumentRepository> + Send + Sync + 'static,
    {
        if self.error.is_none() {
            if let Err(e) = self.repositories.register(type_name, factory) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Registers a plain repository over `collection` under `type_name`.
    pub fn register_collection(mut self, type_name: &str, collection: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.repositories.register_collection(type_name, collection) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn register_type<T: RepositoryType + 'static>(mut self) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.repositories.register_type::<T>() {
                self.error = Some(e);
            }
        }
        self
    }

    /// Policy of write operations that do not set one.
    pub fn default_policy(mut self, policy: WritePolicy) -> Self {
        self.config.set_default_policy(policy);
        self
    }

    /// `wait_for_sync` of write operations that do not set it.
    pub fn wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.config.set_wait_for_sync(wait_for_sync);
        self
    }

    pub fn alias_separator(mut self, separator: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_alias_separator(separator) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn namespace_separator(mut self, separator: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_namespace_separator(separator) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn repository_namespace(mut self, namespace: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_repository_namespace(namespace) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the connection.
    ///
    /// Without an explicit driver an empty [InMemoryDriver] is used.
    ///
    /// # Errors
    ///
    /// The first configuration error captured while chaining, or the
    /// [ConnectionConfig::validate] failure.
    pub fn open(self) -> DocRepoResult<Connection> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.config.validate()?;

        let driver = self.driver.unwrap_or_else(|| {
            log::debug!("No driver configured, using an in-memory driver");
            DocumentDriver::new(InMemoryDriver::new())
        });
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(NoAliasResolver) as Arc<dyn AliasResolver>);

        log::debug!(
            "Opening connection with {} registered repository types",
            self.repositories.len()
        );
        Ok(Connection::new(driver, self.config, resolver, self.repositories))
    }
}
