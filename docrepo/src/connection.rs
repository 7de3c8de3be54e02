use crate::connection_builder::ConnectionBuilder;
use crate::connection_config::ConnectionConfig;
use crate::driver::DocumentDriver;
use crate::errors::DocRepoResult;
use crate::repository::{
    AliasResolver, DocumentRepository, RepositoryRegistry, RepositoryTable, TypedRepository,
    TypedRepositoryType,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

/// An open connection: a driver handle, its configuration and, once first
/// needed, the [RepositoryRegistry].
///
/// `Connection` is a cheap handle; clones share the same driver and the same
/// registry. The registry refers back to the connection weakly, so dropping
/// the last `Connection` releases everything.
///
/// # Examples
///
/// ```rust
/// use docrepo::connection::Connection;
/// use docrepo::doc;
/// use docrepo::driver::{FetchOptions, InMemoryDriver, SaveOptions};
///
/// let connection = Connection::builder()
///     .driver(InMemoryDriver::with_auto_create())
///     .register_collection("app.repository.User", "users")
///     .open()?;
///
/// let users = connection.repository("app.repository.User")?;
/// let mut ann = doc! { name: "Ann" };
/// let id = users.save(&mut ann, &SaveOptions::default())?;
/// assert!(users.has(&id)?);
/// # Ok::<(), docrepo::errors::DocRepoError>(())
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    pub(crate) fn new(
        driver: DocumentDriver,
        config: ConnectionConfig,
        resolver: Arc<dyn AliasResolver>,
        repositories: RepositoryTable,
    ) -> Self {
        Connection {
            inner: Arc::new(ConnectionInner {
                driver,
                config,
                resolver,
                repositories,
                registry: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ConnectionInner>) -> Self {
        Connection { inner }
    }

    pub fn driver(&self) -> &DocumentDriver {
        &self.inner.driver
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Returns the registry of this connection, creating it on first call.
    pub fn registry(&self) -> &RepositoryRegistry {
        self.inner.registry.get_or_init(|| {
            log::debug!("Creating repository registry");
            RepositoryRegistry::new(
                Arc::downgrade(&self.inner),
                self.inner.resolver.clone(),
                self.inner.repositories.clone(),
                self.inner.config.clone(),
            )
        })
    }

    /// Returns `true` once the registry has been created.
    pub fn has_registry(&self) -> bool {
        self.inner.registry.get().is_some()
    }

    /// Shorthand for `registry().get(name)`.
    pub fn repository(&self, name: &str) -> DocRepoResult<Arc<DocumentRepository>> {
        self.registry().get(name)
    }

    /// Shorthand for `registry().get_typed(name)`.
    pub fn typed_repository<T>(&self, name: &str) -> DocRepoResult<TypedRepository<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        self.registry().get_typed(name)
    }

    /// Shorthand for `registry().get_for::<R>()`.
    pub fn repository_for<R: TypedRepositoryType>(&self) -> DocRepoResult<TypedRepository<R::Document>> {
        self.registry().get_for::<R>()
    }

    /// Builds an unregistered repository over `collection`, bypassing the registry.
    pub fn collection(&self, collection: &str) -> DocRepoResult<DocumentRepository> {
        DocumentRepository::for_connection(self, collection)
    }

    /// Returns `true` if both handles refer to the same connection.
    pub fn same_connection(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.inner.config)
            .field("repositories", &self.inner.repositories)
            .field("has_registry", &self.has_registry())
            .finish()
    }
}

pub(crate) struct ConnectionInner {
    driver: DocumentDriver,
    config: ConnectionConfig,
    resolver: Arc<dyn AliasResolver>,
    repositories: RepositoryTable,
    registry: OnceLock<RepositoryRegistry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::driver::{InMemoryDriver, ReplaceOptions, SaveOptions, WritePolicy};
    use crate::errors::ErrorKind;

    #[test]
    fn registry_is_created_lazily_once() {
        let connection = Connection::builder().open().unwrap();
        assert!(!connection.has_registry());

        let first = connection.registry() as *const RepositoryRegistry;
        assert!(connection.has_registry());
        let second = connection.registry() as *const RepositoryRegistry;
        assert_eq!(first, second);
    }

    #[test]
    fn clones_share_the_registry() {
        let connection = Connection::builder()
            .register_collection("app.repository.User", "users")
            .open()
            .unwrap();
        let clone = connection.clone();
        assert!(connection.same_connection(&clone));

        let a = connection.repository("app.repository.User").unwrap();
        let b = clone.repository("app.repository.User").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn repositories_share_the_connection_driver() {
        let connection = Connection::builder()
            .driver(InMemoryDriver::with_auto_create())
            .register_collection("app.repository.User", "users")
            .open()
            .unwrap();

        let users = connection.repository("app.repository.User").unwrap();
        assert!(users.driver().same_driver(connection.driver()));
    }

    #[test]
    fn collection_applies_connection_defaults() {
        let connection = Connection::builder()
            .driver(InMemoryDriver::with_auto_create())
            .default_policy(WritePolicy::Last)
            .open()
            .unwrap();

        let users = connection.collection("users").unwrap();
        assert_eq!(users.write_defaults().policy, WritePolicy::Last);

        let mut ann = doc! { name: "Ann" };
        users.save(&mut ann, &SaveOptions::default()).unwrap();
        ann.set_revision("stale");
        assert!(users.replace(&mut ann, &ReplaceOptions::default()).unwrap());

        let err = connection.collection("").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    }

    #[test]
    fn registry_fails_once_the_connection_is_gone() {
        let connection = Connection::builder()
            .register_collection("app.repository.User", "users")
            .open()
            .unwrap();
        let registry = connection.registry().clone();
        drop(connection);

        let err = registry.get("app.repository.User").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InternalError);
    }

    #[test]
    fn debug_shows_config() {
        let connection = Connection::builder().open().unwrap();
        let debug = format!("{:?}", connection);
        assert!(debug.contains("ConnectionConfig"));
        assert!(debug.contains("has_registry: false"));
    }
}
