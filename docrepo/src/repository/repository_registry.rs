use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::connection::{Connection, ConnectionInner};
use crate::connection_config::ConnectionConfig;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::repository::{
    AliasResolver, DocumentRepository, RepositoryTable, TypedRepository, TypedRepositoryType,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

/// Resolves repository names and memoizes one repository per name.
///
/// # Name resolution
///
/// A requested name is either a fully qualified type name
/// (`"app.repository.User"`) or an alias-qualified one (`"App:User"`). For the
/// latter the alias is resolved with the connection's [AliasResolver] and the
/// type name is built as `{prefix}{ns}{repository_namespace}{ns}{simple}`,
/// using the separators of the [ConnectionConfig]. Leading namespace
/// separators are ignored. The type name is then looked up in the connection's
/// [RepositoryTable].
///
/// # Memoization
///
/// Repositories are cached under both the requested and the resolved name, so
/// `"App:User"` and `"app.repository.User"` return the same instance. Lookups
/// for the same name always return the identical `Arc` until it is evicted.
/// Construction is single-flight per type name: concurrent callers never build
/// two repositories for one name. A factory may resolve other repositories
/// through the connection it receives; a factory resolving its own type fails
/// with [ErrorKind::ConfigurationError].
#[derive(Clone)]
pub struct RepositoryRegistry {
    inner: Arc<RepositoryRegistryInner>,
}

impl RepositoryRegistry {
    pub(crate) fn new(
        connection: Weak<ConnectionInner>,
        resolver: Arc<dyn AliasResolver>,
        table: RepositoryTable,
        config: ConnectionConfig,
    ) -> Self {
        RepositoryRegistry {
            inner: Arc::new(RepositoryRegistryInner {
                connection,
                resolver,
                table,
                config,
                cache: atomic(HashMap::new()),
                slots: DashMap::new(),
            }),
        }
    }

    /// Returns the repository registered under `name`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if the alias cannot be resolved, the
    /// type name is not registered or its factory fails; the factory error is
    /// kept as cause.
    pub fn get(&self, name: &str) -> DocRepoResult<Arc<DocumentRepository>> {
        self.inner.get(name)
    }

    /// Returns the repository registered under `name`, bound to the document type `T`.
    pub fn get_typed<T>(&self, name: &str) -> DocRepoResult<TypedRepository<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        Ok(TypedRepository::new(self.get(name)?))
    }

    /// Returns the repository of `R`, bound to its document type. `R` must be
    /// registered under [crate::repository::RepositoryType::TYPE_NAME].
    pub fn get_for<R: TypedRepositoryType>(&self) -> DocRepoResult<TypedRepository<R::Document>> {
        self.get_typed(R::TYPE_NAME)
    }

    /// Resolves `name` to the type name it is registered under.
    pub fn resolve(&self, name: &str) -> DocRepoResult<String> {
        self.inner.resolve(name)
    }

    /// Returns `true` if a repository is cached under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.cache.read_with(|cache| cache.contains_key(name))
    }

    /// Cached names, requested and resolved, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.cache.read_with(|cache| cache.keys().cloned().collect());
        names.sort();
        names
    }

    /// Drops the repository cached under `name` together with every other name
    /// pointing to it. Returns `false` if nothing was cached.
    pub fn evict(&self, name: &str) -> bool {
        self.inner.evict(name)
    }

    pub fn clear(&self) {
        self.inner.cache.write_with(|cache| cache.clear());
    }

    /// Type names of the registration table.
    pub fn registered_types(&self) -> Vec<String> {
        self.inner.table.type_names()
    }
}

struct RepositoryRegistryInner {
    connection: Weak<ConnectionInner>,
    resolver: Arc<dyn AliasResolver>,
    table: RepositoryTable,
    config: ConnectionConfig,
    cache: Atomic<HashMap<String, Arc<DocumentRepository>>>,
    slots: DashMap<String, Arc<BuildSlot>>,
}

/// Serializes the construction of one type name.
#[derive(Default)]
struct BuildSlot {
    lock: Mutex<()>,
    builder: Mutex<Option<ThreadId>>,
}

struct Building<'a>(&'a BuildSlot);

impl Drop for Building<'_> {
    fn drop(&mut self) {
        *self.0.builder.lock() = None;
    }
}

impl RepositoryRegistryInner {
    fn get(&self, name: &str) -> DocRepoResult<Arc<DocumentRepository>> {
        if let Some(repository) = self.cached(name) {
            return Ok(repository);
        }

        let type_name = self.resolve(name)?;
        let factory = self.table.get(&type_name).ok_or_else(|| {
            log::error!("No repository registered for type {} (requested as {})", type_name, name);
            DocRepoError::new(
                &format!("No repository registered for type '{}'", type_name),
                ErrorKind::ConfigurationError,
            )
        })?;

        let slot = self.slots.entry(type_name.clone()).or_default().clone();
        let current = thread::current().id();
        if *slot.builder.lock() == Some(current) {
            log::error!("Repository {} depends on itself", type_name);
            return Err(DocRepoError::new(
                &format!("Repository '{}' depends on itself", type_name),
                ErrorKind::ConfigurationError,
            ));
        }

        // only this type name is held while its factory runs
        let _guard = slot.lock.lock();
        if let Some(repository) = self.cached(&type_name) {
            log::debug!("Repository {} resolved to cached {}", name, type_name);
            self.cache
                .write_with(|cache| cache.insert(name.to_string(), repository.clone()));
            return Ok(repository);
        }

        let connection = self.connection()?;
        log::debug!("Constructing repository {} for {}", type_name, name);
        let repository = {
            *slot.builder.lock() = Some(current);
            let _building = Building(&slot);
            factory(&connection).map_err(|err| {
                log::error!("Failed to construct repository {}: {}", type_name, err);
                DocRepoError::new_with_cause(
                    &format!("Failed to construct repository '{}'", type_name),
                    ErrorKind::ConfigurationError,
                    err,
                )
            })?
        };

        let repository = Arc::new(repository);
        self.cache.write_with(|cache| {
            cache.insert(type_name, repository.clone());
            cache.insert(name.to_string(), repository.clone());
        });
        Ok(repository)
    }

    fn resolve(&self, name: &str) -> DocRepoResult<String> {
        let namespace_separator = self.config.namespace_separator();
        let trimmed = name.trim_start_matches(namespace_separator);
        if trimmed.trim().is_empty() {
            log::error!("Repository name cannot be empty");
            return Err(DocRepoError::new(
                "Repository name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        let (alias, simple) = match trimmed.split_once(self.config.alias_separator()) {
            Some(parts) => parts,
            None => return Ok(trimmed.to_string()),
        };

        if alias.is_empty() || simple.is_empty() {
            log::error!("Malformed alias-qualified repository name {}", name);
            return Err(DocRepoError::new(
                &format!("Malformed alias-qualified repository name '{}'", name),
                ErrorKind::ConfigurationError,
            ));
        }

        let prefix = self.resolver.resolve(alias).map_err(|err| {
            DocRepoError::new_with_cause(
                &format!("Cannot resolve alias '{}' of repository '{}'", alias, name),
                ErrorKind::ConfigurationError,
                err,
            )
        })?;

        let mut type_name = prefix
            .trim_start_matches(namespace_separator)
            .trim_end_matches(namespace_separator)
            .to_string();
        for segment in [self.config.repository_namespace(), simple] {
            if segment.is_empty() {
                continue;
            }
            if !type_name.is_empty() {
                type_name.push_str(namespace_separator);
            }
            type_name.push_str(segment);
        }
        Ok(type_name)
    }

    fn evict(&self, name: &str) -> bool {
        self.cache.write_with(|cache| match cache.remove(name) {
            Some(evicted) => {
                cache.retain(|_, repository| !Arc::ptr_eq(repository, &evicted));
                true
            }
            None => false,
        })
    }

    fn cached(&self, name: &str) -> Option<Arc<DocumentRepository>> {
        self.cache.read_with(|cache| cache.get(name).cloned())
    }

    fn connection(&self) -> DocRepoResult<Connection> {
        match self.connection.upgrade() {
            Some(inner) => Ok(Connection::from_inner(inner)),
            None => {
                log::error!("Repository registry outlived its connection");
                Err(DocRepoError::new(
                    "Connection is closed",
                    ErrorKind::InternalError,
                ))
            }
        }
    }
}
