use crate::connection::Connection;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::repository::DocumentRepository;
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Constructs the repository registered under a type name.
pub type RepositoryFactory =
    Arc<dyn Fn(&Connection) -> DocRepoResult<DocumentRepository> + Send + Sync>;

/// A repository known at compile time by its type name and collection.
///
/// ```rust
/// use docrepo::repository::RepositoryType;
///
/// struct UserRepository;
///
/// impl RepositoryType for UserRepository {
///     const TYPE_NAME: &'static str = "app.repository.User";
///     const COLLECTION: &'static str = "users";
/// }
/// ```
pub trait RepositoryType {
    /// Fully qualified name the repository is registered under.
    const TYPE_NAME: &'static str;
    /// Collection the repository is bound to.
    const COLLECTION: &'static str;

    /// Builds the repository for `connection`.
    fn create(connection: &Connection) -> DocRepoResult<DocumentRepository> {
        DocumentRepository::for_connection(connection, Self::COLLECTION)
    }
}

/// Registration table mapping repository type names to factories.
///
/// Type names are stored verbatim; they are expected fully qualified and
/// without leading namespace separators.
#[derive(Clone, Default)]
pub struct RepositoryTable {
    factories: IndexMap<String, RepositoryFactory>,
}

impl RepositoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `type_name`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if `type_name` is empty or already registered.
    pub fn register<F>(&mut self, type_name: &str, factory: F) -> DocRepoResult<()>
    where
        F: Fn(&Connection) -> DocRepoResult<DocumentRepository> + Send + Sync + 'static,
    {
        let type_name = type_name.trim();
        if type_name.is_empty() {
            log::error!("Repository type name cannot be empty");
            return Err(DocRepoError::new(
                "Repository type name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        if self.factories.contains_key(type_name) {
            log::error!("Repository type {} is already registered", type_name);
            return Err(DocRepoError::new(
                &format!("Repository type '{}' is already registered", type_name),
                ErrorKind::ConfigurationError,
            ));
        }

        self.factories.insert(type_name.to_string(), Arc::new(factory));
        Ok(())
    }

    /// Registers a plain repository over `collection` under `type_name`.
    pub fn register_collection(&mut self, type_name: &str, collection: &str) -> DocRepoResult<()> {
        if collection.trim().is_empty() {
            log::error!("Repository type {} has an empty collection name", type_name);
            return Err(DocRepoError::new(
                &format!("Repository type '{}' has an empty collection name", type_name),
                ErrorKind::ConfigurationError,
            ));
        }

        let collection = collection.to_string();
        self.register(type_name, move |connection| {
            DocumentRepository::for_connection(connection, &collection)
        })
    }

    pub fn register_type<T: RepositoryType + 'static>(&mut self) -> DocRepoResult<()> {
        self.register(T::TYPE_NAME, T::create)
    }

    pub fn get(&self, type_name: &str) -> Option<RepositoryFactory> {
        self.factories.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names in registration order.
    pub fn type_names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Debug for RepositoryTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryTable")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UserRepository;

    impl RepositoryType for UserRepository {
        const TYPE_NAME: &'static str = "app.repository.User";
        const COLLECTION: &'static str = "users";
    }

    #[test]
    fn register_keeps_order() {
        let mut table = RepositoryTable::new();
        table.register_collection("app.repository.B", "b").unwrap();
        table.register_collection("app.repository.A", "a").unwrap();
        table.register_type::<UserRepository>().unwrap();

        assert_eq!(
            table.type_names(),
            vec!["app.repository.B", "app.repository.A", "app.repository.User"]
        );
        assert!(table.contains("app.repository.User"));
        assert!(table.get("app.repository.C").is_none());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn register_rejects_duplicates_and_empty_names() {
        let mut table = RepositoryTable::new();
        table.register_collection("app.repository.A", "a").unwrap();

        let err = table.register_collection("app.repository.A", "other").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

        let err = table.register_collection(" ", "a").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

        let err = table.register_collection("app.repository.B", "").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn factories_build_repositories() {
        let connection = Connection::builder().open().unwrap();
        let mut table = RepositoryTable::new();
        table.register_type::<UserRepository>().unwrap();

        let factory = table.get(UserRepository::TYPE_NAME).unwrap();
        let repository = factory(&connection).unwrap();
        assert_eq!(repository.collection_name(), "users");
    }

    #[test]
    fn debug_lists_type_names() {
        let mut table = RepositoryTable::new();
        table.register_collection("app.repository.A", "a").unwrap();
        assert!(format!("{:?}", table).contains("app.repository.A"));
    }
}
