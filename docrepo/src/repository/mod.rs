//! Repositories and the registry that hands them out.
//!
//! A [DocumentRepository] binds one collection to a driver. Applications
//! usually obtain repositories by name through the [RepositoryRegistry] of a
//! [crate::connection::Connection]:
//!
//! ```rust
//! use docrepo::connection::Connection;
//! use docrepo::driver::InMemoryDriver;
//! use docrepo::repository::StaticAliasResolver;
//! use std::sync::Arc;
//!
//! let connection = Connection::builder()
//!     .driver(InMemoryDriver::with_auto_create())
//!     .alias_resolver(StaticAliasResolver::new().with_alias("App", "app"))
//!     .register_collection("app.repository.User", "users")
//!     .open()?;
//!
//! let users = connection.repository("App:User")?;
//! assert_eq!(users.collection_name(), "users");
//! assert!(Arc::ptr_eq(&users, &connection.repository("app.repository.User")?));
//! # Ok::<(), docrepo::errors::DocRepoError>(())
//! ```
//!
//! Repository types are wired explicitly through a [RepositoryTable], either
//! with a factory closure, a bare collection name or a [RepositoryType]. A
//! [TypedRepository] binds a repository to a serde document type, and a
//! [TypedRepositoryType] names that type next to the repository's own.

mod alias_resolver;
mod document_repository;
mod repository_factory;
mod repository_registry;
mod typed_repository;

pub use alias_resolver::*;
pub use document_repository::*;
pub use repository_factory::*;
pub use repository_registry::*;
pub use typed_repository::*;
