//! # docrepo
//!
//! Repository-pattern facade and connection manager over document database
//! drivers.
//!
//! The crate is organized in layers, leaves first:
//!
//! - [driver] - the [driver::DocumentDriverProvider] contract a database
//!   driver implements, plus [driver::InMemoryDriver]
//! - [document] - [document::Document], an id, a revision and ordered fields
//! - [repository] - [repository::DocumentRepository], one collection bound to
//!   a driver, and [repository::RepositoryRegistry], which resolves names and
//!   memoizes repositories
//! - [connection] - [connection::Connection], which owns the driver and
//!   lazily one registry
//!
//! ## Quick start
//!
//! ```rust
//! use docrepo::connection::Connection;
//! use docrepo::doc;
//! use docrepo::driver::{FetchOptions, InMemoryDriver, RemoveOptions, SaveOptions};
//!
//! let connection = Connection::builder()
//!     .driver(InMemoryDriver::with_auto_create())
//!     .register_collection("app.repository.User", "users")
//!     .open()?;
//!
//! let users = connection.repository("app.repository.User")?;
//!
//! let mut ann = doc! { name: "Ann" };
//! let id = users.save(&mut ann, &SaveOptions::default())?;
//!
//! let fetched = users.get_by_id(&id, &FetchOptions::default())?;
//! assert_eq!(fetched.get("name").and_then(|v| v.as_str()), Some("Ann"));
//!
//! assert!(users.remove_by_id(&id, None, &RemoveOptions::default())?);
//! assert!(!users.has(&id)?);
//! # Ok::<(), docrepo::errors::DocRepoError>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [errors::DocRepoResult]. Driver errors
//! propagate unchanged; see [errors::ErrorKind] for the taxonomy.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade; install any logger to see it.

pub mod common;
pub mod connection;
pub mod connection_builder;
pub mod connection_config;
pub mod document;
pub mod driver;
pub mod errors;
pub mod repository;

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
