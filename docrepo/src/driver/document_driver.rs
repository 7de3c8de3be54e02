use crate::document::Document;
use crate::driver::{FetchOptions, RemoveOptions, ReplaceOptions, SaveOptions, UpdateOptions};
use crate::errors::DocRepoResult;
use std::ops::Deref;
use std::sync::Arc;

/// Identity of a document after a successful write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: String,
    pub revision: String,
}

impl DocumentMeta {
    pub fn new(id: impl Into<String>, revision: impl Into<String>) -> Self {
        DocumentMeta {
            id: id.into(),
            revision: revision.into(),
        }
    }
}

/// Outcome of a head probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadStatus {
    /// The document exists and satisfies the revision precondition.
    Ok,
    /// The document exists and its revision equals the one given with `if_match = false`.
    NotModified,
}

impl HeadStatus {
    /// Status code of the equivalent HTTP response.
    pub fn code(&self) -> u16 {
        match self {
            HeadStatus::Ok => 200,
            HeadStatus::NotModified => 304,
        }
    }
}

/// Metadata returned by a head probe, without the document body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentHead {
    pub status: HeadStatus,
    pub id: String,
    pub revision: String,
}

/// Primitive operations a document database driver supplies.
///
/// Every operation targets one named collection. Failures are reported with
/// the [crate::errors::ErrorKind] taxonomy:
///
/// * `NotFound` - the document or the collection does not exist
/// * `Conflict` - stale revision under [crate::driver::WritePolicy::Error],
///   failed revision precondition, or duplicate id on insert
/// * `IOError` - transport failure
/// * `InvalidArgument` - malformed id or payload
///
/// Implementations must be `Send + Sync`; the same driver is shared by every
/// repository of a connection.
pub trait DocumentDriverProvider: Send + Sync {
    /// Fetches the document `id` of `collection`.
    fn fetch(&self, collection: &str, id: &str, options: &FetchOptions) -> DocRepoResult<Document>;

    /// Probes the document `id` without fetching its body.
    ///
    /// With a revision and `if_match` unset, the revision must match.
    fn fetch_head(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        if_match: Option<bool>,
    ) -> DocRepoResult<DocumentHead>;

    /// Inserts `document`, generating an id if it has none.
    fn insert(
        &self,
        collection: &str,
        document: &Document,
        options: &SaveOptions,
    ) -> DocRepoResult<DocumentMeta>;

    /// Replaces the document `id` with the fields of `document`.
    ///
    /// The revision carried by `document`, if any, is checked according to the
    /// policy of `options`.
    fn replace(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &ReplaceOptions,
    ) -> DocRepoResult<DocumentMeta>;

    /// Merges the fields of `document` into the document `id`.
    fn update(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<DocumentMeta>;

    /// Deletes the document `id`, checking `revision` according to the policy of `options`.
    fn delete(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        options: &RemoveOptions,
    ) -> DocRepoResult<bool>;
}

/// Shareable handle to a [DocumentDriverProvider].
///
/// Cloning is cheap, every clone refers to the same driver.
#[derive(Clone)]
pub struct DocumentDriver {
    inner: Arc<dyn DocumentDriverProvider>,
}

impl DocumentDriver {
    pub fn new<T: DocumentDriverProvider + 'static>(inner: T) -> Self {
        DocumentDriver {
            inner: Arc::new(inner),
        }
    }

    /// Wraps a driver that is already shared elsewhere.
    pub fn from_arc(inner: Arc<dyn DocumentDriverProvider>) -> Self {
        DocumentDriver { inner }
    }

    /// Returns `true` if both handles refer to the same driver.
    pub fn same_driver(&self, other: &DocumentDriver) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for DocumentDriver {
    type Target = Arc<dyn DocumentDriverProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
