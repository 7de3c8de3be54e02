use crate::common::{Fields, Value, DOC_ID, DOC_REVISION, MAX_ID_LENGTH};
use crate::document::Document;
use crate::driver::{
    DocumentDriverProvider, DocumentHead, DocumentMeta, FetchOptions, HeadStatus, RemoveOptions,
    ReplaceOptions, SaveOptions, UpdateOptions, WritePolicy,
};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory document driver.
///
/// # Purpose
/// `InMemoryDriver` implements the whole [DocumentDriverProvider] contract
/// without a server: revisions, write policies, patch merging and collection
/// auto-creation. It backs connections opened without an explicit driver and
/// the tests of the crate.
///
/// # Characteristics
/// - **Thread-Safe**: collections live in a `DashMap`, clones share state
/// - **Ordered**: documents and fields keep their insertion order
/// - **Revisions**: every successful write assigns a fresh opaque token
/// - **Ids**: missing ids are generated from a per-driver sequence
///
/// # Usage
/// ```rust
/// use docrepo::driver::{DocumentDriverProvider, InMemoryDriver, SaveOptions};
/// use docrepo::doc;
///
/// let driver = InMemoryDriver::new();
/// let meta = driver.insert("users", &doc! { name: "Ann" }, &SaveOptions::new().create(true))?;
/// assert_eq!(driver.count("users")?, 1);
/// # let _ = meta;
/// # Ok::<(), docrepo::errors::DocRepoError>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryDriver {
    inner: Arc<InMemoryDriverInner>,
}

impl InMemoryDriver {
    pub fn new() -> Self {
        InMemoryDriver {
            inner: Arc::new(InMemoryDriverInner::default()),
        }
    }

    /// Creates a driver that creates missing collections on insert.
    pub fn with_auto_create() -> Self {
        let driver = InMemoryDriver::new();
        driver.set_auto_create(true);
        driver
    }

    pub fn set_auto_create(&self, auto_create: bool) {
        self.inner.auto_create.store(auto_create, Ordering::Relaxed);
    }

    pub fn is_auto_create(&self) -> bool {
        self.inner.auto_create.load(Ordering::Relaxed)
    }

    /// Creates `name`, returns `false` if it already exists.
    pub fn create_collection(&self, name: &str) -> DocRepoResult<bool> {
        self.inner.create_collection(name)
    }

    /// Drops `name` with all its documents, returns `false` if it did not exist.
    pub fn drop_collection(&self, name: &str) -> bool {
        self.inner.collections.remove(name).is_some()
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.inner.collections.contains_key(name)
    }

    /// Names of all collections, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> DocRepoResult<usize> {
        self.inner
            .collections
            .get(collection)
            .map(|documents| documents.len())
            .ok_or_else(|| collection_not_found(collection))
    }
}

impl DocumentDriverProvider for InMemoryDriver {
    fn fetch(&self, collection: &str, id: &str, options: &FetchOptions) -> DocRepoResult<Document> {
        self.inner.fetch(collection, id, options)
    }

    fn fetch_head(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        if_match: Option<bool>,
    ) -> DocRepoResult<DocumentHead> {
        self.inner.fetch_head(collection, id, revision, if_match)
    }

    fn insert(
        &self,
        collection: &str,
        document: &Document,
        options: &SaveOptions,
    ) -> DocRepoResult<DocumentMeta> {
        self.inner.insert(collection, document, options)
    }

    fn replace(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &ReplaceOptions,
    ) -> DocRepoResult<DocumentMeta> {
        self.inner.replace(collection, id, document, options)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<DocumentMeta> {
        self.inner.update(collection, id, document, options)
    }

    fn delete(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        options: &RemoveOptions,
    ) -> DocRepoResult<bool> {
        self.inner.delete(collection, id, revision, options)
    }
}

struct StoredDocument {
    revision: String,
    fields: Fields,
}

impl StoredDocument {
    fn new(fields: Fields) -> Self {
        StoredDocument {
            revision: new_revision(),
            fields,
        }
    }

    fn touch(&mut self) -> String {
        self.revision = new_revision();
        self.revision.clone()
    }

    fn to_raw(&self, id: &str) -> Value {
        let mut raw = Fields::with_capacity(self.fields.len() + 2);
        raw.insert(DOC_ID.to_string(), Value::from(id));
        raw.insert(DOC_REVISION.to_string(), Value::from(&self.revision));
        for (key, value) in &self.fields {
            raw.insert(key.clone(), value.clone());
        }
        Value::Map(raw)
    }
}

type Collection = IndexMap<String, StoredDocument>;

#[derive(Default)]
struct InMemoryDriverInner {
    collections: DashMap<String, Collection>,
    auto_create: AtomicBool,
    sequence: AtomicU64,
}

impl InMemoryDriverInner {
    fn create_collection(&self, name: &str) -> DocRepoResult<bool> {
        if name.trim().is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(DocRepoError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }

        let mut created = false;
        self.collections.entry(name.to_string()).or_insert_with(|| {
            created = true;
            Collection::new()
        });
        Ok(created)
    }

    fn fetch(&self, collection: &str, id: &str, options: &FetchOptions) -> DocRepoResult<Document> {
        validate_id(id)?;
        let documents = self
            .collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let stored = documents
            .get(id)
            .ok_or_else(|| document_not_found(collection, id))?;

        if let Some(revision) = options.get_revision() {
            let if_match = options.get_if_match().unwrap_or(true);
            if if_match != (stored.revision == revision) {
                log::error!(
                    "Revision precondition failed for {}/{}: given {}, stored {}",
                    collection, id, revision, stored.revision
                );
                return Err(DocRepoError::new(
                    &format!("Revision precondition failed for document '{}/{}'", collection, id),
                    ErrorKind::Conflict,
                ));
            }
        }

        log::trace!("Fetched document {}/{}", collection, id);
        Document::create_from_fields(stored.to_raw(id), options.document_options())
    }

    fn fetch_head(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        if_match: Option<bool>,
    ) -> DocRepoResult<DocumentHead> {
        validate_id(id)?;
        let documents = self
            .collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let stored = documents
            .get(id)
            .ok_or_else(|| document_not_found(collection, id))?;

        let mut status = HeadStatus::Ok;
        if let Some(revision) = revision {
            let matches = stored.revision == revision;
            match if_match.unwrap_or(true) {
                true if !matches => {
                    log::error!(
                        "Revision precondition failed for {}/{}: given {}, stored {}",
                        collection, id, revision, stored.revision
                    );
                    return Err(DocRepoError::new(
                        &format!("Revision precondition failed for document '{}/{}'", collection, id),
                        ErrorKind::Conflict,
                    ));
                }
                false if matches => status = HeadStatus::NotModified,
                _ => {}
            }
        }

        Ok(DocumentHead {
            status,
            id: id.to_string(),
            revision: stored.revision.clone(),
        })
    }

    fn insert(
        &self,
        collection: &str,
        document: &Document,
        options: &SaveOptions,
    ) -> DocRepoResult<DocumentMeta> {
        if let Some(id) = document.id() {
            validate_id(id)?;
        }

        let create = options.is_create() || self.auto_create.load(Ordering::Relaxed);
        if create {
            self.create_collection(collection)?;
        }

        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        let id = match document.id() {
            Some(id) => {
                if documents.contains_key(id) {
                    log::error!("Unique constraint violated for {}/{}", collection, id);
                    return Err(DocRepoError::new(
                        &format!("Document '{}/{}' already exists", collection, id),
                        ErrorKind::Conflict,
                    ));
                }
                id.to_string()
            }
            None => self.next_id(&documents),
        };

        let stored = StoredDocument::new(document.fields().clone());
        let revision = stored.revision.clone();
        documents.insert(id.clone(), stored);

        log::trace!(
            "Inserted document {}/{} (wait_for_sync: {:?})",
            collection, id, options.get_wait_for_sync()
        );
        Ok(DocumentMeta::new(id, revision))
    }

    fn replace(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &ReplaceOptions,
    ) -> DocRepoResult<DocumentMeta> {
        validate_id(id)?;
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| document_not_found(collection, id))?;

        check_revision(
            collection,
            id,
            &stored.revision,
            document.revision(),
            options.get_policy().unwrap_or_default(),
        )?;

        stored.fields = document.fields().clone();
        let revision = stored.touch();

        log::trace!(
            "Replaced document {}/{} (wait_for_sync: {:?})",
            collection, id, options.get_wait_for_sync()
        );
        Ok(DocumentMeta::new(id, revision))
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        document: &Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<DocumentMeta> {
        validate_id(id)?;
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let stored = documents
            .get_mut(id)
            .ok_or_else(|| document_not_found(collection, id))?;

        check_revision(
            collection,
            id,
            &stored.revision,
            document.revision(),
            options.get_policy().unwrap_or_default(),
        )?;

        merge_fields(&mut stored.fields, document.fields(), options.is_keep_null());
        let revision = stored.touch();

        log::trace!(
            "Updated document {}/{} (keep_null: {}, wait_for_sync: {:?})",
            collection, id, options.is_keep_null(), options.get_wait_for_sync()
        );
        Ok(DocumentMeta::new(id, revision))
    }

    fn delete(
        &self,
        collection: &str,
        id: &str,
        revision: Option<&str>,
        options: &RemoveOptions,
    ) -> DocRepoResult<bool> {
        validate_id(id)?;
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;
        let stored = documents
            .get(id)
            .ok_or_else(|| document_not_found(collection, id))?;

        check_revision(
            collection,
            id,
            &stored.revision,
            revision,
            options.get_policy().unwrap_or_default(),
        )?;

        documents.shift_remove(id);
        log::trace!(
            "Removed document {}/{} (wait_for_sync: {:?})",
            collection, id, options.get_wait_for_sync()
        );
        Ok(true)
    }

    fn next_id(&self, documents: &Collection) -> String {
        loop {
            let id = (self.sequence.fetch_add(1, Ordering::Relaxed) + 1).to_string();
            if !documents.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Merges `patch` into `target`; nested maps merge recursively.
fn merge_fields(target: &mut Fields, patch: &Fields, keep_null: bool) {
    for (key, value) in patch {
        match value {
            Value::Null if !keep_null => {
                target.shift_remove(key);
            }
            Value::Map(nested) => match target.get_mut(key) {
                Some(Value::Map(existing)) => merge_fields(existing, nested, keep_null),
                _ => {
                    let mut fresh = Fields::with_capacity(nested.len());
                    merge_fields(&mut fresh, nested, keep_null);
                    target.insert(key.clone(), Value::Map(fresh));
                }
            },
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

fn check_revision(
    collection: &str,
    id: &str,
    stored: &str,
    given: Option<&str>,
    policy: WritePolicy,
) -> DocRepoResult<()> {
    match (policy, given) {
        (WritePolicy::Error, Some(given)) if given != stored => {
            log::error!(
                "Revision conflict on {}/{}: given {}, stored {}",
                collection, id, given, stored
            );
            Err(DocRepoError::new(
                &format!("Revision conflict on document '{}/{}'", collection, id),
                ErrorKind::Conflict,
            ))
        }
        _ => Ok(()),
    }
}

fn validate_id(id: &str) -> DocRepoResult<()> {
    let reason = if id.is_empty() {
        Some("is empty")
    } else if id.len() > MAX_ID_LENGTH {
        Some("is too long")
    } else if id.contains('/') {
        Some("contains '/'")
    } else if id.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else {
        None
    };

    match reason {
        Some(reason) => {
            log::error!("Invalid document id {:?}: {}", id, reason);
            Err(DocRepoError::new(
                &format!("Invalid document id '{}': {}", id, reason),
                ErrorKind::InvalidArgument,
            ))
        }
        None => Ok(()),
    }
}

fn new_revision() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn collection_not_found(collection: &str) -> DocRepoError {
    log::error!("Collection {} not found", collection);
    DocRepoError::new(
        &format!("Collection '{}' not found", collection),
        ErrorKind::NotFound,
    )
}

fn document_not_found(collection: &str, id: &str) -> DocRepoError {
    log::debug!("Document {}/{} not found", collection, id);
    DocRepoError::new(
        &format!("Document '{}/{}' not found", collection, id),
        ErrorKind::NotFound,
    )
}
