use crate::connection::Connection;
use crate::document::Document;
use crate::driver::{
    DocumentDriver, DocumentHead, FetchOptions, RemoveOptions, ReplaceOptions, SaveOptions,
    UpdateOptions, WriteDefaults,
};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use std::fmt::{Debug, Formatter};

/// Collection-scoped CRUD facade over a [DocumentDriver].
///
/// A repository is bound to exactly one collection for its whole life; no
/// operation accepts another collection. It holds no state beyond that
/// binding, so a single instance can be shared freely across threads.
///
/// Write operations refresh the id and the revision of the caller's document
/// from the driver's response. Write options left unset by the caller take
/// the [WriteDefaults] of the repository (the connection's defaults when
/// built with [DocumentRepository::for_connection]).
///
/// Driver errors propagate unchanged. The only translation is done by
/// [DocumentRepository::has], which maps [ErrorKind::NotFound] to `false`.
///
/// # Examples
///
/// ```rust
/// use docrepo::doc;
/// use docrepo::driver::{DocumentDriver, FetchOptions, InMemoryDriver, SaveOptions};
/// use docrepo::repository::DocumentRepository;
///
/// let repository = DocumentRepository::new(DocumentDriver::new(InMemoryDriver::new()), "users")?;
///
/// let mut ann = doc! { name: "Ann" };
/// let id = repository.save(&mut ann, &SaveOptions::new().create(true))?;
/// assert_eq!(ann.id(), Some(id.as_str()));
///
/// let fetched = repository.get_by_id(&id, &FetchOptions::default())?;
/// assert_eq!(fetched.get("name"), ann.get("name"));
/// # Ok::<(), docrepo::errors::DocRepoError>(())
/// ```
#[derive(Clone)]
pub struct DocumentRepository {
    collection: String,
    driver: DocumentDriver,
    defaults: WriteDefaults,
}

impl DocumentRepository {
    /// Binds `collection` to `driver`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if `collection` is empty or blank.
    pub fn new(driver: DocumentDriver, collection: &str) -> DocRepoResult<Self> {
        if collection.trim().is_empty() {
            log::error!("Repository collection name cannot be empty");
            return Err(DocRepoError::new(
                "Repository collection name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        log::debug!("Creating repository for collection {}", collection);
        Ok(DocumentRepository {
            collection: collection.to_string(),
            driver,
            defaults: WriteDefaults::default(),
        })
    }

    /// Binds `collection` to the driver of `connection`, with its write defaults.
    pub fn for_connection(connection: &Connection, collection: &str) -> DocRepoResult<Self> {
        let repository = DocumentRepository::new(connection.driver().clone(), collection)?;
        Ok(repository.with_defaults(connection.config().write_defaults()))
    }

    pub fn with_defaults(mut self, defaults: WriteDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn driver(&self) -> &DocumentDriver {
        &self.driver
    }

    pub fn write_defaults(&self) -> &WriteDefaults {
        &self.defaults
    }

    /// Fetches the document `id`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::NotFound] if it does not exist, [ErrorKind::Conflict] if the
    /// revision precondition of `options` fails.
    pub fn get_by_id(&self, id: &str, options: &FetchOptions) -> DocRepoResult<Document> {
        self.driver.fetch(&self.collection, id, options)
    }

    /// Returns `true` if the document `id` exists.
    ///
    /// Only [ErrorKind::NotFound] is turned into `false`; every other error
    /// is returned.
    pub fn has(&self, id: &str) -> DocRepoResult<bool> {
        match self.get_by_id(id, &FetchOptions::default()) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Probes the document `id` without fetching its body.
    pub fn get_head(
        &self,
        id: &str,
        revision: Option<&str>,
        if_match: Option<bool>,
    ) -> DocRepoResult<DocumentHead> {
        self.driver
            .fetch_head(&self.collection, id, revision, if_match)
    }

    /// Inserts `document` and returns its id.
    ///
    /// # Errors
    ///
    /// [ErrorKind::Conflict] if a document with the same id exists.
    pub fn save(&self, document: &mut Document, options: &SaveOptions) -> DocRepoResult<String> {
        let options = options.clone().with_defaults(&self.defaults);
        let meta = self.driver.insert(&self.collection, document, &options)?;

        document.set_id(meta.id.clone());
        document.set_revision(meta.revision);
        Ok(meta.id)
    }

    /// Saves a new document, replaces one that already has an id.
    pub fn store(&self, document: &mut Document, options: &SaveOptions) -> DocRepoResult<String> {
        match document.id().map(str::to_string) {
            Some(id) => {
                let mut replace = ReplaceOptions::new();
                if let Some(wait_for_sync) = options.get_wait_for_sync() {
                    replace = replace.wait_for_sync(wait_for_sync);
                }
                self.replace_by_id(&id, document, &replace)?;
                Ok(id)
            }
            None => self.save(document, options),
        }
    }

    /// Replaces the stored document identified by the id of `document`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if `document` has no id.
    pub fn replace(&self, document: &mut Document, options: &ReplaceOptions) -> DocRepoResult<bool> {
        let id = required_id(document, "replace")?;
        self.replace_by_id(&id, document, options)
    }

    /// Replaces the stored document `id` with `document`, whatever its own id.
    pub fn replace_by_id(
        &self,
        id: &str,
        document: &mut Document,
        options: &ReplaceOptions,
    ) -> DocRepoResult<bool> {
        let options = options.clone().with_defaults(&self.defaults);
        let meta = self.driver.replace(&self.collection, id, document, &options)?;

        document.set_id(meta.id);
        document.set_revision(meta.revision);
        Ok(true)
    }

    /// Merges `document` into the stored document identified by its id.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if `document` has no id.
    pub fn update(&self, document: &mut Document, options: &UpdateOptions) -> DocRepoResult<bool> {
        let id = required_id(document, "update")?;
        self.update_by_id(&id, document, options)
    }

    /// Merges `document` into the stored document `id`.
    pub fn update_by_id(
        &self,
        id: &str,
        document: &mut Document,
        options: &UpdateOptions,
    ) -> DocRepoResult<bool> {
        let options = options.clone().with_defaults(&self.defaults);
        let meta = self.driver.update(&self.collection, id, document, &options)?;

        document.set_id(meta.id);
        document.set_revision(meta.revision);
        Ok(true)
    }

    /// Removes the stored document identified by the id of `document`,
    /// checking its revision according to the policy.
    pub fn remove(&self, document: &Document, options: &RemoveOptions) -> DocRepoResult<bool> {
        let id = required_id(document, "remove")?;
        self.remove_by_id(&id, document.revision(), options)
    }

    pub fn remove_by_id(
        &self,
        id: &str,
        revision: Option<&str>,
        options: &RemoveOptions,
    ) -> DocRepoResult<bool> {
        let options = options.clone().with_defaults(&self.defaults);
        self.driver
            .delete(&self.collection, id, revision, &options)
    }
}

impl Debug for DocumentRepository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("collection", &self.collection)
            .field("defaults", &self.defaults)
            .finish()
    }
}

fn required_id(document: &Document, operation: &str) -> DocRepoResult<String> {
    match document.id() {
        Some(id) => Ok(id.to_string()),
        None => {
            log::error!("Cannot {} a document without id", operation);
            Err(DocRepoError::new(
                &format!("Cannot {} a document without id", operation),
                ErrorKind::InvalidArgument,
            ))
        }
    }
}
