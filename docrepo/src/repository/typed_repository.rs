use crate::document::Document;
use crate::driver::{FetchOptions, RemoveOptions, ReplaceOptions, SaveOptions, UpdateOptions};
use crate::errors::DocRepoResult;
use crate::repository::{DocumentRepository, RepositoryType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

/// A [RepositoryType] whose documents materialize as [TypedRepositoryType::Document].
///
/// ```rust
/// use docrepo::repository::{RepositoryType, TypedRepositoryType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct User {
///     #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     name: String,
/// }
///
/// struct UserRepository;
///
/// impl RepositoryType for UserRepository {
///     const TYPE_NAME: &'static str = "app.repository.User";
///     const COLLECTION: &'static str = "users";
/// }
///
/// impl TypedRepositoryType for UserRepository {
///     type Document = User;
/// }
/// ```
pub trait TypedRepositoryType: RepositoryType {
    type Document: Serialize + DeserializeOwned;
}

/// A [DocumentRepository] bound to the document type `T`.
///
/// Values of `T` must serialize as maps. `_id` and `_rev` members become the
/// id and the revision of the stored document, and fetched documents are
/// deserialized with both, so a `T` declaring them sees the driver-assigned
/// values. Conversion failures are [crate::errors::ErrorKind::InvalidArgument].
///
/// Writes return the written value with its id and revision refreshed.
pub struct TypedRepository<T> {
    repository: Arc<DocumentRepository>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TypedRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(repository: Arc<DocumentRepository>) -> Self {
        TypedRepository {
            repository,
            _phantom: PhantomData,
        }
    }

    /// The untyped repository underneath.
    pub fn repository(&self) -> &Arc<DocumentRepository> {
        &self.repository
    }

    pub fn collection_name(&self) -> &str {
        self.repository.collection_name()
    }

    pub fn get_by_id(&self, id: &str, options: &FetchOptions) -> DocRepoResult<T> {
        let document = self.repository.get_by_id(id, options)?;
        document.deserialize_into()
    }

    pub fn has(&self, id: &str) -> DocRepoResult<bool> {
        self.repository.has(id)
    }

    pub fn save(&self, value: &T, options: &SaveOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.save(&mut document, options)?;
        document.deserialize_into()
    }

    /// Saves `value` when it has no id, replaces the stored one otherwise.
    pub fn store(&self, value: &T, options: &SaveOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.store(&mut document, options)?;
        document.deserialize_into()
    }

    pub fn replace(&self, value: &T, options: &ReplaceOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.replace(&mut document, options)?;
        document.deserialize_into()
    }

    pub fn replace_by_id(&self, id: &str, value: &T, options: &ReplaceOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.replace_by_id(id, &mut document, options)?;
        document.deserialize_into()
    }

    /// Merges `value` into the stored document identified by its id.
    ///
    /// The stored document may keep fields `value` does not serialize; the
    /// returned value is `value` itself with a fresh revision.
    pub fn update(&self, value: &T, options: &UpdateOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.update(&mut document, options)?;
        document.deserialize_into()
    }

    pub fn update_by_id(&self, id: &str, value: &T, options: &UpdateOptions) -> DocRepoResult<T> {
        let mut document = Document::from_serializable(value)?;
        self.repository.update_by_id(id, &mut document, options)?;
        document.deserialize_into()
    }

    pub fn remove(&self, value: &T, options: &RemoveOptions) -> DocRepoResult<bool> {
        let document = Document::from_serializable(value)?;
        self.repository.remove(&document, options)
    }

    pub fn remove_by_id(
        &self,
        id: &str,
        revision: Option<&str>,
        options: &RemoveOptions,
    ) -> DocRepoResult<bool> {
        self.repository.remove_by_id(id, revision, options)
    }
}

impl<T> Clone for TypedRepository<T> {
    fn clone(&self) -> Self {
        TypedRepository {
            repository: self.repository.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Debug for TypedRepository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedRepository")
            .field("document", &std::any::type_name::<T>())
            .field("repository", &self.repository)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DocumentDriver, InMemoryDriver, WritePolicy};
    use crate::errors::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
        revision: Option<String>,
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            id: None,
            revision: None,
            text: text.to_string(),
        }
    }

    fn notes() -> TypedRepository<Note> {
        let driver = DocumentDriver::new(InMemoryDriver::with_auto_create());
        TypedRepository::new(Arc::new(DocumentRepository::new(driver, "notes").unwrap()))
    }

    #[test]
    fn save_assigns_id_and_revision() {
        let notes = notes();
        let saved = notes.save(&note("hello"), &SaveOptions::default()).unwrap();

        let id = saved.id.clone().unwrap();
        assert!(saved.revision.is_some());
        assert_eq!(saved.text, "hello");
        assert_eq!(notes.get_by_id(&id, &FetchOptions::default()).unwrap(), saved);
    }

    #[test]
    fn replace_checks_the_revision() {
        let notes = notes();
        let saved = notes.save(&note("v1"), &SaveOptions::default()).unwrap();

        let mut edited = saved.clone();
        edited.text = "v2".to_string();
        let replaced = notes.replace(&edited, &ReplaceOptions::default()).unwrap();
        assert_ne!(replaced.revision, saved.revision);

        // the first revision is stale now
        let err = notes.replace(&edited, &ReplaceOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Conflict);

        let forced = notes
            .replace(&edited, &ReplaceOptions::new().policy(WritePolicy::Last))
            .unwrap();
        assert_eq!(forced.text, "v2");
    }

    #[test]
    fn store_saves_then_replaces() {
        let notes = notes();
        let first = notes.store(&note("draft"), &SaveOptions::default()).unwrap();
        let id = first.id.clone().unwrap();

        let mut second = first.clone();
        second.text = "final".to_string();
        let second = notes.store(&second, &SaveOptions::default()).unwrap();
        assert_eq!(second.id.as_deref(), Some(id.as_str()));

        let fetched = notes.get_by_id(&id, &FetchOptions::default()).unwrap();
        assert_eq!(fetched.text, "final");
    }

    #[test]
    fn remove_and_has() {
        let notes = notes();
        let saved = notes.save(&note("bye"), &SaveOptions::default()).unwrap();
        let id = saved.id.clone().unwrap();

        assert!(notes.has(&id).unwrap());
        assert!(notes.remove(&saved, &RemoveOptions::default()).unwrap());
        assert!(!notes.has(&id).unwrap());

        let err = notes.remove(&note("no id"), &RemoveOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn mismatched_documents_are_invalid_argument() {
        let notes = notes();
        let mut raw = Document::new();
        raw.put("text", 42).unwrap();
        let id = notes
            .repository()
            .save(&mut raw, &SaveOptions::default())
            .unwrap();

        let err = notes.get_by_id(&id, &FetchOptions::default()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }
}
