use crate::common::{is_hidden_attribute, is_reserved_field, Fields, Value, DOC_ID, DOC_REVISION};
use crate::document::DocumentOptions;
use crate::errors::{DocRepoResult, DocRepoError, ErrorKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One record of a collection.
///
/// A document is made of an identifier, a revision token and an ordered
/// mapping of attribute names to [Value]s. The identifier and the revision are
/// assigned by the driver; the attribute names `_id` and `_rev` are reserved
/// for them and cannot be used as ordinary fields.
///
/// A document created by the caller has no id. Repository write operations
/// refresh the id and the revision from the driver's response.
///
/// # Examples
///
/// ```rust
/// use docrepo::document::Document;
///
/// let mut doc = Document::new();
/// doc.put("name", "Ann")?;
/// assert!(doc.is_new());
/// assert_eq!(doc.get("name").and_then(|v| v.as_str()), Some("Ann"));
/// # Ok::<(), docrepo::errors::DocRepoError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
    #[serde(flatten)]
    fields: Fields,
}

impl Document {
    /// Creates a new empty document without id.
    pub fn new() -> Self {
        Document {
            id: None,
            revision: None,
            fields: Fields::new(),
        }
    }

    /// Creates an empty document bound to `id`.
    pub fn with_id(id: impl Into<String>) -> Self {
        Document {
            id: Some(id.into()),
            revision: None,
            fields: Fields::new(),
        }
    }

    /// Builds a document from a raw mapping.
    ///
    /// With [DocumentOptions::is_include_internals] the `_id` and `_rev`
    /// entries are parsed into the id and the revision; otherwise they are
    /// dropped. With [DocumentOptions::is_ignore_hidden_attributes] every other
    /// attribute starting with `_` is dropped; otherwise it is kept as an
    /// ordinary field.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if `value` is not a [Value::Map], or if an
    /// internal attribute is neither a string nor an integer.
    pub fn create_from_fields(value: Value, options: &DocumentOptions) -> DocRepoResult<Self> {
        let raw = match value {
            Value::Map(fields) => fields,
            other => {
                log::error!("Cannot create a document from a {} value", other.type_name());
                return Err(DocRepoError::new(
                    &format!("Document must be created from a map, got {}", other.type_name()),
                    ErrorKind::InvalidArgument,
                ));
            }
        };

        let mut document = Document::new();
        for (key, value) in raw {
            if is_reserved_field(&key) {
                if options.is_include_internals() {
                    let internal = internal_attribute(&key, value)?;
                    if key == DOC_ID {
                        document.id = internal;
                    } else {
                        document.revision = internal;
                    }
                }
                continue;
            }

            if options.is_ignore_hidden_attributes() && is_hidden_attribute(&key) {
                continue;
            }
            document.put(key, value)?;
        }
        Ok(document)
    }

    /// Parses `json` and builds a document from it, see [Document::create_from_fields].
    pub fn create_from_json(json: &str, options: &DocumentOptions) -> DocRepoResult<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Document::create_from_fields(parsed.into(), options)
    }

    /// Builds a document from any serializable value that renders as a map.
    ///
    /// `_id` and `_rev` members of the serialized form become the id and the
    /// revision of the document.
    pub fn from_serializable<T: Serialize>(value: &T) -> DocRepoResult<Self> {
        let json = serde_json::to_value(value)?;
        Document::create_from_fields(json.into(), &DocumentOptions::default())
    }

    /// Deserializes the document, internals included, into `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> DocRepoResult<T> {
        let json: serde_json::Value = self.to_value(true).into();
        Ok(serde_json::from_value(json)?)
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    pub fn set_revision(&mut self, revision: impl Into<String>) {
        self.revision = Some(revision.into());
    }

    /// Returns `true` if the document has never been assigned an id.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidArgument] if `key` is empty or reserved.
    pub fn put<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> DocRepoResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocRepoError::new(
                "Document does not support empty key",
                ErrorKind::InvalidArgument,
            ));
        }

        if is_reserved_field(&key) {
            log::error!("Attribute {} is managed by the driver and cannot be set as a field", key);
            return Err(DocRepoError::new(
                &format!("Attribute '{}' is reserved and cannot be set as a field", key),
                ErrorKind::InvalidArgument,
            ));
        }

        self.fields.insert(key, value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Removes `key`, keeping the order of the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Renders the document as a [Value::Map], optionally with `_id` and `_rev`
    /// in front of the fields.
    pub fn to_value(&self, include_internals: bool) -> Value {
        let mut map = Fields::with_capacity(self.fields.len() + 2);
        if include_internals {
            if let Some(id) = &self.id {
                map.insert(DOC_ID.to_string(), Value::from(id));
            }
            if let Some(revision) = &self.revision {
                map.insert(DOC_REVISION.to_string(), Value::from(revision));
            }
        }
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Map(map)
    }

    /// Renders the document as a JSON string.
    pub fn to_json(&self, include_internals: bool) -> DocRepoResult<String> {
        let json: serde_json::Value = self.to_value(include_internals).into();
        Ok(serde_json::to_string(&json)?)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value(true))
    }
}

fn internal_attribute(key: &str, value: Value) -> DocRepoResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::I64(i) => Ok(Some(i.to_string())),
        Value::U64(u) => Ok(Some(u.to_string())),
        other => {
            log::error!("Invalid {} value of type {}", key, other.type_name());
            Err(DocRepoError::new(
                &format!("Attribute '{}' must be a string or an integer, got {}", key, other.type_name()),
                ErrorKind::InvalidArgument,
            ))
        }
    }
}
