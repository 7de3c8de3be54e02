use crate::document::DocumentOptions;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strategy for revision mismatches on write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WritePolicy {
    /// Reject the write with [ErrorKind::Conflict] when the given revision is stale.
    #[default]
    Error,
    /// Last writer wins, revisions are ignored.
    Last,
}

impl Display for WritePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WritePolicy::Error => write!(f, "error"),
            WritePolicy::Last => write!(f, "last"),
        }
    }
}

impl FromStr for WritePolicy {
    type Err = DocRepoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(WritePolicy::Error),
            "last" => Ok(WritePolicy::Last),
            other => {
                log::error!("Unknown write policy {}", other);
                Err(DocRepoError::new(
                    &format!("Unknown write policy '{}', expected 'error' or 'last'", other),
                    ErrorKind::InvalidArgument,
                ))
            }
        }
    }
}

/// Options of a fetch by id.
///
/// When a revision is given and `if_match` is unset, the revision must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchOptions {
    document: DocumentOptions,
    if_match: Option<bool>,
    revision: Option<String>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_internals(mut self, include_internals: bool) -> Self {
        self.document = self.document.include_internals(include_internals);
        self
    }

    pub fn ignore_hidden_attributes(mut self, ignore_hidden_attributes: bool) -> Self {
        self.document = self.document.ignore_hidden_attributes(ignore_hidden_attributes);
        self
    }

    pub fn if_match(mut self, if_match: bool) -> Self {
        self.if_match = Some(if_match);
        self
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn document_options(&self) -> &DocumentOptions {
        &self.document
    }

    pub fn get_if_match(&self) -> Option<bool> {
        self.if_match
    }

    pub fn get_revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

/// Options of an insert.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveOptions {
    create: Option<bool>,
    wait_for_sync: Option<bool>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the collection if it does not exist yet.
    pub fn create(mut self, create: bool) -> Self {
        self.create = Some(create);
        self
    }

    pub fn wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.wait_for_sync = Some(wait_for_sync);
        self
    }

    pub fn is_create(&self) -> bool {
        self.create.unwrap_or(false)
    }

    pub fn get_wait_for_sync(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub(crate) fn with_defaults(mut self, defaults: &WriteDefaults) -> Self {
        self.wait_for_sync = self.wait_for_sync.or(defaults.wait_for_sync);
        self
    }
}

/// Options of a full replace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    policy: Option<WritePolicy>,
    wait_for_sync: Option<bool>,
}

impl ReplaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: WritePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.wait_for_sync = Some(wait_for_sync);
        self
    }

    pub fn get_policy(&self) -> Option<WritePolicy> {
        self.policy
    }

    pub fn get_wait_for_sync(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub(crate) fn with_defaults(mut self, defaults: &WriteDefaults) -> Self {
        self.policy = self.policy.or(Some(defaults.policy));
        self.wait_for_sync = self.wait_for_sync.or(defaults.wait_for_sync);
        self
    }
}

/// Options of a partial update (patch merge).
///
/// `keep_null` defaults to `true`: null-valued patch fields are stored as null.
/// With `false` they remove the attribute from the stored document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateOptions {
    policy: Option<WritePolicy>,
    keep_null: bool,
    wait_for_sync: Option<bool>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        UpdateOptions {
            policy: None,
            keep_null: true,
            wait_for_sync: None,
        }
    }
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: WritePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn keep_null(mut self, keep_null: bool) -> Self {
        self.keep_null = keep_null;
        self
    }

    pub fn wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.wait_for_sync = Some(wait_for_sync);
        self
    }

    pub fn get_policy(&self) -> Option<WritePolicy> {
        self.policy
    }

    pub fn is_keep_null(&self) -> bool {
        self.keep_null
    }

    pub fn get_wait_for_sync(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub(crate) fn with_defaults(mut self, defaults: &WriteDefaults) -> Self {
        self.policy = self.policy.or(Some(defaults.policy));
        self.wait_for_sync = self.wait_for_sync.or(defaults.wait_for_sync);
        self
    }
}

/// Options of a removal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    policy: Option<WritePolicy>,
    wait_for_sync: Option<bool>,
}

impl RemoveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: WritePolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn wait_for_sync(mut self, wait_for_sync: bool) -> Self {
        self.wait_for_sync = Some(wait_for_sync);
        self
    }

    pub fn get_policy(&self) -> Option<WritePolicy> {
        self.policy
    }

    pub fn get_wait_for_sync(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub(crate) fn with_defaults(mut self, defaults: &WriteDefaults) -> Self {
        self.policy = self.policy.or(Some(defaults.policy));
        self.wait_for_sync = self.wait_for_sync.or(defaults.wait_for_sync);
        self
    }
}

/// Connection-wide values applied to write options left unset by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteDefaults {
    pub policy: WritePolicy,
    pub wait_for_sync: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_policy_parse_and_display() {
        assert_eq!("error".parse::<WritePolicy>().unwrap(), WritePolicy::Error);
        assert_eq!(" LAST ".parse::<WritePolicy>().unwrap(), WritePolicy::Last);
        let err = "first".parse::<WritePolicy>().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert_eq!(WritePolicy::Error.to_string(), "error");
        assert_eq!(WritePolicy::Last.to_string(), "last");
        assert_eq!(WritePolicy::default(), WritePolicy::Error);
    }

    #[test]
    fn fetch_options_builder() {
        let options = FetchOptions::new()
            .include_internals(false)
            .ignore_hidden_attributes(true)
            .revision("r1");
        assert!(!options.document_options().is_include_internals());
        assert!(options.document_options().is_ignore_hidden_attributes());
        assert_eq!(options.get_revision(), Some("r1"));
        assert_eq!(options.get_if_match(), None);
        assert_eq!(options.if_match(false).get_if_match(), Some(false));
    }

    #[test]
    fn save_options_defaults() {
        let options = SaveOptions::new();
        assert!(!options.is_create());
        assert_eq!(options.get_wait_for_sync(), None);

        let defaults = WriteDefaults {
            policy: WritePolicy::Last,
            wait_for_sync: Some(true),
        };
        assert_eq!(options.with_defaults(&defaults).get_wait_for_sync(), Some(true));
        let explicit = SaveOptions::new().wait_for_sync(false).with_defaults(&defaults);
        assert_eq!(explicit.get_wait_for_sync(), Some(false));
    }

    #[test]
    fn update_options_keep_null_defaults_to_true() {
        assert!(UpdateOptions::default().is_keep_null());
        assert!(!UpdateOptions::new().keep_null(false).is_keep_null());
    }

    #[test]
    fn write_defaults_fill_unset_policy_only() {
        let defaults = WriteDefaults {
            policy: WritePolicy::Last,
            wait_for_sync: None,
        };
        let replace = ReplaceOptions::new().with_defaults(&defaults);
        assert_eq!(replace.get_policy(), Some(WritePolicy::Last));

        let replace = ReplaceOptions::new()
            .policy(WritePolicy::Error)
            .with_defaults(&defaults);
        assert_eq!(replace.get_policy(), Some(WritePolicy::Error));

        let update = UpdateOptions::new().with_defaults(&defaults);
        assert_eq!(update.get_policy(), Some(WritePolicy::Last));
        assert!(update.is_keep_null());

        let remove = RemoveOptions::new().wait_for_sync(true).with_defaults(&defaults);
        assert_eq!(remove.get_policy(), Some(WritePolicy::Last));
        assert_eq!(remove.get_wait_for_sync(), Some(true));
    }
}
