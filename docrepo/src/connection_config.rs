//! Configuration of a [crate::connection::Connection].

use crate::common::{
    DEFAULT_ALIAS_SEPARATOR, DEFAULT_NAMESPACE_SEPARATOR, DEFAULT_REPOSITORY_NAMESPACE,
};
use crate::driver::{WriteDefaults, WritePolicy};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};

/// Connection-wide settings.
///
/// | setting                | default      |
/// |------------------------|--------------|
/// | `default_policy`       | `error`      |
/// | `wait_for_sync`        | driver's own |
/// | `alias_separator`      | `:`          |
/// | `namespace_separator`  | `.`          |
/// | `repository_namespace` | `repository` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    default_policy: WritePolicy,
    wait_for_sync: Option<bool>,
    alias_separator: String,
    namespace_separator: String,
    repository_namespace: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        ConnectionConfig {
            default_policy: WritePolicy::default(),
            wait_for_sync: None,
            alias_separator: DEFAULT_ALIAS_SEPARATOR.to_string(),
            namespace_separator: DEFAULT_NAMESPACE_SEPARATOR.to_string(),
            repository_namespace: DEFAULT_REPOSITORY_NAMESPACE.to_string(),
        }
    }

    pub fn default_policy(&self) -> WritePolicy {
        self.default_policy
    }

    pub fn set_default_policy(&mut self, policy: WritePolicy) {
        self.default_policy = policy;
    }

    pub fn wait_for_sync(&self) -> Option<bool> {
        self.wait_for_sync
    }

    pub fn set_wait_for_sync(&mut self, wait_for_sync: bool) {
        self.wait_for_sync = Some(wait_for_sync);
    }

    pub fn alias_separator(&self) -> &str {
        &self.alias_separator
    }

    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if `separator` is empty.
    pub fn set_alias_separator(&mut self, separator: &str) -> DocRepoResult<()> {
        self.alias_separator = non_empty("alias separator", separator)?;
        Ok(())
    }

    pub fn namespace_separator(&self) -> &str {
        &self.namespace_separator
    }

    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if `separator` is empty.
    pub fn set_namespace_separator(&mut self, separator: &str) -> DocRepoResult<()> {
        self.namespace_separator = non_empty("namespace separator", separator)?;
        Ok(())
    }

    pub fn repository_namespace(&self) -> &str {
        &self.repository_namespace
    }

    /// Sets the namespace segment inserted between an alias prefix and the
    /// simple repository name. An empty namespace is skipped.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if `namespace` contains whitespace.
    pub fn set_repository_namespace(&mut self, namespace: &str) -> DocRepoResult<()> {
        if namespace.chars().any(char::is_whitespace) {
            log::error!("Repository namespace {:?} contains whitespace", namespace);
            return Err(DocRepoError::new(
                &format!("Repository namespace '{}' contains whitespace", namespace),
                ErrorKind::ConfigurationError,
            ));
        }
        self.repository_namespace = namespace.to_string();
        Ok(())
    }

    /// Values applied to write options left unset.
    pub fn write_defaults(&self) -> WriteDefaults {
        WriteDefaults {
            policy: self.default_policy,
            wait_for_sync: self.wait_for_sync,
        }
    }

    /// Checks the settings against each other.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if one separator contains the other.
    pub fn validate(&self) -> DocRepoResult<()> {
        if self.namespace_separator.contains(&self.alias_separator)
            || self.alias_separator.contains(&self.namespace_separator)
        {
            log::error!(
                "Alias separator {:?} clashes with namespace separator {:?}",
                self.alias_separator, self.namespace_separator
            );
            return Err(DocRepoError::new(
                &format!(
                    "Alias separator '{}' clashes with namespace separator '{}'",
                    self.alias_separator, self.namespace_separator
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        if self.repository_namespace.contains(&self.alias_separator) {
            log::error!("Repository namespace {} contains the alias separator", self.repository_namespace);
            return Err(DocRepoError::new(
                &format!(
                    "Repository namespace '{}' contains the alias separator '{}'",
                    self.repository_namespace, self.alias_separator
                ),
                ErrorKind::ConfigurationError,
            ));
        }
        Ok(())
    }
}

fn non_empty(setting: &str, value: &str) -> DocRepoResult<String> {
    if value.is_empty() {
        log::error!("{} cannot be empty", setting);
        return Err(DocRepoError::new(
            &format!("The {} cannot be empty", setting),
            ErrorKind::ConfigurationError,
        ));
    }
    Ok(value.to_string())
}
