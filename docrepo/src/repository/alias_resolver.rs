use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use std::collections::HashMap;

/// Resolves the alias part of an alias-qualified repository name to a
/// namespace prefix.
///
/// `"Billing:Invoice"` is split into the alias `"Billing"` and the simple name
/// `"Invoice"`; the resolver turns `"Billing"` into a prefix such as
/// `"acme.billing"`, from which the registry builds the type name
/// `"acme.billing.repository.Invoice"`.
///
/// Resolution must be deterministic: the same alias always maps to the same
/// prefix. Closures `Fn(&str) -> Option<String>` are resolvers too.
pub trait AliasResolver: Send + Sync {
    /// Returns the namespace prefix of `alias`.
    ///
    /// # Errors
    ///
    /// [ErrorKind::ConfigurationError] if the alias is unknown.
    fn resolve(&self, alias: &str) -> DocRepoResult<String>;
}

impl<F> AliasResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn resolve(&self, alias: &str) -> DocRepoResult<String> {
        self(alias).ok_or_else(|| unknown_alias(alias))
    }
}

/// Map-backed resolver populated at startup.
#[derive(Clone, Debug, Default)]
pub struct StaticAliasResolver {
    aliases: HashMap<String, String>,
}

impl StaticAliasResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `alias -> prefix`, replacing any previous mapping of `alias`.
    pub fn with_alias(mut self, alias: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.insert(alias, prefix);
        self
    }

    pub fn insert(&mut self, alias: impl Into<String>, prefix: impl Into<String>) {
        self.aliases.insert(alias.into(), prefix.into());
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<A: Into<String>, P: Into<String>> FromIterator<(A, P)> for StaticAliasResolver {
    fn from_iter<I: IntoIterator<Item = (A, P)>>(iter: I) -> Self {
        let mut resolver = StaticAliasResolver::new();
        for (alias, prefix) in iter {
            resolver.insert(alias, prefix);
        }
        resolver
    }
}

impl AliasResolver for StaticAliasResolver {
    fn resolve(&self, alias: &str) -> DocRepoResult<String> {
        self.aliases
            .get(alias)
            .cloned()
            .ok_or_else(|| unknown_alias(alias))
    }
}

/// Resolver of connections without alias support; every alias is unknown.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAliasResolver;

impl AliasResolver for NoAliasResolver {
    fn resolve(&self, alias: &str) -> DocRepoResult<String> {
        Err(unknown_alias(alias))
    }
}

fn unknown_alias(alias: &str) -> DocRepoError {
    log::error!("Unknown repository alias {}", alias);
    DocRepoError::new(
        &format!("Unknown repository alias '{}'", alias),
        ErrorKind::ConfigurationError,
    )
}
