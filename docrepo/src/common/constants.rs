pub const DOC_ID: &str = "_id";
pub const DOC_REVISION: &str = "_rev";

/// Attribute names managed by the driver, never stored as ordinary fields.
pub const RESERVED_FIELDS: [&str; 2] = [DOC_ID, DOC_REVISION];

/// Prefix marking an attribute as internal (hidden).
pub const HIDDEN_ATTRIBUTE_PREFIX: char = '_';

pub const DEFAULT_ALIAS_SEPARATOR: &str = ":";
pub const DEFAULT_NAMESPACE_SEPARATOR: &str = ".";
pub const DEFAULT_REPOSITORY_NAMESPACE: &str = "repository";

/// Upper bound on document identifier length, in bytes.
pub const MAX_ID_LENGTH: usize = 254;

/// Returns `true` if `name` is one of the reserved attributes.
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// Returns `true` if `name` is an internal attribute that is not reserved.
pub fn is_hidden_attribute(name: &str) -> bool {
    name.starts_with(HIDDEN_ATTRIBUTE_PREFIX) && !is_reserved_field(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_fields() {
        assert!(is_reserved_field("_id"));
        assert!(is_reserved_field("_rev"));
        assert!(!is_reserved_field("_key"));
        assert!(!is_reserved_field("name"));
    }

    #[test]
    fn hidden_attributes() {
        assert!(is_hidden_attribute("_key"));
        assert!(is_hidden_attribute("_meta"));
        assert!(!is_hidden_attribute("_id"));
        assert!(!is_hidden_attribute("_rev"));
        assert!(!is_hidden_attribute("name_"));
    }
}
