/// Strips the surrounding quotes of a stringified `doc!` key.
pub fn normalize(key: &str) -> String {
    key.trim_matches('"').to_string()
}

/// Creates a [crate::document::Document] from key-value pairs.
///
/// Keys are identifiers or string literals. Values are expressions, nested
/// `{ .. }` maps or `[ .. ]` arrays.
///
/// # Panics
///
/// Panics if a key is empty or reserved (`_id`, `_rev`).
///
/// # Examples
///
/// ```rust
/// use docrepo::doc;
///
/// let doc = doc! {
///     "first name": "Ann",
///     age: 30,
///     address: { city: "Oslo", zip: "0150" },
///     scores: [1, 2, 3]
/// };
/// assert_eq!(doc.get("first name").and_then(|v| v.as_str()), Some("Ann"));
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::document::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::document::Document::new();
            $(
                doc.put($crate::document::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro converting `doc!` values.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Map($crate::doc!{ $($key : $value),* }.into_fields())
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    #[test]
    fn normalize_strips_quotes() {
        assert_eq!(normalize("\"first name\""), "first name");
        assert_eq!(normalize("name"), "name");
    }

    #[test]
    fn empty_doc() {
        assert!(doc!().is_empty());
    }

    #[test]
    fn nested_doc() {
        let doc = doc! {
            name: "Ann",
            address: { city: "Oslo", geo: { lat: 59.9 } },
            tags: ["a", { kind: "b" }],
            missing: (None::<i32>)
        };

        assert_eq!(doc.get("name"), Some(&Value::from("Ann")));
        let address = doc.get("address").and_then(|v| v.as_map()).unwrap();
        assert_eq!(address.get("city"), Some(&Value::from("Oslo")));
        assert!(address.get("geo").map(|v| v.is_map()).unwrap_or(false));

        let tags = doc.get("tags").and_then(|v| v.as_array()).unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags[1].is_map());
        assert_eq!(doc.get("missing"), Some(&Value::Null));
    }
}
