/// Options controlling how a raw map is turned into a [crate::document::Document].
///
/// * `include_internals` - parse `_id` and `_rev` into the id and the revision
///   (default `true`); when `false` they are dropped.
/// * `ignore_hidden_attributes` - drop the other `_`-prefixed attributes
///   (default `false`).
///
/// # Examples
///
/// ```rust
/// use docrepo::document::DocumentOptions;
///
/// let options = DocumentOptions::default().ignore_hidden_attributes(true);
/// assert!(options.is_include_internals());
/// assert!(options.is_ignore_hidden_attributes());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    include_internals: bool,
    ignore_hidden_attributes: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            include_internals: true,
            ignore_hidden_attributes: false,
        }
    }
}

impl DocumentOptions {
    pub fn new(include_internals: bool, ignore_hidden_attributes: bool) -> Self {
        DocumentOptions {
            include_internals,
            ignore_hidden_attributes,
        }
    }

    pub fn include_internals(mut self, include_internals: bool) -> Self {
        self.include_internals = include_internals;
        self
    }

    pub fn ignore_hidden_attributes(mut self, ignore_hidden_attributes: bool) -> Self {
        self.ignore_hidden_attributes = ignore_hidden_attributes;
        self
    }

    pub fn is_include_internals(&self) -> bool {
        self.include_internals
    }

    pub fn is_ignore_hidden_attributes(&self) -> bool {
        self.ignore_hidden_attributes
    }
}
