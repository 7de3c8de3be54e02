//! Documents and the options controlling how they are built from raw maps.
//!
//! A [Document] is an id, a revision and an ordered mapping of fields:
//!
//! ```rust
//! use docrepo::doc;
//!
//! let doc = doc! {
//!     name: "Ann",
//!     address: { city: "Oslo" },
//!     tags: ["admin", "ops"]
//! };
//! assert_eq!(doc.len(), 3);
//! ```

mod document;
mod document_options;
mod macros;

pub use document::*;
pub use document_options::*;
pub use macros::normalize;
