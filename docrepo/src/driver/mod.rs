//! Driver layer: the primitive document operations a database supplies.
//!
//! Repositories never talk to a database directly. They call a
//! [DocumentDriverProvider] through a shared [DocumentDriver] handle, passing
//! per-operation option values:
//!
//! - [FetchOptions] - internals, hidden attributes and revision preconditions
//! - [SaveOptions] - collection auto-creation and sync
//! - [ReplaceOptions], [UpdateOptions], [RemoveOptions] - [WritePolicy] and sync
//!
//! The [memory] module ships [InMemoryDriver], a complete in-process driver
//! used by default and in tests.

mod document_driver;
pub mod memory;
mod options;

pub use document_driver::*;
pub use memory::InMemoryDriver;
pub use options::*;
