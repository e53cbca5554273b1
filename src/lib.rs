//! The two non-trivial containers of a small in-memory database:
//! an [`AvlTree`] of unique integers and a [`HashTable`] of string pairs
//! with separate chaining.
//!
//! Both structures carry a name for lookup by a registry and can be saved
//! to and restored from one-line [`Record`]s.
//!
//! Neither structure synchronizes access internally.

mod error;
mod hash_table;
mod record;
mod tree;

pub use error::RecordError;
pub use hash_table::{HashTable, Iter, DEFAULT_CAPACITY, MAX_LOAD_FACTOR};
pub use record::Record;
pub use tree::{AvlTree, Node};
