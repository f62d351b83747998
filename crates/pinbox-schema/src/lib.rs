//! Tree model for the schema builder.
//!
//! A [`Schema`] is a root group whose descendants are groups, lists and
//! typed fields. Nodes are addressed either by [`NodeId`] or by index path,
//! and every editing operation (insert above, below or within, replace,
//! delete) works in place on the owned tree.
//!
//! ```rust
//! use pinbox_schema::{FieldType, Schema};
//!
//! let mut schema = Schema::new();
//! let customer = schema.group("customer");
//! let path = schema.push_root(customer);
//! let email = schema.field("email", FieldType::String);
//! schema.insert_within(&path, email).unwrap();
//! assert_eq!(schema.node_at(&[0, 0]).unwrap().name, "email");
//! ```

pub mod error;
pub mod naming;
pub mod node;
pub mod tree;

pub use error::SchemaError;
pub use naming::unique_name;
pub use node::{FieldType, KindTag, NodeId, NodeKind, SchemaNode};
pub use tree::{FlatNode, Schema};
