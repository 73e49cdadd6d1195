//! Boundary data model shared by the parser, the codec, and callers.
//!
//! This module carries the three types that cross every collaborator seam:
//!
//! - [`TypeDescriptor`] - opaque type expression produced by the interface
//!   parser, interpreted only by the codec and the agent
//! - [`Value`] - plain caller-facing value
//! - [`TypedValue`] - a value paired with its declared type for encoding
//!
//! # Example
//!
//! ```
//! use canister_client::idl::{TypeDescriptor, TypedValue, Value};
//!
//! let arg = TypedValue::new(TypeDescriptor::new("text"), Value::text("alice"));
//! assert_eq!(arg.ty.as_str(), "text");
//! ```

mod descriptor;
mod value;

pub use descriptor::TypeDescriptor;
pub use value::{TypedValue, Value};
