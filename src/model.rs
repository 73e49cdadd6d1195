//! Parsed service model and the interface-parser seam.
//!
//! A [`ServiceModel`] is the structured form of a candid interface
//! description: an insertion-ordered map from method name to
//! [`ServiceMethod`]. The model is produced once by an [`InterfaceParser`]
//! implementation at bind time and is read-only afterwards.
//!
//! # Example
//!
//! ```
//! use canister_client::model::{MethodAnnotation, ServiceMethod, ServiceModel};
//!
//! let mut model = ServiceModel::new();
//! model.insert(ServiceMethod::new(
//!     "greet",
//!     ["text".into()],
//!     ["text".into()],
//!     Some(MethodAnnotation::Query),
//! ));
//! assert_eq!(model.get("greet").unwrap().arg_types.len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::idl::TypeDescriptor;

/// Per-method annotation from the interface description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodAnnotation {
    /// Read-only call, servable without full consensus.
    Query,
    /// Query that may itself call other queries.
    CompositeQuery,
    /// Fire-and-forget update.
    Oneway,
}

impl fmt::Display for MethodAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodAnnotation::Query => f.write_str("query"),
            MethodAnnotation::CompositeQuery => f.write_str("composite_query"),
            MethodAnnotation::Oneway => f.write_str("oneway"),
        }
    }
}

/// Which agent primitive a method dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// Read-only query path.
    Query,
    /// State-mutating update path.
    Update,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMode::Query => f.write_str("query"),
            CallMode::Update => f.write_str("update"),
        }
    }
}

/// One declared method of a service.
///
/// Immutable once parsed. Owned by the [`ServiceModel`] and shared by
/// reference with every adaptor bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceMethod {
    /// Declared method name.
    pub name: String,
    /// Declared argument types, in order.
    pub arg_types: Vec<TypeDescriptor>,
    /// Declared return types, in order.
    pub ret_types: Vec<TypeDescriptor>,
    /// Optional annotation (`query`, `composite_query`, `oneway`).
    pub annotation: Option<MethodAnnotation>,
}

impl ServiceMethod {
    /// Create a method declaration.
    pub fn new(
        name: impl Into<String>,
        arg_types: impl IntoIterator<Item = TypeDescriptor>,
        ret_types: impl IntoIterator<Item = TypeDescriptor>,
        annotation: Option<MethodAnnotation>,
    ) -> Self {
        Self {
            name: name.into(),
            arg_types: arg_types.into_iter().collect(),
            ret_types: ret_types.into_iter().collect(),
            annotation,
        }
    }

    /// The call mode this method's annotation selects.
    ///
    /// `query` and `composite_query` dispatch to the query path; everything
    /// else, `oneway` and unannotated methods included, is an update.
    pub fn call_mode(&self) -> CallMode {
        match self.annotation {
            Some(MethodAnnotation::Query) | Some(MethodAnnotation::CompositeQuery) => {
                CallMode::Query
            }
            _ => CallMode::Update,
        }
    }
}

/// Insertion-ordered map from method name to [`ServiceMethod`].
///
/// Enumeration yields methods in declaration order. Re-inserting an existing
/// name replaces the method in place without moving its position, so the
/// last declaration wins exactly as it does in the source description.
#[derive(Debug, Clone, Default)]
pub struct ServiceModel {
    methods: Vec<Arc<ServiceMethod>>,
    index: HashMap<String, usize>,
}

impl ServiceModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method declaration. An existing name is replaced in place.
    pub fn insert(&mut self, method: ServiceMethod) {
        match self.index.get(&method.name) {
            Some(&slot) => {
                self.methods[slot] = Arc::new(method);
            }
            None => {
                self.index.insert(method.name.clone(), self.methods.len());
                self.methods.push(Arc::new(method));
            }
        }
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&Arc<ServiceMethod>> {
        self.index.get(name).map(|&slot| &self.methods[slot])
    }

    /// Enumerate methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<ServiceMethod>> {
        self.methods.iter()
    }

    /// Number of declared methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the model declares no methods.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Parser for interface-description text.
///
/// The grammar and its parsing are external to this crate; implementations
/// turn description text into a [`ServiceModel`] and surface their own
/// failures through [`CanisterError::Parse`](crate::CanisterError::Parse).
pub trait InterfaceParser: Send + Sync {
    /// Parse an interface description into a service model.
    fn parse(&self, description: &str) -> Result<ServiceModel>;
}
