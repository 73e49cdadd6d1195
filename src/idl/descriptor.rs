//! Opaque type descriptors.

use std::fmt;
use std::sync::Arc;

/// A type expression from the service's interface description.
///
/// Descriptors are produced by the interface parser and handed through to the
/// codec and the agent untouched; this crate never inspects their contents.
/// Cloning is cheap (shared text).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor(Arc<str>);

impl TypeDescriptor {
    /// Create a descriptor from a type expression.
    pub fn new(expr: &str) -> Self {
        Self(Arc::from(expr))
    }

    /// The textual type expression.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(expr: &str) -> Self {
        Self::new(expr)
    }
}

impl From<String> for TypeDescriptor {
    fn from(expr: String) -> Self {
        Self(Arc::from(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_round_trip() {
        let ty = TypeDescriptor::new("vec nat8");
        assert_eq!(ty.as_str(), "vec nat8");
        assert_eq!(ty.to_string(), "vec nat8");
    }

    #[test]
    fn test_descriptor_equality_and_clone() {
        let a = TypeDescriptor::new("text");
        let b: TypeDescriptor = "text".into();
        assert_eq!(a, b);
        assert_eq!(a.clone(), b);
    }
}
