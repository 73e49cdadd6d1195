//! Plain values and typed argument pairs.

use candid::Principal;

use crate::idl::TypeDescriptor;

/// A plain value as supplied by or returned to a caller.
///
/// The vocabulary mirrors the service's interface-description language at the
/// granularity this crate needs: enough structure to wrap arguments for the
/// codec and to inspect the first argument of management-canister calls.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value (`null`).
    Null,
    /// Boolean.
    Bool(bool),
    /// Unsigned integer (`nat` family).
    Nat(u128),
    /// Signed integer (`int` family).
    Int(i128),
    /// Floating point (`float32`/`float64`).
    Float(f64),
    /// Text.
    Text(String),
    /// Raw bytes (`blob` / `vec nat8`).
    Blob(Vec<u8>),
    /// A canister or user principal.
    Principal(Principal),
    /// Optional value.
    Opt(Option<Box<Value>>),
    /// Homogeneous sequence.
    Vec(Vec<Value>),
    /// Record with named fields, in declaration order.
    Record(Vec<(String, Value)>),
    /// Variant with a single active alternative.
    Variant(String, Box<Value>),
}

impl Value {
    /// Convenience constructor for text values.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Convenience constructor for record values.
    pub fn record<N: Into<String>>(fields: impl IntoIterator<Item = (N, Value)>) -> Self {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }

    /// Look up a record field by name. Returns `None` for non-records.
    pub fn record_field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// View this value as a principal, if it is one.
    pub fn as_principal(&self) -> Option<&Principal> {
        match self {
            Value::Principal(principal) => Some(principal),
            _ => None,
        }
    }

    /// View this value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Nat(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Principal> for Value {
    fn from(v: Principal) -> Self {
        Value::Principal(v)
    }
}

/// A value paired with its declared type, ready for the codec.
///
/// Built per call by zipping positional arguments with the method's declared
/// argument types; lives only for the duration of one call.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    /// Declared type of the value.
    pub ty: TypeDescriptor,
    /// The value itself.
    pub value: Value,
}

impl TypedValue {
    /// Pair a value with its declared type.
    pub fn new(ty: TypeDescriptor, value: Value) -> Self {
        Self { ty, value }
    }
}
