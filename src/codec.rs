//! Argument codec seam.
//!
//! The binary layout of arguments and results belongs to an external codec;
//! this crate only ever hands it typed values and expected types. Call
//! adaptors perform exactly one [`encode`](ArgumentCodec::encode) per
//! invocation; decoding of results happens inside the agent, which reports
//! back already-decoded values.

use bytes::Bytes;

use crate::error::Result;
use crate::idl::{TypeDescriptor, TypedValue};

/// Encoder/decoder for the service's value types.
///
/// Implementations surface their own failures through
/// [`CanisterError::Codec`](crate::CanisterError::Codec) so diagnostic detail
/// crosses the boundary unchanged.
pub trait ArgumentCodec: Send + Sync {
    /// Encode an ordered sequence of typed arguments into call payload bytes.
    fn encode(&self, args: &[TypedValue]) -> Result<Bytes>;

    /// Decode payload bytes against the expected types.
    fn decode(&self, bytes: &[u8], expected: &[TypeDescriptor]) -> Result<Vec<TypedValue>>;
}
