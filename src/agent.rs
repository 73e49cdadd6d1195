//! Agent seam - the remote execution collaborator.
//!
//! An [`Agent`] owns everything below the marshaling layer: transport,
//! retries, and certificate verification for state reads. This crate drives
//! it through five primitives and never looks behind them.
//!
//! Call primitives take the target canister, the method name, the encoded
//! argument payload, the declared return types, and the *effective* canister
//! id. The target canister is always the routing key; the effective id is
//! handed through for lower-layer certificate and consensus routing, and
//! differs from the target only for management-canister calls.

use async_trait::async_trait;
use bytes::Bytes;
use candid::Principal;

use crate::error::Result;
use crate::idl::{TypeDescriptor, TypedValue, Value};

/// A decoded reply from an agent call primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentReply {
    /// A single decoded value (already unwrapped by the agent).
    Value(Value),
    /// An ordered sequence of decoded values with their types.
    Args(Vec<TypedValue>),
}

/// One path of a certificate-backed state read, as raw byte segments.
pub type StatePath = Vec<Vec<u8>>;

/// Remote execution agent for canister calls.
///
/// The blocking primitives occupy the calling thread until the call
/// resolves; the suspending ones yield at the network boundary. Both sides
/// must agree on semantics - an implementation typically funnels them into
/// one transport. Failures are reported through
/// [`CanisterError::Agent`](crate::CanisterError::Agent) and propagate to
/// callers unchanged.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Issue a read-only query call, blocking until the reply arrives.
    fn query(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply>;

    /// Issue a state-changing update call, blocking until the reply arrives.
    fn update(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply>;

    /// Issue a read-only query call, suspending at the network boundary.
    async fn query_async(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply>;

    /// Issue a state-changing update call, suspending at the network boundary.
    async fn update_async(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply>;

    /// Read certified state at the given paths, blocking.
    ///
    /// Returns the verified bytes at the first requested path; certificate
    /// lookup and verification are the agent's concern.
    fn read_state(&self, canister_id: &Principal, paths: &[StatePath]) -> Result<Vec<u8>>;

    /// Read certified state at the given paths, suspending.
    async fn read_state_async(
        &self,
        canister_id: &Principal,
        paths: &[StatePath],
    ) -> Result<Vec<u8>>;
}

/// The certified-state path holding a canister's candid interface:
/// `("canister", <principal bytes>, "metadata", "candid:service")`.
pub fn candid_metadata_path(canister_id: &Principal) -> StatePath {
    vec![
        b"canister".to_vec(),
        canister_id.as_slice().to_vec(),
        b"metadata".to_vec(),
        b"candid:service".to_vec(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candid_metadata_path_segments() {
        let principal = Principal::anonymous();
        let path = candid_metadata_path(&principal);

        assert_eq!(path.len(), 4);
        assert_eq!(path[0], b"canister");
        assert_eq!(path[1], principal.as_slice());
        assert_eq!(path[2], b"metadata");
        assert_eq!(path[3], b"candid:service");
    }
}
