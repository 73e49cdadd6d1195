//! Interface-description discovery.
//!
//! When a canister is bound without a known interface description, two
//! sources are tried in order:
//!
//! 1. a query to the introspection method the canister itself may expose
//! 2. a certificate-backed read of the `candid:service` metadata path
//!
//! The fallback is an explicit two-step attempt: when both fail, the bind
//! error carries both typed causes instead of collapsing them into one.

use candid::Principal;

use crate::agent::{candid_metadata_path, Agent, AgentReply};
use crate::codec::ArgumentCodec;
use crate::error::{CanisterError, Result};
use crate::idl::{TypeDescriptor, Value};

/// Introspection method name a canister may expose for its own interface.
pub const INTROSPECTION_METHOD: &str = "__get_candid_interface_tmp_hack";

/// Fetch the interface description, blocking.
///
/// An empty description from either source counts as a failure of that
/// source.
pub(crate) fn fetch_interface(
    agent: &dyn Agent,
    codec: &dyn ArgumentCodec,
    canister_id: &Principal,
) -> Result<String> {
    let introspection = match introspect(agent, codec, canister_id) {
        Ok(text) => return Ok(text),
        Err(err) => err,
    };

    tracing::warn!(
        canister_id = %canister_id,
        "interface introspection failed, falling back to certified metadata"
    );
    match read_metadata(agent, canister_id) {
        Ok(text) => Ok(text),
        Err(metadata) => Err(CanisterError::InterfaceUnavailable {
            canister_id: canister_id.to_text(),
            introspection: Box::new(introspection),
            metadata: Box::new(metadata),
        }),
    }
}

/// Fetch the interface description, suspending at each agent boundary.
pub(crate) async fn fetch_interface_async(
    agent: &dyn Agent,
    codec: &dyn ArgumentCodec,
    canister_id: &Principal,
) -> Result<String> {
    let introspection = match introspect_async(agent, codec, canister_id).await {
        Ok(text) => return Ok(text),
        Err(err) => err,
    };

    tracing::warn!(
        canister_id = %canister_id,
        "interface introspection failed, falling back to certified metadata"
    );
    match read_metadata_async(agent, canister_id).await {
        Ok(text) => Ok(text),
        Err(metadata) => Err(CanisterError::InterfaceUnavailable {
            canister_id: canister_id.to_text(),
            introspection: Box::new(introspection),
            metadata: Box::new(metadata),
        }),
    }
}

fn introspection_ret_types() -> [TypeDescriptor; 1] {
    [TypeDescriptor::new("text")]
}

fn introspect(
    agent: &dyn Agent,
    codec: &dyn ArgumentCodec,
    canister_id: &Principal,
) -> Result<String> {
    let payload = codec.encode(&[])?;
    let reply = agent.query(
        canister_id,
        INTROSPECTION_METHOD,
        payload,
        &introspection_ret_types(),
        canister_id,
    )?;
    interface_text(reply)
}

async fn introspect_async(
    agent: &dyn Agent,
    codec: &dyn ArgumentCodec,
    canister_id: &Principal,
) -> Result<String> {
    let payload = codec.encode(&[])?;
    let reply = agent
        .query_async(
            canister_id,
            INTROSPECTION_METHOD,
            payload,
            &introspection_ret_types(),
            canister_id,
        )
        .await?;
    interface_text(reply)
}

fn read_metadata(agent: &dyn Agent, canister_id: &Principal) -> Result<String> {
    let path = candid_metadata_path(canister_id);
    let bytes = agent.read_state(canister_id, &[path])?;
    metadata_text(bytes)
}

async fn read_metadata_async(agent: &dyn Agent, canister_id: &Principal) -> Result<String> {
    let path = candid_metadata_path(canister_id);
    let bytes = agent.read_state_async(canister_id, &[path]).await?;
    metadata_text(bytes)
}

/// Extract the interface text from an introspection reply: a single text
/// value, bare or as a one-element sequence.
fn interface_text(reply: AgentReply) -> Result<String> {
    let text = match reply {
        AgentReply::Value(Value::Text(text)) => text,
        AgentReply::Args(args) => match args.into_iter().next().map(|arg| arg.value) {
            Some(Value::Text(text)) => text,
            _ => {
                return Err(CanisterError::UnexpectedReply(
                    "introspection reply is not a single text value",
                ))
            }
        },
        AgentReply::Value(_) => {
            return Err(CanisterError::UnexpectedReply(
                "introspection reply is not a single text value",
            ))
        }
    };

    if text.is_empty() {
        return Err(CanisterError::UnexpectedReply(
            "interface description is empty",
        ));
    }
    Ok(text)
}

fn metadata_text(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)?;
    if text.is_empty() {
        return Err(CanisterError::UnexpectedReply(
            "certified candid:service metadata is empty",
        ));
    }
    Ok(text)
}
