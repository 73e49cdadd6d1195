//! Call adaptors - the callable unit bound per method.
//!
//! Two variants exist by design: [`CanisterMethod`] blocks the calling
//! thread at the agent boundary, [`CanisterMethodAsync`] suspends there.
//! Everything either variant does before and after the agent call - arity
//! validation, typed-argument marshaling, effective-address resolution,
//! result unwrapping - lives in one shared routine so the two paths cannot
//! drift apart.

use std::sync::Arc;

use bytes::Bytes;
use candid::Principal;

use crate::agent::{Agent, AgentReply};
use crate::codec::ArgumentCodec;
use crate::error::{CanisterError, Result};
use crate::idl::{TypedValue, Value};
use crate::model::{CallMode, MethodAnnotation, ServiceMethod};

/// Record field consulted when resolving the effective address of a
/// management-canister call.
const CANISTER_ID_FIELD: &str = "canister_id";

/// Reserved options accepted by the `*_with_options` entry points.
///
/// Carries nothing today and never changes call semantics; it exists so a
/// future call parameter does not break the positional-argument contract.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct CallOptions {}

/// What a proxy call hands back after structural unwrapping.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    /// The agent returned a single value; it is passed through unchanged.
    Value(Value),
    /// The agent returned a sequence; each element's payload value, in order.
    Values(Vec<Value>),
}

impl CallResult {
    /// The single value, if the reply was not a sequence.
    pub fn single(&self) -> Option<&Value> {
        match self {
            CallResult::Value(value) => Some(value),
            CallResult::Values(_) => None,
        }
    }

    /// The value sequence, if the reply was one.
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            CallResult::Value(_) => None,
            CallResult::Values(values) => Some(values),
        }
    }
}

/// The resolved kind of a call target.
///
/// Calls through the reserved management address carry their real target
/// embedded in the first argument; tagging the distinction once at bind time
/// keeps the per-call check explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallTarget {
    /// A regular service; effective address always equals the target.
    Ordinary(Principal),
    /// The reserved management service.
    Management,
}

impl CallTarget {
    /// Tag a target principal.
    pub(crate) fn classify(canister_id: Principal) -> Self {
        if canister_id == Principal::management_canister() {
            CallTarget::Management
        } else {
            CallTarget::Ordinary(canister_id)
        }
    }

    /// The principal used as the routing key for every call.
    pub(crate) fn canister_id(&self) -> Principal {
        match self {
            CallTarget::Ordinary(canister_id) => *canister_id,
            CallTarget::Management => Principal::management_canister(),
        }
    }

    /// Resolve the effective address for one call.
    ///
    /// Only management calls can be redirected, and only when the first
    /// positional argument embeds a target principal.
    fn effective_canister_id(&self, args: &[Value]) -> Principal {
        match self {
            CallTarget::Ordinary(canister_id) => *canister_id,
            CallTarget::Management => {
                embedded_canister_id(args).unwrap_or_else(Principal::management_canister)
            }
        }
    }
}

/// Extract the target principal embedded in a management call's first
/// argument, if present: a record carrying a principal under `canister_id`.
fn embedded_canister_id(args: &[Value]) -> Option<Principal> {
    args.first()?
        .record_field(CANISTER_ID_FIELD)?
        .as_principal()
        .copied()
}

/// A call ready for dispatch: encoded payload plus resolved effective address.
struct PreparedCall {
    payload: Bytes,
    effective_canister_id: Principal,
}

/// Shared pre-dispatch routine for both adaptor variants.
///
/// Checks arity before anything else, zips positional arguments with their
/// declared types in order, performs exactly one encode, and resolves the
/// effective address from the raw (pre-marshaling) arguments.
fn prepare(
    codec: &dyn ArgumentCodec,
    target: CallTarget,
    method: &ServiceMethod,
    args: &[Value],
) -> Result<PreparedCall> {
    if args.len() != method.arg_types.len() {
        return Err(CanisterError::ArgumentCount {
            method: method.name.clone(),
            expected: method.arg_types.len(),
            got: args.len(),
        });
    }

    let typed: Vec<TypedValue> = method
        .arg_types
        .iter()
        .zip(args.iter())
        .map(|(ty, value)| TypedValue::new(ty.clone(), value.clone()))
        .collect();
    let payload = codec.encode(&typed)?;

    Ok(PreparedCall {
        payload,
        effective_canister_id: target.effective_canister_id(args),
    })
}

/// Shared structural unwrapping for both adaptor variants.
///
/// A non-sequence reply passes through unchanged; a sequence is mapped to
/// its payload values, discarding the type tags.
fn unwrap_reply(reply: AgentReply) -> CallResult {
    match reply {
        AgentReply::Value(value) => CallResult::Value(value),
        AgentReply::Args(args) => {
            CallResult::Values(args.into_iter().map(|arg| arg.value).collect())
        }
    }
}

/// Blocking call adaptor for one declared method.
///
/// Immutable after bind; safely shared and invoked concurrently. Holds the
/// agent and codec by shared reference and the method declaration by
/// reference to the model's copy.
pub struct CanisterMethod {
    agent: Arc<dyn Agent>,
    codec: Arc<dyn ArgumentCodec>,
    target: CallTarget,
    method: Arc<ServiceMethod>,
}

impl CanisterMethod {
    pub(crate) fn new(
        agent: Arc<dyn Agent>,
        codec: Arc<dyn ArgumentCodec>,
        target: CallTarget,
        method: Arc<ServiceMethod>,
    ) -> Self {
        Self {
            agent,
            codec,
            target,
            method,
        }
    }

    /// Declared method name.
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Number of declared positional arguments.
    pub fn arg_count(&self) -> usize {
        self.method.arg_types.len()
    }

    /// The method's annotation, fixed for the lifetime of the binding.
    pub fn annotation(&self) -> Option<MethodAnnotation> {
        self.method.annotation
    }

    /// Which agent primitive this method dispatches to.
    pub fn call_mode(&self) -> CallMode {
        self.method.call_mode()
    }

    /// Invoke the remote method, blocking until the reply arrives.
    pub fn invoke(&self, args: &[Value]) -> Result<CallResult> {
        self.invoke_with_options(args, CallOptions::default())
    }

    /// Invoke with explicit options. Options are reserved and currently inert.
    pub fn invoke_with_options(&self, args: &[Value], _options: CallOptions) -> Result<CallResult> {
        let call = prepare(self.codec.as_ref(), self.target, &self.method, args)?;
        let canister_id = self.target.canister_id();

        tracing::debug!(
            method = %self.method.name,
            mode = %self.method.call_mode(),
            "dispatching blocking canister call"
        );
        let reply = match self.method.call_mode() {
            CallMode::Query => self.agent.query(
                &canister_id,
                &self.method.name,
                call.payload,
                &self.method.ret_types,
                &call.effective_canister_id,
            )?,
            CallMode::Update => self.agent.update(
                &canister_id,
                &self.method.name,
                call.payload,
                &self.method.ret_types,
                &call.effective_canister_id,
            )?,
        };

        Ok(unwrap_reply(reply))
    }
}

/// Suspending call adaptor for one declared method.
///
/// Identical contract to [`CanisterMethod`]; the only difference is that it
/// suspends at the agent boundary instead of blocking the calling thread.
pub struct CanisterMethodAsync {
    agent: Arc<dyn Agent>,
    codec: Arc<dyn ArgumentCodec>,
    target: CallTarget,
    method: Arc<ServiceMethod>,
}

impl CanisterMethodAsync {
    pub(crate) fn new(
        agent: Arc<dyn Agent>,
        codec: Arc<dyn ArgumentCodec>,
        target: CallTarget,
        method: Arc<ServiceMethod>,
    ) -> Self {
        Self {
            agent,
            codec,
            target,
            method,
        }
    }

    /// Declared method name.
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Number of declared positional arguments.
    pub fn arg_count(&self) -> usize {
        self.method.arg_types.len()
    }

    /// The method's annotation, fixed for the lifetime of the binding.
    pub fn annotation(&self) -> Option<MethodAnnotation> {
        self.method.annotation
    }

    /// Which agent primitive this method dispatches to.
    pub fn call_mode(&self) -> CallMode {
        self.method.call_mode()
    }

    /// Invoke the remote method, suspending at the agent boundary.
    pub async fn invoke(&self, args: &[Value]) -> Result<CallResult> {
        self.invoke_with_options(args, CallOptions::default()).await
    }

    /// Invoke with explicit options. Options are reserved and currently inert.
    pub async fn invoke_with_options(
        &self,
        args: &[Value],
        _options: CallOptions,
    ) -> Result<CallResult> {
        let call = prepare(self.codec.as_ref(), self.target, &self.method, args)?;
        let canister_id = self.target.canister_id();

        tracing::debug!(
            method = %self.method.name,
            mode = %self.method.call_mode(),
            "dispatching suspending canister call"
        );
        let reply = match self.method.call_mode() {
            CallMode::Query => {
                self.agent
                    .query_async(
                        &canister_id,
                        &self.method.name,
                        call.payload,
                        &self.method.ret_types,
                        &call.effective_canister_id,
                    )
                    .await?
            }
            CallMode::Update => {
                self.agent
                    .update_async(
                        &canister_id,
                        &self.method.name,
                        call.payload,
                        &self.method.ret_types,
                        &call.effective_canister_id,
                    )
                    .await?
            }
        };

        Ok(unwrap_reply(reply))
    }
}
