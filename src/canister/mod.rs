//! Proxy binder and the bound canister object.
//!
//! The [`CanisterBuilder`] provides a fluent API for supplying the agent,
//! codec, parser, and (optionally) the interface description, then building
//! the proxy. [`CanisterBuilder::bind`] and [`CanisterBuilder::bind_async`]
//! follow the same lifecycle:
//! 1. Obtain the interface description (supplied, or discovered)
//! 2. Parse it into a service model
//! 3. Synthesize one blocking and one suspending adaptor per method
//!
//! # Example
//!
//! ```ignore
//! use canister_client::{Canister, Value};
//!
//! let canister = Canister::builder(agent, canister_id)
//!     .codec(codec)
//!     .parser(parser)
//!     .bind()?;
//!
//! let reply = canister.call("greet", &[Value::text("world")])?;
//! let reply = canister.call_async("greet_async", &[Value::text("world")]).await?;
//! ```

mod discovery;
mod method;

pub use discovery::INTROSPECTION_METHOD;
pub use method::{CallOptions, CallResult, CanisterMethod, CanisterMethodAsync};

use std::collections::HashMap;
use std::sync::Arc;

use candid::Principal;

use crate::agent::Agent;
use crate::codec::ArgumentCodec;
use crate::error::{CanisterError, Result};
use crate::idl::Value;
use crate::model::{InterfaceParser, ServiceModel};
use method::CallTarget;

/// Suffix under which each method's suspending adaptor is bound.
pub const ASYNC_SUFFIX: &str = "_async";

/// One named binding on a bound canister.
pub enum MethodBinding {
    /// Bound under the method's own name.
    Blocking(CanisterMethod),
    /// Bound under the method's name suffixed [`ASYNC_SUFFIX`].
    Suspending(CanisterMethodAsync),
}

impl MethodBinding {
    /// Declared name of the underlying method (without any suffix).
    pub fn method_name(&self) -> &str {
        match self {
            MethodBinding::Blocking(method) => method.name(),
            MethodBinding::Suspending(method) => method.name(),
        }
    }

    /// The blocking adaptor, if this binding is one.
    pub fn as_blocking(&self) -> Option<&CanisterMethod> {
        match self {
            MethodBinding::Blocking(method) => Some(method),
            MethodBinding::Suspending(_) => None,
        }
    }

    /// The suspending adaptor, if this binding is one.
    pub fn as_suspending(&self) -> Option<&CanisterMethodAsync> {
        match self {
            MethodBinding::Blocking(_) => None,
            MethodBinding::Suspending(method) => Some(method),
        }
    }
}

/// A bound canister proxy.
///
/// Holds one [`MethodBinding`] per synthesized name. Read-only after
/// construction; safe to share across any number of concurrent callers.
pub struct Canister {
    canister_id: Principal,
    model: ServiceModel,
    bindings: HashMap<String, MethodBinding>,
    binding_order: Vec<String>,
}

impl std::fmt::Debug for Canister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canister")
            .field("canister_id", &self.canister_id)
            .field("bindings", &self.binding_order)
            .finish()
    }
}

impl Canister {
    /// Start configuring a proxy for the given target.
    pub fn builder(agent: Arc<dyn Agent>, canister_id: Principal) -> CanisterBuilder {
        CanisterBuilder::new(agent, canister_id)
    }

    /// The target principal this proxy routes calls to.
    pub fn canister_id(&self) -> Principal {
        self.canister_id
    }

    /// The parsed service model this proxy was synthesized from.
    pub fn interface(&self) -> &ServiceModel {
        &self.model
    }

    /// Look up a binding by its exposed name.
    pub fn method(&self, name: &str) -> Option<&MethodBinding> {
        self.bindings.get(name)
    }

    /// Exposed binding names, in synthesis order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.binding_order.iter().map(String::as_str)
    }

    /// Number of exposed bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Invoke a blocking binding by name.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<CallResult> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| CanisterError::MethodNotFound(name.to_string()))?;
        match binding.as_blocking() {
            Some(method) => method.invoke(args),
            None => Err(CanisterError::BindingMismatch {
                name: name.to_string(),
                expected: "blocking",
            }),
        }
    }

    /// Invoke a suspending binding by name.
    pub async fn call_async(&self, name: &str, args: &[Value]) -> Result<CallResult> {
        let binding = self
            .bindings
            .get(name)
            .ok_or_else(|| CanisterError::MethodNotFound(name.to_string()))?;
        match binding.as_suspending() {
            Some(method) => method.invoke(args).await,
            None => Err(CanisterError::BindingMismatch {
                name: name.to_string(),
                expected: "asynchronous",
            }),
        }
    }
}

/// Builder for configuring and binding a [`Canister`] proxy.
///
/// The agent and target are fixed up front; the codec and parser are
/// required before binding. When no interface description is supplied,
/// binding discovers one through the agent.
pub struct CanisterBuilder {
    agent: Arc<dyn Agent>,
    canister_id: Principal,
    codec: Option<Arc<dyn ArgumentCodec>>,
    parser: Option<Arc<dyn InterfaceParser>>,
    interface: Option<String>,
}

impl CanisterBuilder {
    /// Create a builder for the given agent and target.
    pub fn new(agent: Arc<dyn Agent>, canister_id: Principal) -> Self {
        Self {
            agent,
            canister_id,
            codec: None,
            parser: None,
            interface: None,
        }
    }

    /// Supply the argument codec.
    pub fn codec(mut self, codec: Arc<dyn ArgumentCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Supply the interface-description parser.
    pub fn parser(mut self, parser: Arc<dyn InterfaceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Supply a known interface description, skipping discovery.
    pub fn interface(mut self, description: impl Into<String>) -> Self {
        self.interface = Some(description.into());
        self
    }

    /// Bind the proxy, blocking for discovery if one is needed.
    pub fn bind(self) -> Result<Canister> {
        let (codec, parser) = self.collaborators()?;
        let description = match self.interface {
            Some(description) => description,
            None => discovery::fetch_interface(
                self.agent.as_ref(),
                codec.as_ref(),
                &self.canister_id,
            )?,
        };
        assemble(self.agent, codec, parser, self.canister_id, &description)
    }

    /// Bind the proxy, suspending for discovery if one is needed.
    pub async fn bind_async(self) -> Result<Canister> {
        let (codec, parser) = self.collaborators()?;
        let description = match self.interface {
            Some(description) => description,
            None => {
                discovery::fetch_interface_async(
                    self.agent.as_ref(),
                    codec.as_ref(),
                    &self.canister_id,
                )
                .await?
            }
        };
        assemble(self.agent, codec, parser, self.canister_id, &description)
    }

    fn collaborators(&self) -> Result<(Arc<dyn ArgumentCodec>, Arc<dyn InterfaceParser>)> {
        let codec = self
            .codec
            .clone()
            .ok_or(CanisterError::BuilderIncomplete("an argument codec"))?;
        let parser = self
            .parser
            .clone()
            .ok_or(CanisterError::BuilderIncomplete("an interface parser"))?;
        Ok((codec, parser))
    }
}

/// Parse the description and synthesize both adaptors per declared method.
fn assemble(
    agent: Arc<dyn Agent>,
    codec: Arc<dyn ArgumentCodec>,
    parser: Arc<dyn InterfaceParser>,
    canister_id: Principal,
    description: &str,
) -> Result<Canister> {
    let model = parser.parse(description)?;
    let target = CallTarget::classify(canister_id);

    let mut bindings = HashMap::with_capacity(model.len() * 2);
    let mut binding_order = Vec::with_capacity(model.len() * 2);
    for method in model.methods() {
        tracing::debug!(
            method = %method.name,
            mode = %method.call_mode(),
            "synthesizing canister bindings"
        );
        bind_entry(
            &mut bindings,
            &mut binding_order,
            method.name.clone(),
            MethodBinding::Blocking(CanisterMethod::new(
                agent.clone(),
                codec.clone(),
                target,
                method.clone(),
            )),
        );
        bind_entry(
            &mut bindings,
            &mut binding_order,
            format!("{}{ASYNC_SUFFIX}", method.name),
            MethodBinding::Suspending(CanisterMethodAsync::new(
                agent.clone(),
                codec.clone(),
                target,
                method.clone(),
            )),
        );
    }

    Ok(Canister {
        canister_id,
        model,
        bindings,
        binding_order,
    })
}

/// Insert one binding; a name collision keeps the later binding, matching
/// the interface language's last-declaration-wins semantics.
fn bind_entry(
    bindings: &mut HashMap<String, MethodBinding>,
    binding_order: &mut Vec<String>,
    name: String,
    binding: MethodBinding,
) {
    if bindings.insert(name.clone(), binding).is_some() {
        tracing::debug!(binding = %name, "duplicate binding name, keeping the later one");
    } else {
        binding_order.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentReply, StatePath};
    use crate::idl::{TypeDescriptor, TypedValue};
    use crate::model::{MethodAnnotation, ServiceMethod};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    /// Agent fake: answers the introspection query with a fixed description
    /// and every method call with a fixed reply, recording primitives used.
    struct FakeAgent {
        description: Option<String>,
        reply: AgentReply,
        primitives: Mutex<Vec<&'static str>>,
    }

    impl FakeAgent {
        fn new(description: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                description: description.map(str::to_string),
                reply: AgentReply::Value(Value::text("pong")),
                primitives: Mutex::new(Vec::new()),
            })
        }

        fn answer(&self, primitive: &'static str, method_name: &str) -> Result<AgentReply> {
            self.primitives.lock().unwrap().push(primitive);
            if method_name == INTROSPECTION_METHOD {
                return match &self.description {
                    Some(description) => Ok(AgentReply::Value(Value::text(description.clone()))),
                    None => Err(CanisterError::agent("no introspection")),
                };
            }
            Ok(self.reply.clone())
        }
    }

    #[async_trait]
    impl Agent for FakeAgent {
        fn query(
            &self,
            _canister_id: &Principal,
            method_name: &str,
            _args: Bytes,
            _ret_types: &[TypeDescriptor],
            _effective_canister_id: &Principal,
        ) -> Result<AgentReply> {
            self.answer("query", method_name)
        }

        fn update(
            &self,
            _canister_id: &Principal,
            method_name: &str,
            _args: Bytes,
            _ret_types: &[TypeDescriptor],
            _effective_canister_id: &Principal,
        ) -> Result<AgentReply> {
            self.answer("update", method_name)
        }

        async fn query_async(
            &self,
            _canister_id: &Principal,
            method_name: &str,
            _args: Bytes,
            _ret_types: &[TypeDescriptor],
            _effective_canister_id: &Principal,
        ) -> Result<AgentReply> {
            self.answer("query_async", method_name)
        }

        async fn update_async(
            &self,
            _canister_id: &Principal,
            method_name: &str,
            _args: Bytes,
            _ret_types: &[TypeDescriptor],
            _effective_canister_id: &Principal,
        ) -> Result<AgentReply> {
            self.answer("update_async", method_name)
        }

        fn read_state(&self, _canister_id: &Principal, _paths: &[StatePath]) -> Result<Vec<u8>> {
            Err(CanisterError::agent("no certified metadata"))
        }

        async fn read_state_async(
            &self,
            _canister_id: &Principal,
            _paths: &[StatePath],
        ) -> Result<Vec<u8>> {
            Err(CanisterError::agent("no certified metadata"))
        }
    }

    struct CountingCodec;

    impl ArgumentCodec for CountingCodec {
        fn encode(&self, args: &[TypedValue]) -> Result<Bytes> {
            Ok(Bytes::from(vec![args.len() as u8]))
        }

        fn decode(&self, _bytes: &[u8], _expected: &[TypeDescriptor]) -> Result<Vec<TypedValue>> {
            Ok(Vec::new())
        }
    }

    /// Parser fake that returns a prebuilt model for any description.
    struct FixedParser(ServiceModel);

    impl InterfaceParser for FixedParser {
        fn parse(&self, _description: &str) -> Result<ServiceModel> {
            Ok(self.0.clone())
        }
    }

    fn greet_add_model() -> ServiceModel {
        let mut model = ServiceModel::new();
        model.insert(ServiceMethod::new(
            "greet",
            [TypeDescriptor::new("text")],
            [TypeDescriptor::new("text")],
            Some(MethodAnnotation::Query),
        ));
        model.insert(ServiceMethod::new(
            "add",
            [TypeDescriptor::new("nat64")],
            [TypeDescriptor::new("nat64")],
            None,
        ));
        model
    }

    fn canister_id() -> Principal {
        Principal::from_slice(&[5, 5, 5])
    }

    fn bound(model: ServiceModel) -> Canister {
        Canister::builder(FakeAgent::new(None), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(model)))
            .interface("service : {}")
            .bind()
            .unwrap()
    }

    #[test]
    fn test_synthesis_exposes_exactly_four_callables() {
        let canister = bound(greet_add_model());

        assert_eq!(canister.binding_count(), 4);
        let names: Vec<&str> = canister.method_names().collect();
        assert_eq!(names, ["greet", "greet_async", "add", "add_async"]);

        assert!(canister.method("greet").unwrap().as_blocking().is_some());
        assert!(canister
            .method("greet_async")
            .unwrap()
            .as_suspending()
            .is_some());
        assert!(canister.method("add").unwrap().as_blocking().is_some());
        assert!(canister
            .method("add_async")
            .unwrap()
            .as_suspending()
            .is_some());
        assert!(canister.method("remove").is_none());
    }

    #[test]
    fn test_supplied_interface_skips_discovery() {
        let agent = FakeAgent::new(None);
        Canister::builder(agent.clone(), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(greet_add_model())))
            .interface("service : {}")
            .bind()
            .unwrap();

        assert!(agent.primitives.lock().unwrap().is_empty());
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let err = Canister::builder(FakeAgent::new(None), canister_id())
            .parser(Arc::new(FixedParser(greet_add_model())))
            .bind()
            .unwrap_err();
        assert!(matches!(err, CanisterError::BuilderIncomplete(_)));

        let err = Canister::builder(FakeAgent::new(None), canister_id())
            .codec(Arc::new(CountingCodec))
            .bind()
            .unwrap_err();
        assert!(matches!(err, CanisterError::BuilderIncomplete(_)));
    }

    #[test]
    fn test_bind_discovers_interface_when_none_supplied() {
        let agent = FakeAgent::new(Some("service : { greet : (text) -> (text) }"));
        let canister = Canister::builder(agent.clone(), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(greet_add_model())))
            .bind()
            .unwrap();

        assert_eq!(canister.binding_count(), 4);
        assert_eq!(agent.primitives.lock().unwrap().as_slice(), ["query"]);
    }

    #[test]
    fn test_bind_fails_when_no_interface_available() {
        let err = Canister::builder(FakeAgent::new(None), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(greet_add_model())))
            .bind()
            .unwrap_err();

        assert!(matches!(err, CanisterError::InterfaceUnavailable { .. }));
    }

    #[test]
    fn test_call_dispatches_by_annotation() {
        let agent = FakeAgent::new(None);
        let canister = Canister::builder(agent.clone(), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(greet_add_model())))
            .interface("service : {}")
            .bind()
            .unwrap();

        canister.call("greet", &[Value::text("world")]).unwrap();
        canister.call("add", &[Value::Nat(1)]).unwrap();

        assert_eq!(
            agent.primitives.lock().unwrap().as_slice(),
            ["query", "update"]
        );
    }

    #[test]
    fn test_call_errors() {
        let canister = bound(greet_add_model());

        assert!(matches!(
            canister.call("missing", &[]).unwrap_err(),
            CanisterError::MethodNotFound(_)
        ));
        assert!(matches!(
            canister.call("greet_async", &[Value::text("x")]).unwrap_err(),
            CanisterError::BindingMismatch {
                expected: "blocking",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_call_async_dispatches_suspending_primitives() {
        let agent = FakeAgent::new(None);
        let canister = Canister::builder(agent.clone(), canister_id())
            .codec(Arc::new(CountingCodec))
            .parser(Arc::new(FixedParser(greet_add_model())))
            .interface("service : {}")
            .bind()
            .unwrap();

        canister
            .call_async("greet_async", &[Value::text("world")])
            .await
            .unwrap();
        canister.call_async("add_async", &[Value::Nat(1)]).await.unwrap();

        assert_eq!(
            agent.primitives.lock().unwrap().as_slice(),
            ["query_async", "update_async"]
        );

        let err = canister
            .call_async("greet", &[Value::text("world")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CanisterError::BindingMismatch {
                expected: "asynchronous",
                ..
            }
        ));
    }

    #[test]
    fn test_binding_name_collision_keeps_later_binding() {
        // A declared method named `greet_async` collides with the suspending
        // binding synthesized for `greet`.
        let mut model = ServiceModel::new();
        model.insert(ServiceMethod::new(
            "greet",
            [TypeDescriptor::new("text")],
            [TypeDescriptor::new("text")],
            Some(MethodAnnotation::Query),
        ));
        model.insert(ServiceMethod::new(
            "greet_async",
            [TypeDescriptor::new("nat64")],
            [],
            None,
        ));

        let canister = bound(model);

        // greet, greet_async, greet_async_async - the blocking binding of the
        // later `greet_async` method replaced the suspending one of `greet`.
        assert_eq!(canister.binding_count(), 3);
        let binding = canister.method("greet_async").unwrap();
        assert!(binding.as_blocking().is_some());
        assert_eq!(binding.method_name(), "greet_async");
        assert!(canister
            .method("greet_async_async")
            .unwrap()
            .as_suspending()
            .is_some());
    }

    #[test]
    fn test_interface_accessor_retains_model() {
        let canister = bound(greet_add_model());
        assert_eq!(canister.interface().len(), 2);
        assert_eq!(canister.canister_id(), canister_id());
        assert_eq!(
            canister.interface().get("greet").unwrap().annotation,
            Some(MethodAnnotation::Query)
        );
    }
}
