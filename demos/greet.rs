//! Greet proxy - minimal bind-and-call walkthrough.
//!
//! This demo demonstrates:
//! - Implementing the three collaborator seams with in-memory stand-ins
//! - Binding a proxy from a supplied interface description
//! - Invoking a blocking binding and unwrapping its reply
//!
//! A real deployment would wire in an HTTP agent and candid codec/parser
//! instead of the stubs below.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use canister_client::agent::StatePath;
use canister_client::codec::ArgumentCodec;
use canister_client::{
    Agent, AgentReply, Canister, CanisterError, InterfaceParser, MethodAnnotation, Principal,
    Result, ServiceMethod, ServiceModel, TypeDescriptor, TypedValue, Value,
};

/// Agent stub that answers every call with a fixed greeting.
struct GreetingAgent;

#[async_trait]
impl Agent for GreetingAgent {
    fn query(
        &self,
        _canister_id: &Principal,
        method_name: &str,
        _args: Bytes,
        _ret_types: &[TypeDescriptor],
        _effective_canister_id: &Principal,
    ) -> Result<AgentReply> {
        Ok(AgentReply::Value(Value::text(format!(
            "reply from `{method_name}`"
        ))))
    }

    fn update(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply> {
        self.query(
            canister_id,
            method_name,
            args,
            ret_types,
            effective_canister_id,
        )
    }

    async fn query_async(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply> {
        self.query(
            canister_id,
            method_name,
            args,
            ret_types,
            effective_canister_id,
        )
    }

    async fn update_async(
        &self,
        canister_id: &Principal,
        method_name: &str,
        args: Bytes,
        ret_types: &[TypeDescriptor],
        effective_canister_id: &Principal,
    ) -> Result<AgentReply> {
        self.query(
            canister_id,
            method_name,
            args,
            ret_types,
            effective_canister_id,
        )
    }

    fn read_state(&self, _canister_id: &Principal, _paths: &[StatePath]) -> Result<Vec<u8>> {
        Err(CanisterError::agent("no certified state in this demo"))
    }

    async fn read_state_async(
        &self,
        _canister_id: &Principal,
        _paths: &[StatePath],
    ) -> Result<Vec<u8>> {
        Err(CanisterError::agent("no certified state in this demo"))
    }
}

/// Codec stub: the payload is just the argument count.
struct CountCodec;

impl ArgumentCodec for CountCodec {
    fn encode(&self, args: &[TypedValue]) -> Result<Bytes> {
        Ok(Bytes::from(vec![args.len() as u8]))
    }

    fn decode(&self, _bytes: &[u8], _expected: &[TypeDescriptor]) -> Result<Vec<TypedValue>> {
        Ok(Vec::new())
    }
}

/// Parser stub declaring one query method, ignoring the description text.
struct GreetParser;

impl InterfaceParser for GreetParser {
    fn parse(&self, _description: &str) -> Result<ServiceModel> {
        let mut model = ServiceModel::new();
        model.insert(ServiceMethod::new(
            "greet",
            [TypeDescriptor::new("text")],
            [TypeDescriptor::new("text")],
            Some(MethodAnnotation::Query),
        ));
        Ok(model)
    }
}

fn main() -> Result<()> {
    let canister = Canister::builder(
        Arc::new(GreetingAgent),
        Principal::from_slice(&[0xde, 0xad, 0x01]),
    )
    .codec(Arc::new(CountCodec))
    .parser(Arc::new(GreetParser))
    .interface("service : { greet : (text) -> (text) query }")
    .bind()?;

    println!("bindings: {:?}", canister.method_names().collect::<Vec<_>>());

    let reply = canister.call("greet", &[Value::text("world")])?;
    println!("greet -> {reply:?}");

    Ok(())
}
