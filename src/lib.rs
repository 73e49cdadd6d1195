//! # canister-client
//!
//! Client-side proxy binder for Internet Computer canisters.
//!
//! Given an agent that can issue query and update calls, and a candid
//! interface description for a target canister, this crate produces a
//! [`Canister`] proxy exposing one callable binding per declared method in
//! two flavors: blocking (`m`) and suspending (`m_async`). Each binding
//! wraps positional arguments with their declared types, encodes them once,
//! selects query or update from the method's annotation, and unwraps the
//! typed reply back into plain values.
//!
//! ## Architecture
//!
//! - **Collaborator seams**: the [`Agent`](agent::Agent), the
//!   [`ArgumentCodec`](codec::ArgumentCodec), and the
//!   [`InterfaceParser`](model::InterfaceParser) are traits implemented by
//!   the caller; transport, binary layout, and grammar live behind them.
//! - **Binder**: [`CanisterBuilder`] obtains the interface description
//!   (supplied, or discovered via introspection with a certified-metadata
//!   fallback) and synthesizes the binding map.
//! - **Adaptors**: [`CanisterMethod`] and [`CanisterMethodAsync`] share one
//!   validation/marshaling/unwrapping routine and differ only at the agent
//!   boundary.
//!
//! ## Example
//!
//! ```ignore
//! use canister_client::{Canister, Value};
//!
//! let canister = Canister::builder(agent, canister_id)
//!     .codec(codec)
//!     .parser(parser)
//!     .bind()?;
//!
//! let greeting = canister.call("greet", &[Value::text("world")])?;
//! ```

pub mod agent;
pub mod canister;
pub mod codec;
pub mod error;
pub mod idl;
pub mod model;

pub use agent::{Agent, AgentReply};
pub use canister::{
    CallOptions, CallResult, Canister, CanisterBuilder, CanisterMethod, CanisterMethodAsync,
    MethodBinding, ASYNC_SUFFIX, INTROSPECTION_METHOD,
};
pub use error::{CanisterError, Result};
pub use idl::{TypeDescriptor, TypedValue, Value};
pub use model::{CallMode, InterfaceParser, MethodAnnotation, ServiceMethod, ServiceModel};

pub use candid::Principal;
