//! Error types for canister-client.

use thiserror::Error;

/// Boxed error carried across a collaborator boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all binder and call operations.
#[derive(Debug, Error)]
pub enum CanisterError {
    /// A required collaborator was not supplied to the builder.
    #[error("canister builder is missing {0}")]
    BuilderIncomplete(&'static str),

    /// Neither introspection nor the certified metadata read yielded an
    /// interface description.
    ///
    /// The metadata failure doubles as the chained `source()`; the
    /// introspection failure stays inspectable as a field.
    #[error("canister {canister_id} has no candid interface available")]
    InterfaceUnavailable {
        /// Textual principal of the canister that was probed.
        canister_id: String,
        /// Why the introspection query failed.
        introspection: Box<CanisterError>,
        /// Why the certified metadata read failed.
        #[source]
        metadata: Box<CanisterError>,
    },

    /// Caller supplied a different number of positional arguments than the
    /// method declares. Raised before any network interaction.
    #[error("argument count mismatch for method `{method}`: expected {expected}, got {got}")]
    ArgumentCount {
        /// Name of the invoked method.
        method: String,
        /// Declared argument count.
        expected: usize,
        /// Count the caller supplied.
        got: usize,
    },

    /// No binding exists under the given name.
    #[error("method `{0}` not found")]
    MethodNotFound(String),

    /// A blocking convenience was used on a suspending binding, or the other
    /// way around.
    #[error("method `{name}` is not bound for {expected} calls")]
    BindingMismatch {
        /// The binding name that was looked up.
        name: String,
        /// `"blocking"` or `"asynchronous"`.
        expected: &'static str,
    },

    /// A discovery reply had an unexpected shape.
    #[error("unexpected reply from canister: {0}")]
    UnexpectedReply(&'static str),

    /// Certified `candid:service` metadata bytes were not valid UTF-8.
    #[error("candid service metadata is not valid UTF-8")]
    MetadataNotText(#[from] std::string::FromUtf8Error),

    /// Interface-description parse failure, propagated from the parser.
    #[error("interface description parse failed")]
    Parse(#[source] BoxError),

    /// Argument encoding or result decoding failure, propagated from the codec.
    #[error("argument codec failed")]
    Codec(#[source] BoxError),

    /// Agent-layer failure (network, decode, certificate), propagated unchanged.
    #[error("agent call failed")]
    Agent(#[source] BoxError),
}

impl CanisterError {
    /// Wrap a parser failure.
    pub fn parse(source: impl Into<BoxError>) -> Self {
        CanisterError::Parse(source.into())
    }

    /// Wrap a codec failure.
    pub fn codec(source: impl Into<BoxError>) -> Self {
        CanisterError::Codec(source.into())
    }

    /// Wrap an agent failure.
    pub fn agent(source: impl Into<BoxError>) -> Self {
        CanisterError::Agent(source.into())
    }
}

/// Result type alias using CanisterError.
pub type Result<T> = std::result::Result<T, CanisterError>;
