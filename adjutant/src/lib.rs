//! Unified facade over the adjutant workspace crates.
//!
//! This crate is designed to be the single dependency for most applications.
//! It re-exports the schema, model, tooling, and observability crates and
//! provides helpers for registering tools and answering a turn's function calls.

mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use acommon;
pub use amodel;
pub use aobserve;
pub use aschema;
pub use atooling;

pub use acommon::{
    BoxFuture, CancellationToken, InvocationContext, InvocationId, MetadataMap, SessionId,
};
pub use amodel::{
    Content, Document, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateConfig,
    LlmRequest, LlmResponse, Model, ModelError, ModelErrorKind, Part, RequestError,
    RequestErrorKind, ResponseStream, Role, Tool, ToolContext, ToolError, ToolErrorKind,
    ToolFuture,
};
pub use aobserve::{
    FanoutToolHooks, MetricsObservabilityHooks, SafeToolHooks, TracingObservabilityHooks,
};
pub use aschema::{
    ConversionError, FieldPath, JsonSchema, ResolvedSchema, Schema, SchemaError,
    SchemaErrorKind, json_schema,
};
pub use atooling::{
    DefaultToolRuntime, FunctionTool, FunctionToolConfig, NoopToolRuntimeHooks, RunPolicy,
    ToolRuntime, ToolRuntimeHooks, failure_response,
};

pub use runtime::{collect_turn, dispatch_calls, register_tools};
pub use util::{function_call_content, model_content, system_content, user_content};
