//! Common imports for most adjutant applications.

pub use crate::{adj_content, adj_contents};
pub use crate::{
    collect_turn, dispatch_calls, function_call_content, model_content, register_tools,
    system_content, user_content,
};
pub use crate::{
    BoxFuture, CancellationToken, Content, DefaultToolRuntime, Document, FunctionCall,
    FunctionResponse, FunctionTool, FunctionToolConfig, GenerateConfig, InvocationContext,
    JsonSchema, LlmRequest, LlmResponse, Model, ModelError, Part, RequestError, ResponseStream,
    Role, RunPolicy, SafeToolHooks, Tool, ToolContext, ToolError, ToolErrorKind, ToolRuntime,
    TracingObservabilityHooks,
};
