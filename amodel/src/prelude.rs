//! Common `amodel` imports for downstream crates.

pub use crate::{
    Content, Document, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateConfig,
    LlmRequest, LlmResponse, Model, ModelError, ModelErrorKind, Part, RequestError,
    RequestErrorKind, ResponseStream, Role, Tool, ToolContext, ToolError, ToolErrorKind,
    ToolFuture,
};
pub use acommon::{BoxFuture, CancellationToken, InvocationContext};
