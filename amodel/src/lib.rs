//! Model-facing request, response, and tool capability contracts.

mod config;
mod content;
mod error;
mod model;
mod request;
mod stream;
mod tool;

pub mod prelude;

pub use aschema::Document;
pub use config::GenerateConfig;
pub use content::{Content, FunctionCall, FunctionDeclaration, FunctionResponse, Part, Role};
pub use error::{
    ModelError, ModelErrorKind, RequestError, RequestErrorKind, ToolError, ToolErrorKind,
};
pub use model::Model;
pub use request::LlmRequest;
pub use stream::{LlmResponse, ResponseStream};
pub use tool::{Tool, ToolContext, ToolFuture};
