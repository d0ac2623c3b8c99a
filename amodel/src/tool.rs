//! Tool capability contract shared by every tool kind.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use acommon::InvocationContext;
//! use amodel::{Document, LlmRequest, RequestError, Tool, ToolContext, ToolError, ToolFuture};
//!
//! struct Clock;
//!
//! impl Tool for Clock {
//!     fn name(&self) -> &str {
//!         "clock"
//!     }
//!
//!     fn description(&self) -> &str {
//!         "Reports a fixed time"
//!     }
//!
//!     fn process_request(
//!         self: Arc<Self>,
//!         _ctx: &InvocationContext,
//!         _tool_ctx: &ToolContext,
//!         request: &mut LlmRequest,
//!     ) -> Result<(), RequestError> {
//!         request.append_tools([self as Arc<dyn Tool>])
//!     }
//!
//!     fn run<'a>(
//!         &'a self,
//!         _ctx: &'a InvocationContext,
//!         _tool_ctx: &'a ToolContext,
//!         _args: Document,
//!     ) -> ToolFuture<'a, Result<Document, ToolError>> {
//!         Box::pin(async move {
//!             let mut output = Document::new();
//!             output.insert("time".to_string(), "12:00".into());
//!             Ok(output)
//!         })
//!     }
//! }
//!
//! let mut request = LlmRequest::new("model-a");
//! Arc::new(Clock)
//!     .process_request(
//!         &InvocationContext::new("session-1", "inv-1"),
//!         &ToolContext::default(),
//!         &mut request,
//!     )
//!     .expect("clock should register");
//!
//! // Tools without a declaration are dispatchable but not declared to the model.
//! assert!(request.tool("clock").is_some());
//! assert!(request.config().tools().is_empty());
//! ```

use std::sync::Arc;

use acommon::{BoxFuture, InvocationContext, MetadataMap};
use aschema::Document;

use crate::{FunctionDeclaration, LlmRequest, RequestError, ToolError};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Per-call context handed to a tool next to the invocation context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolContext {
    pub function_call_id: Option<String>,
    pub metadata: MetadataMap,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_call(function_call_id: impl Into<String>) -> Self {
        Self {
            function_call_id: Some(function_call_id.into()),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A named capability the model can call during a turn.
///
/// The name must be non-empty and stable for the tool's lifetime.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Model-facing declaration. Tool kinds that the model does not call as
    /// functions return `None` and are registered for dispatch only.
    fn declaration(&self) -> Option<FunctionDeclaration> {
        None
    }

    /// Registers this tool into `request`, typically through [`LlmRequest::append_tools`].
    fn process_request(
        self: Arc<Self>,
        ctx: &InvocationContext,
        tool_ctx: &ToolContext,
        request: &mut LlmRequest,
    ) -> Result<(), RequestError>;

    fn run<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        tool_ctx: &'a ToolContext,
        args: Document,
    ) -> ToolFuture<'a, Result<Document, ToolError>>;
}
