//! Runtime hooks for tool execution lifecycle events.
//!
//! ```rust
//! use atooling::{NoopToolRuntimeHooks, ToolRuntimeHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = NoopToolRuntimeHooks;
//! assert_hooks_trait(&hooks);
//! ```

use std::time::Duration;

use acommon::InvocationContext;
use amodel::{FunctionCall, FunctionResponse, ToolError};

pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _call: &FunctionCall, _ctx: &InvocationContext) {}

    fn on_execution_success(
        &self,
        _call: &FunctionCall,
        _ctx: &InvocationContext,
        _response: &FunctionResponse,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _call: &FunctionCall,
        _ctx: &InvocationContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
