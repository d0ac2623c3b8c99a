//! Tracing-based observability hooks for the tool runtime.
//!
//! ```rust
//! use aobserve::TracingObservabilityHooks;
//! use atooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use acommon::InvocationContext;
use amodel::{FunctionCall, FunctionResponse, ToolError};
use atooling::ToolRuntimeHooks;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, call: &FunctionCall, ctx: &InvocationContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = call.name,
            function_call_id = call.id.as_deref(),
            session_id = %ctx.session_id,
            invocation_id = %ctx.invocation_id,
            arg_count = call.args.len()
        );
    }

    fn on_execution_success(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        response: &FunctionResponse,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = call.name,
            function_call_id = call.id.as_deref(),
            session_id = %ctx.session_id,
            invocation_id = %ctx.invocation_id,
            response_fields = response.response.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let path = error.path.as_ref().map(ToString::to_string);
        if error.is_user_error() {
            tracing::warn!(
                phase = "tool",
                event = "execution_failure",
                tool_name = call.name,
                function_call_id = call.id.as_deref(),
                session_id = %ctx.session_id,
                invocation_id = %ctx.invocation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error_path = path.as_deref(),
                retryable = error.retryable,
                error = %error
            );
        } else {
            tracing::error!(
                phase = "tool",
                event = "execution_failure",
                tool_name = call.name,
                function_call_id = call.id.as_deref(),
                session_id = %ctx.session_id,
                invocation_id = %ctx.invocation_id,
                elapsed_ms = elapsed.as_millis() as u64,
                error_kind = ?error.kind,
                error_path = path.as_deref(),
                retryable = error.retryable,
                error = %error
            );
        }
    }
}
