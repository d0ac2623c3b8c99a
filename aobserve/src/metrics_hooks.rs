//! Metrics-based observability hooks for the tool runtime.
//!
//! ```rust
//! use aobserve::MetricsObservabilityHooks;
//! use atooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use acommon::InvocationContext;
use amodel::{FunctionCall, FunctionResponse, ToolError};
use atooling::ToolRuntimeHooks;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, call: &FunctionCall, _ctx: &InvocationContext) {
        metrics::counter!(
            "adjutant_tool_execution_start_total",
            "tool_name" => call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        call: &FunctionCall,
        _ctx: &InvocationContext,
        _response: &FunctionResponse,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "adjutant_tool_execution_success_total",
            "tool_name" => call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "adjutant_tool_execution_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        call: &FunctionCall,
        _ctx: &InvocationContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "adjutant_tool_execution_failure_total",
            "tool_name" => call.name.clone(),
            "error_kind" => format!("{:?}", error.kind),
            "retryable" => error.retryable.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "adjutant_tool_execution_duration_seconds",
            "tool_name" => call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
