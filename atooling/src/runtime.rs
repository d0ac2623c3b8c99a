//! Tool runtime trait and the default executor that dispatches model function
//! calls against the tools registered on a request.

use std::pin::pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use acommon::InvocationContext;
use amodel::{FunctionCall, FunctionResponse, LlmRequest, ToolContext, ToolError, ToolFuture};
use futures_timer::Delay;
use futures_util::future::{Either, select};

use crate::{NoopToolRuntimeHooks, ToolRuntimeHooks};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        request: &'a LlmRequest,
        call: FunctionCall,
    ) -> ToolFuture<'a, Result<FunctionResponse, ToolError>>;
}

/// Execution limits applied to every call the runtime dispatches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunPolicy {
    pub timeout: Option<Duration>,
}

impl RunPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    policy: RunPolicy,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultToolRuntime {
    pub fn new() -> Self {
        Self {
            policy: RunPolicy::default(),
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    async fn dispatch(
        &self,
        ctx: &InvocationContext,
        request: &LlmRequest,
        call: &FunctionCall,
    ) -> Result<FunctionResponse, ToolError> {
        let tool = request.tool(&call.name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", call.name))
        })?;

        let tool_ctx = call
            .id
            .as_deref()
            .map(ToolContext::for_call)
            .unwrap_or_default();
        let run = tool.run(ctx, &tool_ctx, call.args.clone());

        let output = match self.policy.timeout {
            None => run.await?,
            Some(timeout) => match select(run, pin!(Delay::new(timeout))).await {
                Either::Left((output, _)) => output?,
                Either::Right(((), _)) => {
                    return Err(ToolError::timeout(format!(
                        "tool did not finish within {timeout:?}"
                    )));
                }
            },
        };

        Ok(FunctionResponse {
            id: call.id.clone(),
            name: call.name.clone(),
            response: output,
        })
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        request: &'a LlmRequest,
        call: FunctionCall,
    ) -> ToolFuture<'a, Result<FunctionResponse, ToolError>> {
        Box::pin(async move {
            let started = Instant::now();
            self.hooks.on_execution_start(&call, ctx);

            let result = self
                .dispatch(ctx, request, &call)
                .await
                .map_err(|error| annotate(error, &call));

            let elapsed = started.elapsed();
            match &result {
                Ok(response) => self
                    .hooks
                    .on_execution_success(&call, ctx, response, elapsed),
                Err(error) => self.hooks.on_execution_failure(&call, ctx, error, elapsed),
            }

            result
        })
    }
}

/// Function response reporting `error` back to the model in place of a result.
pub fn failure_response(call: &FunctionCall, error: &ToolError) -> FunctionResponse {
    FunctionResponse {
        id: call.id.clone(),
        name: call.name.clone(),
        response: error.to_document(),
    }
}

fn annotate(mut error: ToolError, call: &FunctionCall) -> ToolError {
    if error.tool_name.is_none() {
        error = error.with_tool_name(&call.name);
    }
    if let Some(id) = &call.id
        && error.function_call_id.is_none()
    {
        error = error.with_function_call_id(id);
    }
    error
}
