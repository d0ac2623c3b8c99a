use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use acommon::InvocationContext;
use amodel::{FunctionCall, FunctionResponse, ToolError};
use atooling::ToolRuntimeHooks;

/// Wraps user-supplied hooks so a panicking callback never unwinds into a tool run.
pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, call: &FunctionCall, ctx: &InvocationContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_execution_start(call, ctx)));
    }

    fn on_execution_success(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        response: &FunctionResponse,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(call, ctx, response, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_failure(call, ctx, error, elapsed)
        }));
    }
}

/// Forwards every callback to each wrapped hook in order.
#[derive(Default)]
pub struct FanoutToolHooks {
    hooks: Vec<Box<dyn ToolRuntimeHooks>>,
}

impl FanoutToolHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: impl ToolRuntimeHooks + 'static) -> Self {
        self.hooks.push(Box::new(hooks));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl ToolRuntimeHooks for FanoutToolHooks {
    fn on_execution_start(&self, call: &FunctionCall, ctx: &InvocationContext) {
        for hooks in &self.hooks {
            hooks.on_execution_start(call, ctx);
        }
    }

    fn on_execution_success(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        response: &FunctionResponse,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_execution_success(call, ctx, response, elapsed);
        }
    }

    fn on_execution_failure(
        &self,
        call: &FunctionCall,
        ctx: &InvocationContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_execution_failure(call, ctx, error, elapsed);
        }
    }
}
