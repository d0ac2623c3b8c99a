//! Typed function adapter exposing a Rust function as a model-callable tool.
//!
//! ```rust
//! use acommon::InvocationContext;
//! use atooling::{FunctionTool, FunctionToolConfig};
//! use schemars::JsonSchema;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct AddArgs {
//!     a: i64,
//!     b: i64,
//! }
//!
//! #[derive(Serialize, JsonSchema)]
//! struct AddResult {
//!     sum: i64,
//! }
//!
//! let tool = FunctionTool::new_sync(
//!     FunctionToolConfig::new("add", "Adds two integers"),
//!     |_ctx: InvocationContext, args: AddArgs| AddResult { sum: args.a + args.b },
//! )
//! .expect("schemas should be inferred");
//!
//! let declaration = tool.function_declaration();
//! assert_eq!(declaration.name, "add");
//! assert!(declaration.parameters.is_some());
//! assert!(declaration.response.is_some());
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::pin::pin;
use std::sync::Arc;

use acommon::InvocationContext;
use amodel::{
    Document, FunctionDeclaration, LlmRequest, RequestError, Tool, ToolContext, ToolError,
    ToolFuture,
};
use aschema::{JsonSchema, ResolvedSchema, Schema, SchemaError, from_document, resolve_for, to_document};
use futures_util::FutureExt;
use futures_util::future::{Either, select};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Construction input of a [`FunctionTool`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionToolConfig {
    pub name: String,
    pub description: String,
    /// Replaces the schema inferred from the argument type. Used verbatim.
    pub input_schema: Option<Schema>,
    /// Replaces the schema inferred from the result type. Used verbatim.
    pub output_schema: Option<Schema>,
}

impl FunctionToolConfig {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            output_schema: None,
        }
    }

    pub fn with_input_schema(mut self, schema: Schema) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn with_output_schema(mut self, schema: Schema) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

type Handler<TArgs, TResults> =
    dyn Fn(InvocationContext, TArgs) -> ToolFuture<'static, TResults> + Send + Sync;

/// Wraps a handler of shape `(InvocationContext, TArgs) -> TResults`.
///
/// The handler cannot fail through a side channel: fallible functions encode
/// failure in `TResults`. Panics are caught and reported as execution errors.
pub struct FunctionTool<TArgs, TResults> {
    config: FunctionToolConfig,
    input_schema: Option<ResolvedSchema>,
    output_schema: Option<ResolvedSchema>,
    handler: Arc<Handler<TArgs, TResults>>,
}

impl<TArgs, TResults> FunctionTool<TArgs, TResults>
where
    TArgs: JsonSchema + DeserializeOwned + Send + 'static,
    TResults: JsonSchema + Serialize + Send + 'static,
{
    /// Resolves both schemas up front; any failure aborts construction.
    pub fn new<F, Fut>(config: FunctionToolConfig, handler: F) -> Result<Self, SchemaError>
    where
        F: Fn(InvocationContext, TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TResults> + Send + 'static,
    {
        let input_schema = resolve_for::<TArgs>(config.input_schema.as_ref())
            .map_err(|err| err.context("failed to resolve input schema"))?;
        let output_schema = resolve_for::<TResults>(config.output_schema.as_ref())
            .map_err(|err| err.context("failed to resolve output schema"))?;

        let handler: Arc<Handler<TArgs, TResults>> = Arc::new(
            move |ctx: InvocationContext, args: TArgs| -> ToolFuture<'static, TResults> {
                Box::pin(handler(ctx, args))
            },
        );

        Ok(Self {
            config,
            input_schema,
            output_schema,
            handler,
        })
    }

    /// Like [`FunctionTool::new`] for a synchronous handler.
    pub fn new_sync<F>(config: FunctionToolConfig, handler: F) -> Result<Self, SchemaError>
    where
        F: Fn(InvocationContext, TArgs) -> TResults + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(config, move |ctx, args| {
            let handler = Arc::clone(&handler);
            async move { handler(ctx, args) }
        })
    }
}

impl<TArgs, TResults> FunctionTool<TArgs, TResults> {
    pub fn config(&self) -> &FunctionToolConfig {
        &self.config
    }

    pub fn input_schema(&self) -> Option<&ResolvedSchema> {
        self.input_schema.as_ref()
    }

    pub fn output_schema(&self) -> Option<&ResolvedSchema> {
        self.output_schema.as_ref()
    }

    pub fn function_declaration(&self) -> FunctionDeclaration {
        let mut declaration = FunctionDeclaration::new(&self.config.name, &self.config.description);
        if let Some(schema) = &self.input_schema {
            declaration = declaration.with_parameters(schema.schema().clone());
        }
        if let Some(schema) = &self.output_schema {
            declaration = declaration.with_response(schema.schema().clone());
        }
        declaration
    }

    async fn invoke(&self, ctx: &InvocationContext, input: TArgs) -> Result<TResults, ToolError> {
        if ctx.is_cancelled() {
            return Err(ToolError::cancelled("invocation was cancelled before the tool ran"));
        }

        let call = catch_unwind(AssertUnwindSafe(|| (self.handler)(ctx.clone(), input)))
            .map_err(panic_error)?;
        let guarded = AssertUnwindSafe(call).catch_unwind();
        let cancelled = pin!(ctx.cancelled());

        match select(guarded, cancelled).await {
            Either::Left((Ok(output), _)) => Ok(output),
            Either::Left((Err(payload), _)) => Err(panic_error(payload)),
            Either::Right(((), _)) => Err(ToolError::cancelled("invocation was cancelled while the tool ran")),
        }
    }
}

impl<TArgs, TResults> Tool for FunctionTool<TArgs, TResults>
where
    TArgs: DeserializeOwned + Send + 'static,
    TResults: Serialize + Send + 'static,
{
    fn name(&self) -> &str {
        &self.config.name
    }

    fn description(&self) -> &str {
        &self.config.description
    }

    fn declaration(&self) -> Option<FunctionDeclaration> {
        Some(self.function_declaration())
    }

    fn process_request(
        self: Arc<Self>,
        _ctx: &InvocationContext,
        _tool_ctx: &ToolContext,
        request: &mut LlmRequest,
    ) -> Result<(), RequestError> {
        request.append_tools([self as Arc<dyn Tool>])
    }

    fn run<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        _tool_ctx: &'a ToolContext,
        args: Document,
    ) -> ToolFuture<'a, Result<Document, ToolError>> {
        Box::pin(async move {
            let input: TArgs = from_document(&args, self.input_schema.as_ref())?;
            let output = self.invoke(ctx, input).await?;
            to_document(&output, self.output_schema.as_ref())
                .map_err(ToolError::from_output_conversion)
        })
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> ToolError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    ToolError::execution(format!("tool handler panicked: {detail}"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use amodel::ToolErrorKind;
    use aschema::{SchemaErrorKind, json_schema};
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct AddArgs {
        #[serde(rename = "A")]
        a: i64,
        #[serde(rename = "B")]
        b: i64,
    }

    #[derive(Debug, Serialize, JsonSchema)]
    struct AddResult {
        #[serde(rename = "Sum")]
        sum: i64,
    }

    #[derive(Debug, Serialize, JsonSchema)]
    #[serde(tag = "status", rename_all = "snake_case")]
    enum Division {
        Ok { quotient: i64 },
        Failed { reason: String },
    }

    #[derive(Debug, Serialize, JsonSchema)]
    struct DivideResult {
        outcome: Division,
    }

    fn add_tool() -> FunctionTool<AddArgs, AddResult> {
        FunctionTool::new_sync(
            FunctionToolConfig::new("add", "Adds two integers"),
            |_ctx, args: AddArgs| AddResult { sum: args.a + args.b },
        )
        .expect("add tool should build")
    }

    fn document(value: Value) -> Document {
        value.as_object().cloned().expect("test value should be an object")
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new("session-1", "inv-1")
    }

    #[tokio::test]
    async fn add_returns_sum_document() {
        let tool = add_tool();

        let output = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": 2, "B": 3})))
            .await
            .expect("run should succeed");

        assert_eq!(output, document(json!({"Sum": 5})));
    }

    #[tokio::test]
    async fn missing_argument_fails_with_field_path() {
        let tool = add_tool();

        let error = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": 2})))
            .await
            .expect_err("run should fail");

        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert_eq!(error.path.map(|path| path.to_string()).as_deref(), Some("$.B"));
    }

    #[tokio::test]
    async fn mistyped_argument_is_not_coerced() {
        let tool = add_tool();

        let error = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": "2", "B": 3})))
            .await
            .expect_err("string should be rejected");

        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert!(error.message.contains("$.A"));
    }

    #[tokio::test]
    async fn whole_floats_and_out_of_range_integers_fail_at_the_field() {
        let tool = add_tool();

        for args in [
            json!({"A": 2.0, "B": 3}),
            json!({"A": 9_223_372_036_854_775_808u64, "B": 3}),
        ] {
            let error = tool
                .run(&ctx(), &ToolContext::new(), document(args))
                .await
                .expect_err("argument should not fit i64");

            assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
            assert_eq!(error.path.map(|path| path.to_string()).as_deref(), Some("$.A"));
        }
    }

    #[tokio::test]
    async fn handler_failures_travel_inside_the_result_type() {
        let tool = FunctionTool::new_sync(
            FunctionToolConfig::new("divide", "Integer division"),
            |_ctx, args: AddArgs| DivideResult {
                outcome: match args.a.checked_div(args.b) {
                    Some(quotient) => Division::Ok { quotient },
                    None => Division::Failed {
                        reason: "division by zero".to_string(),
                    },
                },
            },
        )
        .expect("divide tool should build");

        let output = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": 1, "B": 0})))
            .await
            .expect("business failure is still a successful run");

        assert_eq!(
            output,
            document(json!({"outcome": {"status": "failed", "reason": "division by zero"}}))
        );
    }

    #[tokio::test]
    async fn panicking_handler_becomes_execution_error() {
        let tool = FunctionTool::new_sync(
            FunctionToolConfig::new("explode", "Always panics"),
            |_ctx, _args: AddArgs| -> AddResult { panic!("kaboom") },
        )
        .expect("tool should build");

        let error = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": 1, "B": 1})))
            .await
            .expect_err("panic should be converted");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert!(error.message.contains("kaboom"));
    }

    #[tokio::test]
    async fn panicking_async_handler_becomes_execution_error() {
        let tool = FunctionTool::new(
            FunctionToolConfig::new("explode", "Panics after yielding"),
            |_ctx, args: AddArgs| async move {
                tokio::task::yield_now().await;
                if args.a > 0 {
                    panic!("late {}", args.a);
                }
                AddResult { sum: 0 }
            },
        )
        .expect("tool should build");

        let error = tool
            .run(&ctx(), &ToolContext::new(), document(json!({"A": 7, "B": 1})))
            .await
            .expect_err("panic should be converted");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert!(error.message.contains("late 7"));
    }

    #[tokio::test]
    async fn cancelling_mid_run_returns_cancellation_error() {
        let tool = FunctionTool::new(
            FunctionToolConfig::new("slow_add", "Adds slowly"),
            |_ctx, args: AddArgs| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                AddResult { sum: args.a + args.b }
            },
        )
        .expect("tool should build");

        let ctx = ctx();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let error = tokio::time::timeout(
            Duration::from_secs(5),
            tool.run(&ctx, &ToolContext::new(), document(json!({"A": 1, "B": 2}))),
        )
        .await
        .expect("run should return promptly")
        .expect_err("run should be cancelled");

        assert_eq!(error.kind, ToolErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn already_cancelled_context_skips_the_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let tool = FunctionTool::new_sync(
            FunctionToolConfig::new("count", "Counts calls"),
            move |_ctx, args: AddArgs| {
                counter.fetch_add(1, Ordering::SeqCst);
                AddResult { sum: args.a + args.b }
            },
        )
        .expect("tool should build");

        let ctx = ctx();
        ctx.cancel();
        let error = tool
            .run(&ctx, &ToolContext::new(), document(json!({"A": 1, "B": 2})))
            .await
            .expect_err("run should be cancelled");

        assert_eq!(error.kind, ToolErrorKind::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn mismatched_output_override_is_declared_verbatim() {
        let override_schema = json_schema!({
            "type": "object",
            "properties": {"unrelated": {"type": "string"}},
            "required": ["unrelated"]
        });

        let tool = FunctionTool::new_sync(
            FunctionToolConfig::new("add", "Adds two integers")
                .with_output_schema(override_schema.clone()),
            |_ctx, args: AddArgs| AddResult { sum: args.a + args.b },
        )
        .expect("override is not checked against the result type");

        let declaration = tool.function_declaration();
        assert_eq!(declaration.response, Some(override_schema));
    }

    #[test]
    fn scalar_argument_type_fails_construction() {
        let error = FunctionTool::new_sync(
            FunctionToolConfig::new("double", "Doubles a number"),
            |_ctx, value: i64| AddResult { sum: value * 2 },
        )
        .err()
        .expect("scalar input cannot be inferred as an object");

        assert_eq!(error.kind, SchemaErrorKind::Inference);
        assert!(error.message.starts_with("failed to resolve input schema"));
    }

    #[test]
    fn malformed_override_fails_construction() {
        let error = FunctionTool::new_sync(
            FunctionToolConfig::new("add", "Adds two integers")
                .with_input_schema(json_schema!({"type": "object", "required": "A"})),
            |_ctx, args: AddArgs| AddResult { sum: args.a + args.b },
        )
        .err()
        .expect("malformed override should fail");

        assert_eq!(error.kind, SchemaErrorKind::Override);
    }

    #[tokio::test]
    async fn unit_tools_have_no_schemas() {
        let tool = FunctionTool::new_sync(FunctionToolConfig::new("ping", "Liveness"), |_ctx, _: ()| ())
            .expect("unit tool should build");

        let declaration = tool.function_declaration();
        assert!(declaration.parameters.is_none());
        assert!(declaration.response.is_none());

        let output = tool
            .run(&ctx(), &ToolContext::new(), Document::new())
            .await
            .expect("run should succeed");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn concurrent_runs_share_one_adapter() {
        let tool = Arc::new(add_tool());

        let runs = (0..8).map(|index| {
            let tool = Arc::clone(&tool);
            tokio::spawn(async move {
                let ctx = InvocationContext::new("session-1", format!("inv-{index}"));
                tool.run(&ctx, &ToolContext::new(), document(json!({"A": index, "B": 1})))
                    .await
            })
        });

        for (index, run) in runs.enumerate() {
            let output = run
                .await
                .expect("task should not panic")
                .expect("run should succeed");
            assert_eq!(output, document(json!({"Sum": index as i64 + 1})));
        }
    }

    #[test]
    fn process_request_registers_and_declares_the_tool() {
        let tool = Arc::new(add_tool());
        let mut request = LlmRequest::new("model-a");

        Arc::clone(&tool)
            .process_request(&ctx(), &ToolContext::new(), &mut request)
            .expect("registration should succeed");
        let error = tool
            .process_request(&ctx(), &ToolContext::new(), &mut request)
            .expect_err("second registration is a duplicate");

        assert_eq!(error.kind, amodel::RequestErrorKind::DuplicateTool);
        assert_eq!(request.tool_names(), vec!["add"]);
        assert_eq!(request.config().tools().len(), 1);
        assert_eq!(request.config().tools()[0].name, "add");
    }
}
