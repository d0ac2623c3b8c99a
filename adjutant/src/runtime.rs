//! Single-step wiring helpers between a request, its tools, and a model turn.

use std::sync::Arc;

use futures_util::StreamExt;

use crate::{
    Content, InvocationContext, LlmRequest, LlmResponse, ModelError, Part, RequestError,
    ResponseStream, Role, Tool, ToolContext, ToolError, ToolErrorKind, ToolRuntime,
    failure_response,
};

/// Lets every tool contribute to `request`, in order.
///
/// Either every tool registers or `request` is left untouched: the first failure
/// discards the contributions of the tools processed before it.
pub fn register_tools<I>(
    ctx: &InvocationContext,
    request: &mut LlmRequest,
    tools: I,
) -> Result<(), RequestError>
where
    I: IntoIterator<Item = Arc<dyn Tool>>,
{
    let tool_ctx = ToolContext::new();
    let mut staged = request.clone();
    for tool in tools {
        tool.process_request(ctx, &tool_ctx, &mut staged)?;
    }
    *request = staged;
    Ok(())
}

/// Executes the function calls in `content` one after another.
///
/// Returns the user content carrying one function response per call, or `None`
/// when `content` holds no calls. Tool failures are reported to the model as
/// failure documents; cancellation aborts the remaining calls.
pub async fn dispatch_calls(
    runtime: &dyn ToolRuntime,
    ctx: &InvocationContext,
    request: &LlmRequest,
    content: &Content,
) -> Result<Option<Content>, ToolError> {
    let mut parts = Vec::new();

    for call in content.function_calls() {
        let response = match runtime.execute(ctx, request, call.clone()).await {
            Ok(response) => response,
            Err(error) if error.kind == ToolErrorKind::Cancelled => return Err(error),
            Err(error) => failure_response(call, &error),
        };
        parts.push(Part::FunctionResponse(response));
    }

    Ok((!parts.is_empty()).then(|| Content::new(Role::User, parts)))
}

/// Drains a turn and keeps its complete (non-partial) elements.
///
/// An element carrying an error code ends the turn with a backend error.
pub async fn collect_turn(mut stream: ResponseStream<'_>) -> Result<Vec<LlmResponse>, ModelError> {
    let mut complete = Vec::new();

    while let Some(element) = stream.next().await {
        let response = element?;
        if let Some(code) = response.error_code {
            let message = response.error_message.unwrap_or_default();
            return Err(ModelError::backend(code, message));
        }
        if !response.partial {
            complete.push(response);
        }
    }

    Ok(complete)
}
