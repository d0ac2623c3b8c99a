use std::sync::Arc;
use std::time::Duration;

use adjutant::prelude::*;
use adjutant::{ModelErrorKind, json_schema};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

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

/// Asks for `add` on the first turn and reports the sum once a function response arrives.
struct ScriptedModel;

impl ScriptedModel {
    fn reply(request: &LlmRequest) -> Content {
        let answered = request.contents.last().and_then(|content| {
            content.parts.iter().find_map(|part| match part {
                Part::FunctionResponse(response) => Some(response.response.clone()),
                _ => None,
            })
        });

        match answered {
            Some(response) => Content::from_text(
                Role::Model,
                format!("The sum is {}.", response.get("Sum").cloned().unwrap_or(Value::Null)),
            ),
            None => function_call_content(
                "call-1",
                "add",
                json!({"A": 2, "B": 3}).as_object().cloned().unwrap_or_default(),
            ),
        }
    }
}

impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_content<'a>(
        &'a self,
        ctx: &'a InvocationContext,
        request: &'a LlmRequest,
        stream: bool,
    ) -> ResponseStream<'a> {
        let reply = Self::reply(request);
        if !stream {
            return ResponseStream::single(LlmResponse::from_content(reply).with_turn_complete())
                .with_cancellation(ctx.cancellation().clone());
        }

        let producer = async_stream::stream! {
            if let Some(text) = reply.text() {
                for word in text.split_inclusive(' ') {
                    yield Ok(LlmResponse::text_delta(word));
                }
            }
            yield Ok(LlmResponse::from_content(reply).with_turn_complete());
        };
        ResponseStream::new(producer).with_cancellation(ctx.cancellation().clone())
    }
}

fn add_tool() -> Arc<dyn Tool> {
    Arc::new(
        FunctionTool::new_sync(
            FunctionToolConfig::new("add", "Adds two integers"),
            |_ctx, args: AddArgs| AddResult { sum: args.a + args.b },
        )
        .expect("add tool should build"),
    )
}

fn ctx() -> InvocationContext {
    InvocationContext::new("session-1", "inv-1")
}

#[tokio::test]
async fn model_function_call_round_trip() {
    let ctx = ctx();
    let model = ScriptedModel;
    let runtime = DefaultToolRuntime::new().with_hooks(Arc::new(SafeToolHooks::new(
        TracingObservabilityHooks,
    )));

    let mut request = LlmRequest::new(model.name()).with_content(user_content("What is 2 + 3?"));
    request.append_instructions(["You are a calculator.", "Use tools for arithmetic."]);
    register_tools(&ctx, &mut request, [add_tool()]).expect("add should register");

    assert_eq!(
        request.system_instruction_text(),
        Some("You are a calculator.\n\nUse tools for arithmetic.")
    );
    assert_eq!(request.config().tools().len(), 1);
    assert!(request.config().tools()[0].parameters.is_some());

    let first = collect_turn(model.generate_content(&ctx, &request, false))
        .await
        .expect("first turn should succeed");
    let call_content = first[0].content.clone().expect("turn should carry content");
    let responses = dispatch_calls(&runtime, &ctx, &request, &call_content)
        .await
        .expect("dispatch should succeed")
        .expect("model asked for a tool");

    let Part::FunctionResponse(response) = &responses.parts[0] else {
        panic!("expected a function response");
    };
    assert_eq!(response.id.as_deref(), Some("call-1"));
    assert_eq!(Value::Object(response.response.clone()), json!({"Sum": 5}));

    request.contents.push(call_content);
    request.contents.push(responses);
    let second = collect_turn(model.generate_content(&ctx, &request, false))
        .await
        .expect("second turn should succeed");

    let answer = second[0]
        .content
        .as_ref()
        .and_then(Content::text)
        .expect("answer should be text");
    assert_eq!(answer, "The sum is 5.");
}

#[tokio::test]
async fn streaming_turn_delivers_deltas_then_complete_answer() {
    let ctx = ctx();
    let model = ScriptedModel;
    let request = LlmRequest::new(model.name()).with_contents(vec![
        user_content("What is 2 + 3?"),
        Content::function_response(FunctionResponse {
            id: Some("call-1".to_string()),
            name: "add".to_string(),
            response: json!({"Sum": 5}).as_object().cloned().unwrap_or_default(),
        }),
    ]);

    let elements: Vec<_> = model.generate_content(&ctx, &request, true).collect().await;

    let (partials, complete): (Vec<_>, Vec<_>) = elements
        .into_iter()
        .map(|element| element.expect("element should be ok"))
        .partition(|element| element.partial);
    let streamed: String = partials
        .iter()
        .filter_map(|element| element.content.as_ref().and_then(Content::text))
        .collect();

    assert_eq!(streamed, "The sum is 5.");
    assert_eq!(complete.len(), 1);
    assert!(complete[0].turn_complete);
}

#[tokio::test]
async fn cancelled_invocation_stops_stream_and_tool() {
    let ctx = ctx();
    let slow = FunctionTool::new(
        FunctionToolConfig::new("slow_add", "Adds slowly"),
        |_ctx, args: AddArgs| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            AddResult { sum: args.a + args.b }
        },
    )
    .expect("slow tool should build");
    let mut request = LlmRequest::new("scripted");
    register_tools(&ctx, &mut request, [Arc::new(slow) as Arc<dyn Tool>])
        .expect("slow tool should register");

    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let call = FunctionCall::new(
        "slow_add",
        json!({"A": 1, "B": 2}).as_object().cloned().unwrap_or_default(),
    );
    let error = DefaultToolRuntime::new()
        .execute(&ctx, &request, call)
        .await
        .expect_err("run should be cancelled");
    assert_eq!(error.kind, ToolErrorKind::Cancelled);

    let model = ScriptedModel;
    let mut stream = model.generate_content(&ctx, &request, true);
    let element = stream
        .next()
        .await
        .expect("cancellation element")
        .expect_err("element should be an error");
    assert_eq!(element.kind, ModelErrorKind::Cancelled);
    assert!(stream.next().await.is_none());
}

#[test]
fn output_override_is_declared_verbatim() {
    let schema = json_schema!({
        "type": "object",
        "properties": {"total": {"type": "number"}}
    });
    let tool = FunctionTool::new_sync(
        FunctionToolConfig::new("add", "Adds two integers").with_output_schema(schema.clone()),
        |_ctx, args: AddArgs| AddResult { sum: args.a + args.b },
    )
    .expect("override is adopted without checking the result type");

    let mut request = LlmRequest::new("scripted");
    register_tools(&ctx(), &mut request, [Arc::new(tool) as Arc<dyn Tool>])
        .expect("tool should register");

    assert_eq!(request.config().tools()[0].response, Some(schema));
}
