use std::time::Duration;

use aide_llm::{MessagePayload, ToolCall};
use aide_tools::{FunctionTool, ToolDispatcher, Toolset};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, JsonSchema)]
struct LocationArgs {
    location: String,
}

#[derive(Deserialize, JsonSchema)]
struct ForecastArgs {
    location: String,
    dt_str: String,
}

#[derive(Deserialize, JsonSchema)]
struct NoArgs {}

fn echo_tool(name: &str) -> FunctionTool {
    let name_owned = name.to_string();
    FunctionTool::new::<NoArgs, _, _>(name, format!("Tool {name}"), move |_args| {
        let name = name_owned.clone();
        async move { Ok(name) }
    })
}

#[test]
fn test_toolset_preserves_declaration_order() {
    let toolset = Toolset::new()
        .with(echo_tool("tool_d"))
        .with(echo_tool("tool_c"))
        .with(echo_tool("tool_b"))
        .with(echo_tool("tool_a"));

    assert_eq!(toolset.names(), vec!["tool_d", "tool_c", "tool_b", "tool_a"]);

    let specs = toolset.specs();
    let spec_names: Vec<&str> = specs.iter().map(|s| s.function.name.as_str()).collect();
    assert_eq!(spec_names, vec!["tool_d", "tool_c", "tool_b", "tool_a"]);
}

#[test]
fn test_toolset_ignores_duplicate_names() {
    let mut toolset = Toolset::new();
    toolset.register(echo_tool("fetch"));
    toolset.register(echo_tool("fetch"));

    assert_eq!(toolset.len(), 1);
}

#[test]
fn test_parameter_schema_contains_exactly_declared_fields() {
    let tool = FunctionTool::new::<ForecastArgs, _, _>(
        "fetch_forecast_temperature",
        "Fetch the forecast temperature data for a location",
        |args: ForecastArgs| async move { Ok(format!("{} {}", args.location, args.dt_str)) },
    );

    let properties = tool.parameters()["properties"]
        .as_object()
        .expect("schema has properties");
    let mut keys: Vec<&str> = properties.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["dt_str", "location"]);
    assert!(!properties.contains_key("self"));
}

#[test]
fn test_explicit_schema_override() {
    let schema = json!({
        "type": "object",
        "properties": {
            "location": { "type": "string", "description": "City name" }
        },
        "required": ["location"]
    });

    let tool = FunctionTool::new::<LocationArgs, _, _>(
        "fetch_current_temperature",
        "Fetch the current temperature data for a location",
        |args: LocationArgs| async move { Ok(args.location) },
    )
    .with_parameters(schema.clone());

    assert_eq!(tool.parameters(), &schema);
    assert_eq!(tool.spec().function.parameters, schema);
}

#[tokio::test]
async fn test_dispatcher_executes_call() {
    let toolset = Toolset::new().with(FunctionTool::new::<LocationArgs, _, _>(
        "fetch_current_temperature",
        "Fetch the current temperature data for a location",
        |_args: LocationArgs| async move { Ok("32 degrees Celsius".to_string()) },
    ));

    let calls = vec![ToolCall::new(
        "call_1",
        "fetch_current_temperature",
        r#"{"location":"Recife"}"#,
    )];
    let results = ToolDispatcher::new(1).execute(&toolset, &calls).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content_text(), Some("32 degrees Celsius"));
    match &results[0].payload {
        MessagePayload::Tool { tool_call_id, .. } => assert_eq!(tool_call_id, "call_1"),
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatcher_isolates_failures() {
    let toolset = Toolset::new()
        .with(FunctionTool::new::<NoArgs, _, _>(
            "broken",
            "Always fails",
            |_args: NoArgs| async move { anyhow::bail!("boom") },
        ))
        .with(echo_tool("works"));

    let calls = vec![
        ToolCall::new("call_1", "broken", "{}"),
        ToolCall::new("call_2", "works", "{}"),
    ];
    let results = ToolDispatcher::new(1).execute(&toolset, &calls).await;

    assert_eq!(results.len(), 2);
    let error_content = results[0].content_text().unwrap();
    assert!(error_content.starts_with("Tool execution failed:"));
    assert!(error_content.contains("boom"));
    assert_eq!(results[1].content_text(), Some("works"));
}

#[tokio::test]
async fn test_dispatcher_reports_unknown_tool() {
    let toolset = Toolset::new().with(echo_tool("known"));

    let calls = vec![ToolCall::new("call_1", "missing", "{}")];
    let results = ToolDispatcher::new(1).execute(&toolset, &calls).await;

    let content = results[0].content_text().unwrap();
    assert!(content.contains("'missing' not found"));
}

#[tokio::test]
async fn test_dispatcher_reports_invalid_arguments() {
    let toolset = Toolset::new().with(FunctionTool::new::<LocationArgs, _, _>(
        "fetch_current_temperature",
        "Fetch the current temperature data for a location",
        |args: LocationArgs| async move { Ok(args.location) },
    ));

    let calls = vec![ToolCall::new("call_1", "fetch_current_temperature", r#"{"city": 3}"#)];
    let results = ToolDispatcher::new(1).execute(&toolset, &calls).await;

    let content = results[0].content_text().unwrap();
    assert!(content.starts_with("Tool execution failed:"));
}

#[tokio::test]
async fn test_concurrent_results_keep_request_order() {
    let slow = FunctionTool::new::<NoArgs, _, _>("slow", "Slow tool", |_args: NoArgs| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok("slow".to_string())
    });
    let fast = FunctionTool::new::<NoArgs, _, _>("fast", "Fast tool", |_args: NoArgs| async move {
        Ok("fast".to_string())
    });

    let toolset = Toolset::new().with(slow).with(fast);
    let calls = vec![
        ToolCall::new("call_slow", "slow", "{}"),
        ToolCall::new("call_fast", "fast", "{}"),
    ];

    // Even though the fast call finishes first, results come back in the
    // order the calls were requested.
    let results = ToolDispatcher::new(2).execute(&toolset, &calls).await;
    let ids: Vec<&str> = results
        .iter()
        .map(|m| match &m.payload {
            MessagePayload::Tool { tool_call_id, .. } => tool_call_id.as_str(),
            other => panic!("expected tool result, got {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec!["call_slow", "call_fast"]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_tool_paces_calls() {
    let tool = echo_tool("paced").rate_limited(Duration::from_millis(100));

    let start = tokio::time::Instant::now();
    tool.call(json!({})).await.unwrap();
    tool.call(json!({})).await.unwrap();
    tool.call(json!({})).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(200));
}
