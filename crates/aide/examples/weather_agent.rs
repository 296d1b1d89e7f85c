//! End-to-end run of a tool-calling assistant against a canned LLM client.
//!
//! Run with: `cargo run --example weather_agent -p aide-assistants`

use std::sync::{Arc, Mutex};

use aide::prelude::*;
use aide::ChatRequest;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Stands in for a real provider client: first call asks for the
/// temperature tool, second call produces the final answer.
struct CannedClient {
    calls: Mutex<usize>,
}

#[async_trait]
impl ChatClient for CannedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == 1 {
            Ok(ChatResponse::with_tool_calls(vec![ToolCall::new(
                "call_1",
                "fetch_current_temperature",
                r#"{"location":"Recife"}"#,
            )]))
        } else {
            Ok(ChatResponse::text(
                "The current temperature in Recife today is 32 degrees Celsius.",
            ))
        }
    }

    async fn structured(&self, _request: ChatRequest, _schema: Value) -> Result<Value> {
        Err(anyhow!("structured output not supported by this example"))
    }
}

#[derive(Deserialize, JsonSchema)]
struct LocationArgs {
    location: String,
}

struct WeatherAssistant;

impl Assistant for WeatherAssistant {
    fn id(&self) -> &str {
        "weather_assistant"
    }

    fn name(&self) -> &str {
        "Weather Assistant"
    }

    fn instructions(&self) -> String {
        "You are a temperature bot.".to_string()
    }

    fn tools(&self) -> Toolset {
        Toolset::new().with(FunctionTool::new::<LocationArgs, _, _>(
            "fetch_current_temperature",
            "Fetch the current temperature data for a location",
            |args: LocationArgs| async move {
                Ok(format!("32 degrees Celsius in {}", args.location))
            },
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let llm = Arc::new(CannedClient {
        calls: Mutex::new(0),
    });

    let service = AssistantService::builder()
        .llm_client(llm as Arc<dyn ChatClient>)
        .build()?;
    service.registry().register("weather_assistant", |_ctx| {
        Arc::new(WeatherAssistant) as Arc<dyn Assistant>
    })?;

    let user = User::new("alice");
    let thread = service
        .create_thread("Recife Temperature Chat", Some("weather_assistant"), Some(&user))
        .await?;

    let outcome = service
        .create_message(
            "weather_assistant",
            &thread.id,
            Some(&user),
            "What is the temperature today in Recife?",
        )
        .await?;

    println!("output: {}", outcome.output.as_text().unwrap_or("<structured>"));
    println!("stored trace:");
    for message in service.get_messages(&thread.id, Some(&user)).await? {
        println!(
            "  [{}] {}",
            message.role(),
            message.content_text().unwrap_or("<tool calls>")
        );
    }

    Ok(())
}
