use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use aide::prelude::*;
use aide::ChatRequest;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// LLM double replaying a fixed script
struct ScriptedClient {
    responses: Mutex<VecDeque<ChatResponse>>,
    calls: Mutex<usize>,
}

impl ScriptedClient {
    fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        }
    }

    fn chat_calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted client ran out of responses"))
    }

    async fn structured(&self, _request: ChatRequest, _schema: Value) -> Result<Value> {
        Err(anyhow!("no structured value scripted"))
    }
}

#[derive(Deserialize, JsonSchema)]
struct LocationArgs {
    location: String,
}

struct TemperatureAssistant;

impl Assistant for TemperatureAssistant {
    fn id(&self) -> &str {
        "temperature_assistant"
    }

    fn name(&self) -> &str {
        "Temperature Assistant"
    }

    fn instructions(&self) -> String {
        "You are a temperature bot.".to_string()
    }

    fn tools(&self) -> Toolset {
        Toolset::new().with(FunctionTool::new::<LocationArgs, _, _>(
            "fetch_current_temperature",
            "Fetch the current temperature data for a location",
            |_args: LocationArgs| async move { Ok("32 degrees Celsius".to_string()) },
        ))
    }
}

fn service_with(
    llm: Arc<dyn ChatClient>,
    permissions: Option<Arc<dyn PermissionPolicy>>,
) -> AssistantService {
    let mut builder = AssistantService::builder().llm_client(llm);
    if let Some(permissions) = permissions {
        builder = builder.permissions(permissions);
    }
    let service = builder.build().unwrap();
    service
        .registry()
        .register("temperature_assistant", |_ctx| {
            Arc::new(TemperatureAssistant) as Arc<dyn Assistant>
        })
        .unwrap();
    service
}

fn recife_script() -> Vec<ChatResponse> {
    vec![
        ChatResponse::with_tool_calls(vec![ToolCall::new(
            "call_1",
            "fetch_current_temperature",
            r#"{"location":"Recife"}"#,
        )]),
        ChatResponse::text("The current temperature in Recife today is 32 degrees Celsius."),
    ]
}

#[test]
fn test_registry_rejects_malformed_ids() {
    let registry = AssistantRegistry::new();

    for bad in ["", "white space", "acentuação", "semi;colon"] {
        let err = registry
            .register(bad, |_ctx| Arc::new(TemperatureAssistant) as Arc<dyn Assistant>)
            .unwrap_err();
        assert!(
            matches!(err, AssistantError::Misconfigured(_)),
            "id {bad:?} should be rejected"
        );
    }

    registry
        .register("Valid_id-123", |_ctx| {
            Arc::new(TemperatureAssistant) as Arc<dyn Assistant>
        })
        .unwrap();
}

#[test]
fn test_registry_rejects_duplicate_ids() {
    let registry = AssistantRegistry::new();
    registry
        .register("temperature_assistant", |_ctx| {
            Arc::new(TemperatureAssistant) as Arc<dyn Assistant>
        })
        .unwrap();

    let err = registry
        .register("temperature_assistant", |_ctx| {
            Arc::new(TemperatureAssistant) as Arc<dyn Assistant>
        })
        .unwrap_err();
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn test_registry_clear_is_explicit() {
    let registry = AssistantRegistry::new();
    registry
        .register("temperature_assistant", |_ctx| {
            Arc::new(TemperatureAssistant) as Arc<dyn Assistant>
        })
        .unwrap();
    assert!(registry.contains("temperature_assistant"));

    registry.clear();
    assert!(!registry.contains("temperature_assistant"));
    assert!(registry.ids().is_empty());
}

#[test]
fn test_unknown_assistant_wording() {
    let registry = AssistantRegistry::new();
    let err = registry.get("missing").err().unwrap();
    assert_eq!(err.to_string(), "Assistant with id=missing not found");
}

#[tokio::test]
async fn test_create_message_runs_full_loop() {
    let llm = Arc::new(ScriptedClient::new(recife_script()));
    let service = service_with(Arc::clone(&llm) as Arc<dyn ChatClient>, None);

    let user = User::new("alice");
    let thread = service
        .create_thread("Recife Temperature Chat", None, Some(&user))
        .await
        .unwrap();

    let outcome = service
        .create_message(
            "temperature_assistant",
            &thread.id,
            Some(&user),
            "What is the temperature today in Recife?",
        )
        .await
        .unwrap();

    assert_eq!(llm.chat_calls(), 2);
    assert_eq!(
        outcome.output,
        AssistantOutput::Text(
            "The current temperature in Recife today is 32 degrees Celsius.".to_string()
        )
    );

    let stored = service.get_messages(&thread.id, Some(&user)).await.unwrap();
    let roles: Vec<&str> = stored.iter().map(|m| m.role()).collect();
    assert_eq!(roles, vec!["user", "assistant", "tool", "assistant"]);
}

#[tokio::test]
async fn test_denied_thread_creation_leaves_no_row() {
    struct NoThreads;
    impl PermissionPolicy for NoThreads {
        fn can_create_thread(&self, _user: Option<&User>) -> bool {
            false
        }
    }

    let llm = Arc::new(ScriptedClient::new(vec![]));
    let service = service_with(llm as Arc<dyn ChatClient>, Some(Arc::new(NoThreads)));

    let user = User::new("alice");
    let err = service
        .create_thread("Nope", None, Some(&user))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User is not allowed to create threads");

    let threads = service.list_threads(Some(&user), None).await.unwrap();
    assert!(threads.is_empty());
}

#[tokio::test]
async fn test_denied_message_creation_runs_nothing() {
    struct NoMessages;
    impl PermissionPolicy for NoMessages {
        fn can_create_message(&self, _user: Option<&User>, _thread: &Thread) -> bool {
            false
        }
    }

    let llm = Arc::new(ScriptedClient::new(recife_script()));
    let service = service_with(
        Arc::clone(&llm) as Arc<dyn ChatClient>,
        Some(Arc::new(NoMessages)),
    );

    let user = User::new("alice");
    let thread = service
        .create_thread("Chat", None, Some(&user))
        .await
        .unwrap();
    let err = service
        .create_message("temperature_assistant", &thread.id, Some(&user), "hi")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "User is not allowed to create messages in this thread"
    );
    // Denial happened before any side effect.
    assert_eq!(llm.chat_calls(), 0);
    assert!(service
        .get_messages(&thread.id, Some(&user))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_owner_or_superuser_policy() {
    let llm = Arc::new(ScriptedClient::new(vec![]));
    let service = service_with(
        llm as Arc<dyn ChatClient>,
        Some(Arc::new(OwnerOrSuperuser)),
    );

    let alice = User::new("alice");
    let bob = User::new("bob");
    let root = User::superuser("root");

    let thread = service
        .create_thread("Alice's thread", None, Some(&alice))
        .await
        .unwrap();

    let err = service.get_thread(&thread.id, Some(&bob)).await.unwrap_err();
    assert_eq!(err.to_string(), "User is not allowed to view this thread");

    let err = service
        .get_messages(&thread.id, Some(&bob))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "User is not allowed to view messages in this thread"
    );

    service.get_thread(&thread.id, Some(&alice)).await.unwrap();
    service.get_thread(&thread.id, Some(&root)).await.unwrap();

    // Anonymous callers cannot create threads under this policy.
    let err = service.create_thread("Anon", None, None).await.unwrap_err();
    assert_eq!(err.to_string(), "User is not allowed to create threads");
}

#[tokio::test]
async fn test_list_assistants_filters_hidden_ones() {
    struct HideTemperature;
    impl PermissionPolicy for HideTemperature {
        fn can_run_assistant(&self, _user: Option<&User>, assistant: &dyn Assistant) -> bool {
            assistant.id() != "temperature_assistant"
        }
    }

    let llm = Arc::new(ScriptedClient::new(vec![]));
    let service = service_with(
        llm as Arc<dyn ChatClient>,
        Some(Arc::new(HideTemperature)),
    );

    struct OtherAssistant;
    impl Assistant for OtherAssistant {
        fn id(&self) -> &str {
            "other_assistant"
        }
        fn name(&self) -> &str {
            "Other Assistant"
        }
        fn instructions(&self) -> String {
            "You are helpful.".to_string()
        }
    }
    service
        .registry()
        .register("other_assistant", |_ctx| {
            Arc::new(OtherAssistant) as Arc<dyn Assistant>
        })
        .unwrap();

    let infos = service.list_assistants(None);
    assert_eq!(
        infos,
        vec![AssistantInfo {
            id: "other_assistant".to_string(),
            name: "Other Assistant".to_string(),
        }]
    );

    let err = service
        .get_assistant_info("temperature_assistant", None)
        .unwrap_err();
    assert_eq!(err.to_string(), "User is not allowed to use this assistant");
}

#[tokio::test]
async fn test_update_thread_name() {
    let llm = Arc::new(ScriptedClient::new(vec![]));
    let service = service_with(llm as Arc<dyn ChatClient>, None);

    let user = User::new("alice");
    let thread = service
        .create_thread("Old", None, Some(&user))
        .await
        .unwrap();
    let updated = service
        .update_thread(&thread.id, "New", Some(&user))
        .await
        .unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.id, thread.id);
}

#[tokio::test]
async fn test_delete_thread_cascades_messages() {
    let llm = Arc::new(ScriptedClient::new(recife_script()));
    let service = service_with(Arc::clone(&llm) as Arc<dyn ChatClient>, None);

    let user = User::new("alice");
    let thread = service
        .create_thread("Chat", None, Some(&user))
        .await
        .unwrap();
    service
        .create_message("temperature_assistant", &thread.id, Some(&user), "Recife?")
        .await
        .unwrap();

    service.delete_thread(&thread.id, Some(&user)).await.unwrap();
    let err = service.get_thread(&thread.id, Some(&user)).await.unwrap_err();
    assert!(matches!(err, AssistantError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_delete_message() {
    let llm = Arc::new(ScriptedClient::new(vec![ChatResponse::text("Hello!")]));
    let service = service_with(llm as Arc<dyn ChatClient>, None);

    let user = User::new("alice");
    let thread = service
        .create_thread("Chat", None, Some(&user))
        .await
        .unwrap();
    service
        .create_message("temperature_assistant", &thread.id, Some(&user), "Hi")
        .await
        .unwrap();

    let stored = service.get_messages(&thread.id, Some(&user)).await.unwrap();
    assert_eq!(stored.len(), 2);
    let first_id = stored[0].id.clone().unwrap();

    service
        .delete_message(&thread.id, &first_id, Some(&user))
        .await
        .unwrap();
    let remaining = service.get_messages(&thread.id, Some(&user)).await.unwrap();
    assert_eq!(remaining.len(), 1);

    let err = service
        .delete_message(&thread.id, "999999", Some(&user))
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::MessageNotFound(_)));
}

#[tokio::test]
async fn test_failing_sub_assistant_degrades_to_tool_error() {
    // The sub-assistant's client fails outright, so its whole loop errors.
    let sub_llm = Arc::new(ScriptedClient::new(vec![]));

    struct ParentAssistant {
        sub_tool: FunctionTool,
    }
    impl Assistant for ParentAssistant {
        fn id(&self) -> &str {
            "parent_assistant"
        }
        fn name(&self) -> &str {
            "Parent Assistant"
        }
        fn instructions(&self) -> String {
            "Delegate to your sub-assistant.".to_string()
        }
        fn tools(&self) -> Toolset {
            Toolset::new().with(self.sub_tool.clone())
        }
    }

    let sub_tool = assistant_tool(
        Arc::new(TemperatureAssistant) as Arc<dyn Assistant>,
        sub_llm as Arc<dyn ChatClient>,
        "Ask the temperature assistant",
    );

    let parent_llm = Arc::new(ScriptedClient::new(vec![
        ChatResponse::with_tool_calls(vec![ToolCall::new(
            "call_1",
            "temperature_assistant",
            r#"{"input":"What is the temperature in Recife?"}"#,
        )]),
        ChatResponse::text("My sub-assistant is unavailable right now."),
    ]));

    let service = AssistantService::builder()
        .llm_client(Arc::clone(&parent_llm) as Arc<dyn ChatClient>)
        .build()
        .unwrap();
    service
        .registry()
        .register("parent_assistant", move |_ctx| {
            Arc::new(ParentAssistant {
                sub_tool: sub_tool.clone(),
            }) as Arc<dyn Assistant>
        })
        .unwrap();

    let user = User::new("alice");
    let thread = service
        .create_thread("Chat", None, Some(&user))
        .await
        .unwrap();
    let outcome = service
        .create_message("parent_assistant", &thread.id, Some(&user), "Recife?")
        .await
        .unwrap();

    // The parent loop completed despite the failing sub-assistant.
    assert_eq!(
        outcome.output,
        AssistantOutput::Text("My sub-assistant is unavailable right now.".to_string())
    );

    let stored = service.get_messages(&thread.id, Some(&user)).await.unwrap();
    let tool_result = stored
        .iter()
        .find(|m| m.role() == "tool")
        .and_then(|m| m.content_text())
        .unwrap();
    assert!(tool_result.starts_with("Tool execution failed:"));
}
