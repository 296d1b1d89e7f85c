use std::sync::Arc;

use aide_llm::{
    ChatClient, ChatMessage, ChatOptions, ChatRequest, Content, MessagePayload, Retriever,
    ToolCall, ToolChoice,
};
use aide_persist::{MessageStore, ThreadStore};
use aide_tools::{ToolDispatcher, Toolset};

use crate::config::{AgentConfig, CONTEXT_PLACEHOLDER};
use crate::error::AgentError;
use crate::output::{AssistantOutput, RunOutcome};
use crate::state::AgentState;
use crate::step::{next_step, Step};
use crate::templates::{CONDENSE_QUESTION_PROMPT, STRUCTURED_OUTPUT_PROMPT};

/// Binds an invocation to a persisted conversation
pub struct PersistenceContext {
    pub message_store: Arc<dyn MessageStore>,
    pub thread_store: Option<Arc<dyn ThreadStore>>,
    pub thread_id: String,
}

/// The orchestration state machine.
///
/// Drives `Setup → History → Retrieve? → Agent → {Tools → Agent}* →
/// Respond → Done` over one invocation. Storage stays consistent with the
/// in-memory trace at every step (not only at the end): after every change
/// to the message list, the persistence hook appends the new messages,
/// holding back only the system instructions and AI turns whose tool calls
/// have not resolved yet.
pub struct AssistantGraph {
    pub(crate) llm: Arc<dyn ChatClient>,
    pub(crate) toolset: Toolset,
    pub(crate) dispatcher: ToolDispatcher,
    pub(crate) retriever: Option<Arc<dyn Retriever>>,
    pub(crate) config: AgentConfig,
    pub(crate) persistence: Option<PersistenceContext>,
}

impl AssistantGraph {
    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::AssistantGraphBuilder {
        crate::builder::AssistantGraphBuilder::new()
    }

    /// Run the loop for one user input.
    ///
    /// Runs to completion or fails; callers needing timeouts impose them
    /// around the whole invocation.
    pub async fn invoke(&self, input: &str) -> Result<RunOutcome, AgentError> {
        let mut state = AgentState::new();
        let mut step = Step::Setup;
        let mut iterations = 0usize;
        let mut output = None;

        loop {
            tracing::debug!(?step, messages = state.messages.len(), "executing step");
            match step {
                Step::Setup => {
                    self.run_setup(&mut state)?;
                }
                Step::History => {
                    self.run_history(&mut state, input).await?;
                }
                Step::Retrieve => {
                    self.run_retrieve(&mut state, input).await?;
                }
                Step::Agent => {
                    iterations += 1;
                    if iterations > self.config.max_iterations {
                        return Err(AgentError::MaxIterations(self.config.max_iterations));
                    }
                    self.run_agent(&mut state).await?;
                }
                Step::Tools => {
                    self.run_tools(&mut state).await?;
                }
                Step::Respond => {
                    output = Some(self.run_respond(&state).await?);
                }
                Step::Done => break,
            }
            step = next_step(step, self.config.has_rag, state.has_pending_tool_calls());
        }

        Ok(RunOutcome {
            input: input.to_string(),
            history: state.history.clone(),
            messages: state.messages,
            output: output.unwrap_or_else(|| AssistantOutput::Text(String::new())),
        })
    }

    /// Emit the system instructions; fail fast on retrieval misconfiguration.
    fn run_setup(&self, state: &mut AgentState) -> Result<(), AgentError> {
        if self.config.has_rag {
            if !self.config.instructions.contains(CONTEXT_PLACEHOLDER) {
                return Err(AgentError::Misconfigured(format!(
                    "retrieval-augmented instructions must contain the {CONTEXT_PLACEHOLDER} placeholder"
                )));
            }
            if self.retriever.is_none() {
                return Err(AgentError::Misconfigured(
                    "retrieval-augmentation requires a retriever".to_string(),
                ));
            }
        }

        state.add_message(ChatMessage::system(self.config.instructions.clone()));
        Ok(())
    }

    /// Load prior persisted turns and append the new user input.
    async fn run_history(&self, state: &mut AgentState, input: &str) -> Result<(), AgentError> {
        if let Some(persistence) = &self.persistence {
            let prior = persistence
                .message_store
                .get(&persistence.thread_id)
                .await?;
            state.history = prior.clone();
            for message in prior {
                state.add_message(message);
            }
        }
        // Everything so far is either the system message or already stored.
        state.persisted = state.messages.len();

        state.add_message(ChatMessage::human(input));
        self.persist_new(state).await
    }

    /// Query the retriever and splice the context block into the system
    /// message. Conversation messages are never reordered or mutated.
    async fn run_retrieve(&self, state: &mut AgentState, input: &str) -> Result<(), AgentError> {
        let retriever = self.retriever.as_ref().ok_or_else(|| {
            AgentError::Misconfigured("retrieval-augmentation requires a retriever".to_string())
        })?;

        // A follow-up question may refer back to earlier turns; rewrite it
        // into a standalone query first.
        let query = if state.history.is_empty() {
            input.to_string()
        } else {
            self.condense_question(state, input).await?
        };

        let documents = retriever
            .retrieve(&query)
            .await
            .map_err(AgentError::Retriever)?;
        tracing::debug!(count = documents.len(), "retrieved documents");

        let context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join(&self.config.document_separator);

        if let Some(first) = state.messages.first_mut() {
            if let MessagePayload::System { content } = &mut first.payload {
                *content = Content::text(
                    self.config
                        .instructions
                        .replace(CONTEXT_PLACEHOLDER, &context),
                );
            }
        }
        Ok(())
    }

    async fn condense_question(
        &self,
        state: &AgentState,
        input: &str,
    ) -> Result<String, AgentError> {
        let mut messages = state.history.clone();
        messages.push(ChatMessage::human(input));
        messages.push(ChatMessage::human(CONDENSE_QUESTION_PROMPT));

        let request = ChatRequest::new(self.config.model.clone(), messages)
            .with_options(self.chat_options());
        let response = self.llm.chat(request).await.map_err(AgentError::Llm)?;
        Ok(response.content.unwrap_or_else(|| input.to_string()))
    }

    /// One LLM step: either a final content message or pending tool calls.
    async fn run_agent(&self, state: &mut AgentState) -> Result<(), AgentError> {
        let mut options = self.chat_options();
        if !self.toolset.is_empty() {
            options = options
                .tools(self.toolset.specs())
                .tool_choice(ToolChoice::auto());
        }

        let request =
            ChatRequest::new(self.config.model.clone(), state.messages.clone()).with_options(options);
        let response = self.llm.chat(request).await.map_err(AgentError::Llm)?;

        let tool_calls = response.tool_calls.filter(|calls| !calls.is_empty());
        let message = match tool_calls {
            Some(calls) => ChatMessage::ai_with_tools(response.content.map(Content::text), calls),
            None => ChatMessage::ai(response.content.unwrap_or_default()),
        };

        state.add_message(message);
        self.persist_new(state).await
    }

    /// Execute the pending tool calls and append their results in request
    /// order.
    async fn run_tools(&self, state: &mut AgentState) -> Result<(), AgentError> {
        let calls = state.pending_tool_calls();
        if calls.is_empty() {
            return Ok(());
        }

        tracing::debug!(count = calls.len(), "executing tool calls");
        let results = self.dispatcher.execute(&self.toolset, &calls).await;
        for result in results {
            state.add_message(result);
        }
        self.persist_new(state).await
    }

    /// Produce the final output; structured output is deferred to a
    /// dedicated terminal call because tool calling and schema-constrained
    /// output are mutually exclusive in one request.
    async fn run_respond(&self, state: &AgentState) -> Result<AssistantOutput, AgentError> {
        if let Some(schema) = &self.config.structured_output {
            // The rendering instruction goes into the outgoing request only;
            // the stored trace stays clean.
            let mut messages = state.messages.clone();
            messages.push(ChatMessage::system(STRUCTURED_OUTPUT_PROMPT));

            let request = ChatRequest::new(self.config.model.clone(), messages)
                .with_options(self.chat_options());
            let value = self
                .llm
                .structured(request, schema.clone())
                .await
                .map_err(AgentError::Llm)?;
            return Ok(AssistantOutput::Structured(value));
        }

        let text = state
            .last_message()
            .and_then(|m| m.content_text())
            .unwrap_or_default()
            .to_string();
        Ok(AssistantOutput::Text(text))
    }

    fn chat_options(&self) -> ChatOptions {
        let mut options = ChatOptions::new();
        if let Some(temperature) = self.config.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        options
    }

    /// Persistence hook: append everything new since the last change, except
    /// the system instructions and AI turns whose tool calls have not
    /// resolved yet (half-finished turns are not persisted).
    async fn persist_new(&self, state: &mut AgentState) -> Result<(), AgentError> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };

        let mut end = state.persisted;
        let mut pending = Vec::new();
        while end < state.messages.len() {
            match &state.messages[end].payload {
                MessagePayload::System { .. } => {}
                MessagePayload::Ai {
                    tool_calls: Some(calls),
                    ..
                } if !calls.is_empty() && !Self::calls_resolved(state, end, calls) => break,
                _ => pending.push(end),
            }
            end += 1;
        }

        if !pending.is_empty() {
            let mut batch: Vec<ChatMessage> =
                pending.iter().map(|&i| state.messages[i].clone()).collect();
            persistence
                .message_store
                .add(&persistence.thread_id, &mut batch)
                .await?;
            // Write the back-filled identities into the trace.
            for (message, &i) in batch.into_iter().zip(&pending) {
                state.messages[i] = message;
            }
            if let Some(threads) = &persistence.thread_store {
                threads.touch_thread(&persistence.thread_id).await?;
            }
            tracing::debug!(
                thread_id = %persistence.thread_id,
                count = pending.len(),
                "persisted messages"
            );
        }

        state.persisted = end;
        Ok(())
    }

    fn calls_resolved(state: &AgentState, index: usize, calls: &[ToolCall]) -> bool {
        calls.iter().all(|call| {
            state.messages[index + 1..].iter().any(|m| {
                matches!(
                    &m.payload,
                    MessagePayload::Tool { tool_call_id, .. } if tool_call_id == &call.id
                )
            })
        })
    }
}
