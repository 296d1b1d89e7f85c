use std::sync::Arc;

use aide_graph::{AssistantGraph, PersistenceContext, RunOutcome};
use aide_llm::{ChatClient, ChatMessage};
use aide_persist::{MemoryStore, MessageStore, Thread, ThreadStore};

use crate::assistant::{Assistant, AssistantContext};
use crate::error::AssistantError;
use crate::permissions::{AllowAll, PermissionPolicy, User};
use crate::registry::AssistantRegistry;

/// Summary of a registered assistant visible to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantInfo {
    pub id: String,
    pub name: String,
}

/// The facade wiring registry, stores, permissions, and the orchestration
/// loop together.
///
/// Every operation consults its permission predicate before any mutation or
/// sensitive read; a denial raises `NotAllowed` with no partial side
/// effect.
pub struct AssistantService {
    registry: Arc<AssistantRegistry>,
    llm: Arc<dyn ChatClient>,
    threads: Arc<dyn ThreadStore>,
    messages: Arc<dyn MessageStore>,
    permissions: Arc<dyn PermissionPolicy>,
}

impl AssistantService {
    /// Create a builder for fluent construction
    pub fn builder() -> AssistantServiceBuilder {
        AssistantServiceBuilder::new()
    }

    pub fn registry(&self) -> &AssistantRegistry {
        &self.registry
    }

    /// Resolve an assistant instance bound to the user's context, checking
    /// the run permission.
    fn resolve_assistant(
        &self,
        assistant_id: &str,
        user: Option<&User>,
    ) -> Result<Arc<dyn Assistant>, AssistantError> {
        let factory = self.registry.get(assistant_id)?;
        let context = AssistantContext {
            user: user.cloned(),
        };
        let assistant = factory(&context);
        if !self.permissions.can_run_assistant(user, assistant.as_ref()) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to use this assistant".to_string(),
            ));
        }
        Ok(assistant)
    }

    /// Summary for one assistant the user can run
    pub fn get_assistant_info(
        &self,
        assistant_id: &str,
        user: Option<&User>,
    ) -> Result<AssistantInfo, AssistantError> {
        let assistant = self.resolve_assistant(assistant_id, user)?;
        Ok(AssistantInfo {
            id: assistant_id.to_string(),
            name: assistant.name().to_string(),
        })
    }

    /// Summaries for every assistant the user can run; the rest are
    /// silently skipped.
    pub fn list_assistants(&self, user: Option<&User>) -> Vec<AssistantInfo> {
        self.registry
            .ids()
            .iter()
            .filter_map(|id| self.get_assistant_info(id, user).ok())
            .collect()
    }

    pub async fn create_thread(
        &self,
        name: &str,
        assistant_id: Option<&str>,
        user: Option<&User>,
    ) -> Result<Thread, AssistantError> {
        if !self.permissions.can_create_thread(user) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to create threads".to_string(),
            ));
        }
        let thread = self
            .threads
            .create_thread(name, user.map(|u| u.id.as_str()), assistant_id)
            .await?;
        Ok(thread)
    }

    async fn fetch_thread(&self, thread_id: &str) -> Result<Thread, AssistantError> {
        self.threads
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AssistantError::ThreadNotFound(thread_id.to_string()))
    }

    pub async fn get_thread(
        &self,
        thread_id: &str,
        user: Option<&User>,
    ) -> Result<Thread, AssistantError> {
        let thread = self.fetch_thread(thread_id).await?;
        if !self.permissions.can_view_thread(user, &thread) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to view this thread".to_string(),
            ));
        }
        Ok(thread)
    }

    /// The user's threads, newest first, optionally filtered by assistant
    pub async fn list_threads(
        &self,
        user: Option<&User>,
        assistant_id: Option<&str>,
    ) -> Result<Vec<Thread>, AssistantError> {
        let threads = self
            .threads
            .list_threads(user.map(|u| u.id.as_str()), assistant_id)
            .await?;
        Ok(threads
            .into_iter()
            .filter(|thread| self.permissions.can_view_thread(user, thread))
            .collect())
    }

    pub async fn update_thread(
        &self,
        thread_id: &str,
        name: &str,
        user: Option<&User>,
    ) -> Result<Thread, AssistantError> {
        let thread = self.fetch_thread(thread_id).await?;
        if !self.permissions.can_update_thread(user, &thread) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to update this thread".to_string(),
            ));
        }
        Ok(self.threads.update_thread_name(thread_id, name).await?)
    }

    /// Delete a thread; its messages cascade.
    pub async fn delete_thread(
        &self,
        thread_id: &str,
        user: Option<&User>,
    ) -> Result<(), AssistantError> {
        let thread = self.fetch_thread(thread_id).await?;
        if !self.permissions.can_delete_thread(user, &thread) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to delete this thread".to_string(),
            ));
        }
        self.messages.clear(thread_id).await?;
        self.threads.delete_thread(thread_id).await?;
        Ok(())
    }

    pub async fn get_messages(
        &self,
        thread_id: &str,
        user: Option<&User>,
    ) -> Result<Vec<ChatMessage>, AssistantError> {
        let thread = self.fetch_thread(thread_id).await?;
        if !self.permissions.can_view_thread(user, &thread) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to view messages in this thread".to_string(),
            ));
        }
        Ok(self.messages.get(thread_id).await?)
    }

    /// Create a message in a thread and drive the assistant to its
    /// response. Returns the final output plus the full message trace.
    pub async fn create_message(
        &self,
        assistant_id: &str,
        thread_id: &str,
        user: Option<&User>,
        content: &str,
    ) -> Result<RunOutcome, AssistantError> {
        let assistant = self.resolve_assistant(assistant_id, user)?;

        let thread = self.fetch_thread(thread_id).await?;
        if !self.permissions.can_create_message(user, &thread) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to create messages in this thread".to_string(),
            ));
        }

        tracing::debug!(assistant_id, thread_id, "running assistant");
        let graph = self.graph_for(assistant.as_ref(), Some(thread.id))?;
        Ok(graph.invoke(content).await?)
    }

    pub async fn delete_message(
        &self,
        thread_id: &str,
        message_id: &str,
        user: Option<&User>,
    ) -> Result<(), AssistantError> {
        let thread = self.fetch_thread(thread_id).await?;
        let messages = self.messages.get(thread_id).await?;
        let message = messages
            .iter()
            .find(|m| m.id.as_deref() == Some(message_id))
            .ok_or_else(|| AssistantError::MessageNotFound(message_id.to_string()))?;

        if !self.permissions.can_delete_message(user, &thread, message) {
            return Err(AssistantError::NotAllowed(
                "User is not allowed to delete this message".to_string(),
            ));
        }
        self.messages
            .remove(thread_id, &[message_id.to_string()])
            .await?;
        Ok(())
    }

    /// Run an assistant against a thread outside the facade's message
    /// endpoint (no permission checks; callers gate themselves).
    pub fn graph_for(
        &self,
        assistant: &dyn Assistant,
        thread_id: Option<String>,
    ) -> Result<AssistantGraph, AssistantError> {
        let mut builder = AssistantGraph::builder()
            .llm_client(Arc::clone(&self.llm))
            .toolset(assistant.tools())
            .config(assistant.agent_config());
        if let Some(retriever) = assistant.retriever() {
            builder = builder.retriever(retriever);
        }
        if let Some(thread_id) = thread_id {
            builder = builder.persistence(PersistenceContext {
                message_store: Arc::clone(&self.messages),
                thread_store: Some(Arc::clone(&self.threads)),
                thread_id,
            });
        }
        Ok(builder.build()?)
    }
}

/// Builder for constructing an [`AssistantService`]
pub struct AssistantServiceBuilder {
    registry: Option<Arc<AssistantRegistry>>,
    llm: Option<Arc<dyn ChatClient>>,
    threads: Option<Arc<dyn ThreadStore>>,
    messages: Option<Arc<dyn MessageStore>>,
    permissions: Option<Arc<dyn PermissionPolicy>>,
}

impl AssistantServiceBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            llm: None,
            threads: None,
            messages: None,
            permissions: None,
        }
    }

    pub fn registry(mut self, registry: Arc<AssistantRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm = Some(client);
        self
    }

    /// Provide thread and message stores. They usually share one backend so
    /// thread deletion can cascade consistently.
    pub fn stores(
        mut self,
        threads: Arc<dyn ThreadStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        self.threads = Some(threads);
        self.messages = Some(messages);
        self
    }

    pub fn permissions(mut self, permissions: Arc<dyn PermissionPolicy>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Build the service. Defaults: a fresh registry, one shared in-process
    /// store, and the allow-all policy.
    pub fn build(self) -> Result<AssistantService, AssistantError> {
        let llm = self
            .llm
            .ok_or_else(|| AssistantError::Misconfigured("an LLM client is required".to_string()))?;

        let (threads, messages) = match (self.threads, self.messages) {
            (Some(threads), Some(messages)) => (threads, messages),
            (None, None) => {
                let store = Arc::new(MemoryStore::new());
                (
                    Arc::clone(&store) as Arc<dyn ThreadStore>,
                    store as Arc<dyn MessageStore>,
                )
            }
            _ => {
                return Err(AssistantError::Misconfigured(
                    "thread and message stores must be provided together".to_string(),
                ))
            }
        };

        Ok(AssistantService {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(AssistantRegistry::new())),
            llm,
            threads,
            messages,
            permissions: self.permissions.unwrap_or_else(|| Arc::new(AllowAll)),
        })
    }
}

impl Default for AssistantServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
