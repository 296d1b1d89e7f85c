use std::sync::{Arc, OnceLock, RwLock};

use regex::Regex;

use crate::assistant::{Assistant, AssistantContext};
use crate::error::AssistantError;

/// Constructs an assistant instance bound to the acting user's context
pub type AssistantFactory = Arc<dyn Fn(&AssistantContext) -> Arc<dyn Assistant> + Send + Sync>;

fn id_pattern() -> &'static Regex {
    static ID_PATTERN: OnceLock<Regex> = OnceLock::new();
    ID_PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("valid id pattern"))
}

/// Maps stable assistant ids to instance factories.
///
/// An explicit value owned by the composition root: ids are validated and
/// uniqueness is enforced at registration time, and `clear` exists as the
/// explicit test-teardown escape hatch instead of relying on process-global
/// import side effects.
#[derive(Default)]
pub struct AssistantRegistry {
    entries: RwLock<Vec<(String, AssistantFactory)>>,
}

impl AssistantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `id`.
    ///
    /// Fails when the id is empty, does not match `^[a-zA-Z0-9_-]+$`, or is
    /// already registered.
    pub fn register<F>(&self, id: impl Into<String>, factory: F) -> Result<(), AssistantError>
    where
        F: Fn(&AssistantContext) -> Arc<dyn Assistant> + Send + Sync + 'static,
    {
        let id = id.into();
        if !id_pattern().is_match(&id) {
            return Err(AssistantError::Misconfigured(format!(
                "Assistant id '{id}' must match ^[a-zA-Z0-9_-]+$"
            )));
        }

        let mut entries = self.entries.write().expect("assistant registry poisoned");
        if entries.iter().any(|(existing, _)| existing == &id) {
            return Err(AssistantError::Misconfigured(format!(
                "Assistant id '{id}' is already registered"
            )));
        }

        tracing::debug!(assistant_id = %id, "registered assistant");
        entries.push((id, Arc::new(factory)));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<AssistantFactory, AssistantError> {
        self.entries
            .read()
            .expect("assistant registry poisoned")
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, factory)| Arc::clone(factory))
            .ok_or_else(|| AssistantError::NotDefined(id.to_string()))
    }

    /// Registered ids, in registration order
    pub fn ids(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("assistant registry poisoned")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .expect("assistant registry poisoned")
            .iter()
            .any(|(existing, _)| existing == id)
    }

    /// Remove every registration. Test-teardown escape hatch.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("assistant registry poisoned")
            .clear();
    }
}
