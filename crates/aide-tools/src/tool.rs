use std::future::Future;
use std::sync::Arc;

use aide_llm::ToolSpec;
use anyhow::{anyhow, Result};
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// One callable tool: name, description, parameter schema, bound handler.
///
/// Descriptors are explicit, immutable values constructed when an assistant
/// instance builds its toolset. The parameter schema is derived from the
/// typed argument struct, so the schema only ever contains the declared
/// argument fields.
#[derive(Clone)]
pub struct FunctionTool {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) parameters: Value,
    pub(crate) handler: Handler,
}

impl FunctionTool {
    /// Create a tool from an async handler over a typed argument struct.
    ///
    /// The JSON Schema for `A` becomes the tool's externally visible
    /// parameter schema. Arguments that fail to deserialize into `A` are
    /// reported as a handler error, not a panic.
    pub fn new<A, F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + JsonSchema + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        let func = Arc::new(handler);
        let call: Handler = Arc::new(move |arguments: Value| {
            let func = Arc::clone(&func);
            Box::pin(async move {
                let args: A = serde_json::from_value(arguments)
                    .map_err(|e| anyhow!("invalid tool arguments: {e}"))?;
                func(args).await
            })
        });

        Self {
            name: name.into(),
            description: description.into(),
            parameters: parameters_schema::<A>(),
            handler: call,
        }
    }

    /// Replace the derived parameter schema with an explicit one.
    ///
    /// The handler still deserializes into its typed argument struct, so the
    /// explicit schema must describe a compatible shape.
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Wire-format definition for the LLM provider
    pub fn spec(&self) -> ToolSpec {
        ToolSpec::new(&*self.name, &*self.description, self.parameters.clone())
    }

    /// Invoke the handler with already-parsed JSON arguments
    pub async fn call(&self, arguments: Value) -> Result<String> {
        (self.handler)(arguments).await
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

fn parameters_schema<A: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(A))
        .unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}
