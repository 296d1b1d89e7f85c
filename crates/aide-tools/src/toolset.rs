use aide_llm::ToolSpec;

use crate::tool::FunctionTool;

/// An ordered collection of tools.
///
/// Order is exactly registration order. LLM providers are sensitive to
/// schema ordering in some failure modes, so the order an assistant declares
/// its tools in is the order they are sent.
#[derive(Debug, Clone, Default)]
pub struct Toolset {
    tools: Vec<FunctionTool>,
}

impl Toolset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, preserving registration order.
    /// A tool with an already-registered name is ignored.
    pub fn register(&mut self, tool: FunctionTool) {
        if self.get(tool.name()).is_some() {
            tracing::warn!(tool = %tool.name(), "duplicate tool name ignored");
            return;
        }
        self.tools.push(tool);
    }

    /// Builder-style registration
    pub fn with(mut self, tool: FunctionTool) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FunctionTool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Wire-format definitions, in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl FromIterator<FunctionTool> for Toolset {
    fn from_iter<I: IntoIterator<Item = FunctionTool>>(iter: I) -> Self {
        let mut set = Self::new();
        for tool in iter {
            set.register(tool);
        }
        set
    }
}
