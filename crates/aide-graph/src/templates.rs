/// Sent after the conversation when the latest question must be rewritten
/// into a standalone retrieval query.
pub const CONDENSE_QUESTION_PROMPT: &str = "Given the conversation above, rewrite the latest \
user question as a standalone question that can be understood without the conversation. \
Do NOT answer the question; reformulate it if needed, otherwise return it as is.";

/// Sent as the final instruction before the schema-constrained call.
pub const STRUCTURED_OUTPUT_PROMPT: &str = "Use the conversation above to produce a response \
in the requested format.";
