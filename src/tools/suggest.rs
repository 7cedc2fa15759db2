//! MCP `suggest` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `suggest` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SuggestParams {
    #[schemars(description = "Suggestion domain: needs, traits, contexts, or frictions")]
    pub domain: String,

    /// What the user has typed so far. Omit for cold-start suggestions.
    #[schemars(description = "Optional partial text to rank suggestions against")]
    pub text: Option<String>,
}
