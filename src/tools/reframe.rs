//! MCP `reframe` tool parameter and response definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `reframe` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReframeParams {
    #[schemars(description = "Sentence to restate as a neutral observation")]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ReframeResponse {
    pub text: String,
}
