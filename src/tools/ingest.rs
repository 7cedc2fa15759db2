//! MCP `ingest` tool parameter and response definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `ingest` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IngestParams {
    #[schemars(description = "Suggestion domain: needs, traits, contexts, or frictions")]
    pub domain: String,

    #[schemars(description = "Text the user entered, to be suggested again later")]
    pub text: String,
}

/// `id` is null when the text was not stored (throttled, no model, or a failure).
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: Option<String>,
}
