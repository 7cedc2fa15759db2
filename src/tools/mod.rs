pub mod ingest;
pub mod reframe;
pub mod suggest;

use ingest::{IngestParams, IngestResponse};
use reframe::{ReframeParams, ReframeResponse};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::Arc;
use suggest::SuggestParams;

use tja_suggest::config::TjaConfig;
use tja_suggest::suggest::{Domain, SuggestionService};

/// The MCP tool handler. Every session shares one [`SuggestionService`], so
/// the rate limit and caches are per process, not per client.
#[derive(Clone)]
pub struct SuggestTools {
    tool_router: ToolRouter<Self>,
    service: Arc<SuggestionService>,
    config: Arc<TjaConfig>,
}

#[tool_router]
impl SuggestTools {
    pub fn new(service: Arc<SuggestionService>, config: Arc<TjaConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
            config,
        }
    }

    #[tool(description = "Suggest short phrases for a journaling prompt. Domains: needs (what would help right now), traits (qualities to embody), contexts (ordinary places and rituals), frictions (what gets in the way). Pass the user's partial text to rank against it.")]
    async fn suggest(
        &self,
        Parameters(params): Parameters<SuggestParams>,
    ) -> Result<String, String> {
        let domain: Domain = params.domain.parse().map_err(|e: String| e)?;
        tracing::info!(
            %domain,
            text_len = params.text.as_ref().map_or(0, String::len),
            "suggest called"
        );

        let mut result = self.service.suggest(domain, params.text.as_deref()).await;
        if !self.config.ui.show_method {
            result = result.without_method();
        }

        tracing::debug!(items = result.items.len(), throttled = result.throttled, "suggest done");
        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    #[tool(description = "Remember a phrase the user entered so it can be suggested again in the same domain.")]
    async fn ingest(
        &self,
        Parameters(params): Parameters<IngestParams>,
    ) -> Result<String, String> {
        let domain: Domain = params.domain.parse().map_err(|e: String| e)?;
        tracing::info!(%domain, text_len = params.text.len(), "ingest called");

        let id = self.service.ingest(domain, &params.text).await;
        serde_json::to_string(&IngestResponse { id })
            .map_err(|e| format!("serialization failed: {e}"))
    }

    #[tool(description = "Restate a sentence as a neutral observation, removing emotional and judgmental words.")]
    async fn reframe(
        &self,
        Parameters(params): Parameters<ReframeParams>,
    ) -> Result<String, String> {
        tracing::info!(text_len = params.text.len(), "reframe called");
        let text = self.service.reframe(&params.text);
        serde_json::to_string(&ReframeResponse { text })
            .map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for SuggestTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Phrase suggestions for a guided journal. Use suggest to fill a prompt, \
                 ingest to remember what the user chose, and reframe to restate a \
                 charged sentence neutrally."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
