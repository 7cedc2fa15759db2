//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that build the
//! suggestion service and hand it to the MCP tool handler.

use crate::tools::SuggestTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::Arc;
use tja_suggest::config::TjaConfig;
use tja_suggest::suggest::SuggestionService;

/// Build the shared service. The model loads on the first tool call, not here,
/// so the transport is up before the model is.
fn setup_shared_state(config: TjaConfig) -> (Arc<SuggestionService>, Arc<TjaConfig>) {
    let service = Arc::new(SuggestionService::from_config(&config));
    tracing::info!(db = %config.resolved_db_path().display(), "suggestion service ready");
    (service, Arc::new(config))
}

async fn shutdown(service: Arc<SuggestionService>) {
    match Arc::try_unwrap(service) {
        Ok(service) => service.shutdown().await,
        Err(_) => tracing::debug!("suggestion service still shared at exit, skipping shutdown"),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: TjaConfig) -> Result<()> {
    tracing::info!("starting tja MCP server on stdio");

    let (service, config) = setup_shared_state(config);

    let tools = SuggestTools::new(Arc::clone(&service), config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    shutdown(service).await;
    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: TjaConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting tja MCP server on HTTP");

    let (service, config) = setup_shared_state(config);

    let shared = Arc::clone(&service);
    let mcp = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(SuggestTools::new(Arc::clone(&shared), Arc::clone(&config))),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", mcp);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    shutdown(service).await;
    Ok(())
}
