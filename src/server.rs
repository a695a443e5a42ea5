// src/server.rs
// Wires configuration into the router and serves it

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::{AppState, create_router};
use crate::chat::{ChatService, ModelCandidate};
use crate::llm::{GeminiClient, ModelProvider};
use crate::persistence::{MessageLog, SupabaseMessageLog};

/// Fully resolved settings for `serve`
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub request_timeout: Duration,
    pub supabase: Option<(String, String)>,
}

/// Build the shared state. A missing key leaves the provider unset so chat
/// requests fail with a configuration error instead of stopping startup.
pub fn build_state(settings: &ServerSettings) -> AppState {
    let provider = settings.api_key.as_ref().map(|key| {
        Arc::new(GeminiClient::with_base_url(
            key.clone(),
            settings.base_url.clone(),
            settings.request_timeout,
        )) as Arc<dyn ModelProvider>
    });
    if provider.is_none() {
        warn!("GEMINI_API_KEY is not set; chat requests will fail until it is configured");
    }

    let chat = ChatService::with_candidates(ModelCandidate::from_names(&settings.models));
    let state = AppState::new(provider, chat);

    match &settings.supabase {
        Some((url, key)) => {
            let log = Arc::new(SupabaseMessageLog::new(url.clone(), key.clone())) as Arc<dyn MessageLog>;
            state.with_message_log(log)
        }
        None => state,
    }
}

/// Run the HTTP server
pub async fn run(settings: ServerSettings) -> Result<()> {
    let state = build_state(&settings);
    let candidates: Vec<String> = state.chat.candidates().iter().map(|c| c.name.clone()).collect();
    let message_log = state.message_log.is_some();

    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;

    info!(%addr, ?candidates, message_log, "Server listening");
    println!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
