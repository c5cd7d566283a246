use std::net::SocketAddr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ticket_server::cache::CachedSegmentSource;
use ticket_server::config::AppConfig;
use ticket_server::nlq::ChatClient;
use ticket_server::provider::TicketClient;
use ticket_server::routing::RouterConfig;
use ticket_server::turn::TurnEngine;
use ticket_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ticket_server=info")),
        )
        .init();

    let config = AppConfig::load().expect("failed to load configuration");

    let client = TicketClient::new(config.provider.clone()).expect("failed to create ticket client");
    let source = CachedSegmentSource::new(client, &config.cache);

    // The interpreter is optional; without it every natural-language path
    // runs on the deterministic fallback rules.
    let interpreter = match config.interpreter.clone() {
        Some(interpreter_config) => match ChatClient::new(interpreter_config) {
            Ok(client) => {
                info!("interpretation service configured");
                Some(client)
            }
            Err(e) => {
                warn!(error = %e, "interpreter setup failed, using local rules only");
                None
            }
        },
        None => {
            info!("no interpretation service configured, using local rules only");
            None
        }
    };

    let engine = TurnEngine::new(source, interpreter, RouterConfig::default());
    let state = AppState::new(engine);
    let app = create_router(state);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .expect("invalid bind address in configuration");
    info!(%addr, "ticket query server listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
