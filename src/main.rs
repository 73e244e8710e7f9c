use std::sync::Arc;

use futures::StreamExt;

use ticket_relay::channels::{TelegramTransport, Transport};
use ticket_relay::config::BotConfig;
use ticket_relay::router::Router;
use ticket_relay::store::JsonStore;
use ticket_relay::tickets::engine::TicketEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  export TELEGRAM_BOT_TOKEN=123:ABC...");
            eprintln!("  export REVIEW_CHAT_ID=-100...");
            std::process::exit(1);
        }
    };

    eprintln!("🎫 Ticket Relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Review channel: {}", config.review_chat_id);
    eprintln!("   Ticket store: {}", config.data_file.display());
    if config.faq_url.is_empty() {
        eprintln!("   FAQ: not configured");
    } else {
        eprintln!("   FAQ: {}", config.faq_url);
    }

    let store = Arc::new(JsonStore::new(config.data_file.clone()));
    let engine = Arc::new(TicketEngine::new(store));
    let transport: Arc<dyn Transport> = Arc::new(TelegramTransport::new(config.bot_token.clone()));

    transport.health_check().await?;

    let router = Router::new(config, engine, Arc::clone(&transport));
    let mut events = transport.start().await?;

    tracing::info!("Ticket relay running");

    // One logical worker: events are handled strictly one at a time, so
    // every store cycle runs against a settled document.
    while let Some(event) = events.next().await {
        router.handle_event(event).await;
    }

    transport.shutdown().await?;
    Ok(())
}
