pub mod commands;
pub mod config;
pub mod dice;
pub mod dispatcher;
pub mod kv;
pub mod net;
pub mod parser;
pub mod router;
pub mod sender;
pub mod store;
pub mod types;
pub mod verifier;

use std::sync::Arc;

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use commands::SubscriptionCommandHandler;
use config::RelayConfig;
use dispatcher::NotificationDispatcher;
use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
use net::console::run_console;
use net::server::run_webhook_server;
use net::webhook::WebhookState;
use router::CommandRouter;
use sender::{LogSender, MessageSender};
use store::SubscriberStore;
use types::Recipient;

/// Opens the configured backing store
pub fn open_backend(config: &RelayConfig) -> Result<Arc<dyn KeyValueStore>> {
    match &config.store.path {
        Some(path) => {
            let backend = FileKeyValueStore::open(path)?;
            info!("Subscriptions are persisted to {}", backend.path().display());
            Ok(Arc::new(backend))
        }
        None => {
            warn!("No store path configured, subscriptions will not survive a restart");
            Ok(Arc::new(MemoryKeyValueStore::new()))
        }
    }
}

/// Starts the webhook listener and the console command loop; returns once `shutdown` fires
pub async fn init(config: RelayConfig, shutdown: CancellationToken) -> Result<()> {
    let store = Arc::new(SubscriberStore::new(open_backend(&config)?));
    let sender: Arc<dyn MessageSender> = Arc::new(LogSender);

    let dispatcher = Arc::new(NotificationDispatcher::new(
        store.clone(),
        sender.clone(),
        config.delivery.timeout(),
    ));

    let subscriptions = Arc::new(SubscriptionCommandHandler::new(
        store,
        config.subscriptions.trigger.clone(),
        config.subscriptions.normalize_topics,
    ));
    let router = Arc::new(CommandRouter::new(subscriptions, &config.subscriptions.trigger));

    let caller = if config.console.group {
        Recipient::Group(config.console.handle.clone())
    } else {
        Recipient::Individual(config.console.handle.clone())
    };
    let console_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        if let Err(e) = run_console(stdin, router, sender, caller, console_shutdown).await {
            warn!("Console loop stopped: {}", e);
        }
    });

    info!("Relay initialised, listening for webhooks on {}", config.server.addr);
    run_webhook_server(&config.server.addr, WebhookState { dispatcher }, shutdown).await?;
    Ok(())
}
