use std::io::Write;
use log::{info, error};
use env_logger::Env;
use tokio_util::sync::CancellationToken;
use streamrelay::streamrelay::config::RelayConfig;
use streamrelay::streamrelay::init;

const DEFAULT_CONFIG: &str = "config.toml";

fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}:{}] {} - {}",
                buf.timestamp_millis(),
                record.module_path().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_logger();

    info!("streamrelay starting up");

    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = if std::path::Path::new(&path).exists() {
        match RelayConfig::from_toml_file(&path) {
            Ok(config) => {
                info!("Configuration loaded from {}", path);
                config
            },
            Err(e) => {
                error!("Failed to load configuration: {}", e.message());
                return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
            }
        }
    } else {
        info!("No configuration at {}, using defaults", path);
        RelayConfig::default()
    };

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested");
                on_signal.cancel();
            },
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    if let Err(e) = init(config, shutdown).await {
        error!("❌ Error in relay: {e}");
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }

    Ok(())
}
