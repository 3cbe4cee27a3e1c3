use anyhow::Result;
use shelfscan_app::bootstrap;
use shelfscan_app::commands;
use shelfscan_app::config::Config;
use shelfscan_app::repl::Repl;
use shelfscan_client::WarehouseClient;
use shelfscan_interfaces::TerminalInterface;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SHELFSCAN_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match (args.get(1).map(String::as_str), args.get(2).map(String::as_str)) {
        (Some("config"), Some("reset")) => return handle_config_reset(),
        (Some("health"), _) => return commands::health::run().await,
        _ => {}
    }

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              Shelfscan Warehouse Terminal                        ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = if Config::exists() {
        match Config::load() {
            Ok(cfg) => {
                if let Err(e) = cfg.validate() {
                    eprintln!("❌ Invalid configuration: {}", e);
                    eprintln!("💡 Tip: Run 'shelfscan config reset' to reconfigure");
                    return Err(e);
                }
                cfg
            }
            Err(e) => {
                eprintln!("❌ Failed to load config: {}", e);
                eprintln!("💡 Tip: Run 'shelfscan config reset' to reconfigure");
                return Err(e);
            }
        }
    } else {
        match bootstrap::run_bootstrap() {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("❌ Bootstrap failed: {}", e);
                return Err(e);
            }
        }
    };

    init_tracing(&config);

    let client = Arc::new(WarehouseClient::new(
        config.base_url(),
        config.request_timeout(),
        config.max_retries,
    ));
    println!("🌐 Server: {}", client.base_url());
    println!();

    let interface = Arc::new(TerminalInterface::new());
    let repl = Repl::new(interface, client)
        .with_default_username(config.username.clone())
        .with_repeat_window(config.repeat_suppression());

    repl.run().await
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_config_reset() -> Result<()> {
    if Config::reset()? {
        println!("✅ Configuration removed: {}", Config::path().display());
        println!("Run 'shelfscan' to set it up again.");
    } else {
        println!("ℹ️  No configuration found at {}", Config::path().display());
    }
    Ok(())
}
