use crate::config::Config;
use anyhow::Result;
use std::io::{self, Write};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub fn run_bootstrap() -> Result<Config> {
    println!("\nNo warehouse server configured.");
    print!("Server URL [{}]: ", DEFAULT_BASE_URL);
    io::stdout().flush()?;

    let mut base_url = String::new();
    io::stdin().read_line(&mut base_url)?;
    let base_url = match base_url.trim() {
        "" => DEFAULT_BASE_URL.to_string(),
        url => url.to_string(),
    };

    print!("Default username (optional): ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;

    let config = build_config(&base_url, username.trim())?;
    config.save()?;
    println!("✅ Configuration saved to {}", Config::path().display());

    Ok(config)
}

/// Validated config from the bootstrap answers.
pub fn build_config(base_url: &str, username: &str) -> Result<Config> {
    let mut config = Config::new(base_url.trim_end_matches('/'));
    if !username.is_empty() {
        config.username = Some(username.to_string());
    }
    config.validate()?;
    Ok(config)
}
