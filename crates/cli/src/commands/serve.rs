//! `distillery serve`: Start the chat gateway.

use distillery_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ANTHROPIC_API_KEY=sk-ant-...");
        eprintln!("    DISTILLERY_API_KEY=sk-ant-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    println!("Distillery Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.model);
    println!("   Origin:    {}", config.gateway.allowed_origin);

    distillery_gateway::start(config).await?;

    Ok(())
}
