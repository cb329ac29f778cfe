//! ext_proc server binary
//!
//! Loads configuration (path from `SEULA_CONFIG`, defaults otherwise),
//! resolves the configured processor from the builtin registry, and serves
//! until SIGTERM or ctrl-c.

use seula::{Config, ExtProcServer, ProcessorRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::var("SEULA_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };

    let registry = ProcessorRegistry::with_builtins()?;
    let processor = registry.resolve(&config.processor, &config)?;

    ExtProcServer::new(config)
        .processor(processor)
        .stop_serving_on_shutdown_first()
        .serve()
        .await?;
    Ok(())
}
