//! sumY Tactical Command - voice-driven unit control over a live agent session

use anyhow::Result;
use std::path::PathBuf;
use sumy_command::config::SumyConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Optional path to a TOML config file
const CONFIG_ENV: &str = "SUMY_CONFIG";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sumy_command=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sumY tactical command");

    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let config = SumyConfig::load(config_path.as_deref())?;
    config.validate()?;
    info!("Configuration: {:?}", config);

    run(config)
}

#[cfg(feature = "audio-io")]
fn run(config: SumyConfig) -> Result<()> {
    let session = sumy_command::session::Session::with_defaults(config);
    sumy_command::ui::run(session).map_err(|e| anyhow::anyhow!("UI error: {}", e))
}

#[cfg(not(feature = "audio-io"))]
fn run(_config: SumyConfig) -> Result<()> {
    anyhow::bail!("built without the `audio-io` feature; no audio backend available")
}
