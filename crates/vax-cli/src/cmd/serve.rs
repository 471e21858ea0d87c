use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use vax_core::config::{Config, WarnLevel};
use vax_server::ServerState;

pub fn run(root: &Path, host: Option<String>, port: Option<u16>, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(root).context("failed to load config")?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => tracing::error!("{}", w.message),
        }
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors; run 'vax config validate'");
    }

    let catalog = super::catalog::load(root, &config)?;
    tracing::info!(rows = catalog.len(), "catalog loaded");
    let state = ServerState::new(catalog, config.session.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(async {
        tokio::select! {
            res = vax_server::serve(&config.server, state) => res.map(Some),
            _ = tokio::signal::ctrl_c() => Ok(None),
        }
    })?;

    match outcome {
        Some(reason) => {
            if json {
                print_json(&serde_json::json!({ "close_reason": reason }))?;
            } else {
                println!("Session closed: {reason}");
            }
        }
        None => println!("Interrupted."),
    }
    Ok(())
}
