use anyhow::Context;
use std::path::Path;
use upstac_core::config::{Config, WarnLevel};

pub fn run(root: &Path, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load(root)?;

    let warnings = config.validate();
    for w in &warnings {
        tracing::warn!("config: {}", w.message);
    }
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("refusing to serve with config errors; run `upstac user check`");
    }
    if config.users.is_empty() {
        tracing::warn!("no users configured; every request will be rejected");
    }

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
            .await
            .with_context(|| format!("failed to bind {host}:{port}"))?;
        let addr = listener.local_addr()?;
        println!("upstac '{}' serving on http://{addr}", config.project.name);

        tokio::select! {
            res = upstac_server::serve_on(root_buf, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
