use std::io;

use mock_server::{DevProxy, MockBackend, Script};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// `mock-server [backend|proxy]`
///
/// backend: `PORT` (default 5000), `MOCK_SCRIPT` (JSON file of path -> reply).
/// proxy: `PORT` (default 5173), `PROXY_TARGET` (default http://localhost:5000).
#[tokio::main]
async fn main() -> Result<(), io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "backend".to_string());
    match mode.as_str() {
        "backend" => {
            let backend = match std::env::var("MOCK_SCRIPT") {
                Ok(path) => MockBackend::with_script(load_script(&path).await?),
                Err(_) => MockBackend::new(),
            };
            let listener = bind("5000").await?;
            mock_server::run(listener, backend).await
        }
        "proxy" => {
            let proxy = match std::env::var("PROXY_TARGET") {
                Ok(target) => DevProxy::new(&target),
                Err(_) => DevProxy::default(),
            };
            let listener = bind("5173").await?;
            tracing::info!(
                prefix = %proxy.prefix,
                target = proxy.target_authority().unwrap_or(proxy.target.as_str()),
                "forwarding"
            );
            mock_server::run_proxy(listener, proxy).await
        }
        other => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown mode {other:?}, expected \"backend\" or \"proxy\""),
        )),
    }
}

async fn bind(default_port: &str) -> Result<TcpListener, io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| default_port.to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    Ok(listener)
}

async fn load_script(path: &str) -> Result<Script, io::Error> {
    let raw = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
