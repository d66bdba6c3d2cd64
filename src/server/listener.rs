use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ServerConfig};
use crate::http::connection::{Connection, ConnectionOptions};
use crate::http::writer::Delivery;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = bind(&cfg.server).await?;
    serve(listener, cfg.connection_options(), cfg.server.max_connections).await
}

/// Binds the configured address, moving one port up after each failed attempt.
pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<TcpListener> {
    let mut addr: SocketAddr = cfg
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", cfg.listen_addr))?;

    let attempts = cfg.bind_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        debug!(%addr, attempt, "Calling bind");

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                let local = listener.local_addr()?;
                info!("Using port {}", local.port());
                return Ok(listener);
            }
            Err(e) => {
                warn!(%addr, error = %e, attempt, "Bind failed");
                last_error = Some(e);
            }
        }

        // Port 0 means the OS picks, so a retry would not change anything.
        match addr.port().checked_add(1) {
            Some(next) if addr.port() != 0 => addr.set_port(next),
            _ => break,
        }
    }

    let e = last_error
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("no bind attempt made"));
    Err(e.context(format!("could not bind {} after {} attempts", cfg.listen_addr, attempts)))
}

/// Accepts forever, running each connection in its own task.
///
/// At most `max_connections` connections are handled at once; further
/// clients wait in the listen backlog until a slot frees up.
pub async fn serve(
    listener: TcpListener,
    options: ConnectionOptions,
    max_connections: usize,
) -> anyhow::Result<()> {
    let slots = Arc::new(Semaphore::new(max_connections.max(1)));
    info!("Listening on {}", listener.local_addr()?);

    loop {
        let permit = Arc::clone(&slots).acquire_owned().await?;

        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("accept() failed: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let options = options.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let _ = supervise(peer, Connection::new(socket, options).run()).await;
        });
    }
}

/// Runs one connection handler in its own task and logs how it ended.
///
/// A panic in the handler is caught here and reported like any other
/// connection error.
pub async fn supervise<F>(peer: SocketAddr, handler: F) -> anyhow::Result<Delivery>
where
    F: Future<Output = anyhow::Result<Delivery>> + Send + 'static,
{
    let result = match tokio::spawn(handler).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(anyhow::anyhow!("connection handler panicked")),
        Err(e) => Err(anyhow::Error::from(e).context("connection handler cancelled")),
    };

    match &result {
        Ok(delivery) => info!(
            %peer,
            status = delivery.status.as_u16(),
            bytes = delivery.body_bytes,
            complete = delivery.is_complete(),
            "Connection closed"
        ),
        Err(e) => error!("Connection error from {}: {:#}", peer, e),
    }

    result
}
