use std::path::PathBuf;

use clap::Parser;
use filegate::config::Config;
use filegate::server;

/// Serves files from a directory to one-line HTTP GET requests.
#[derive(Parser)]
#[command(name = "filegate", version, about, long_about = None)]
struct Cli {
    /// Log level: 0=error 1=warn 2=info 3=debug 4=trace
    #[arg(short = 'd', long = "debug")]
    debug: Option<u8>,

    /// YAML configuration file
    #[arg(short, long, env = "FILEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the configured address's port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory files are served from
    #[arg(short, long)]
    root: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load(),
        };

        if let Some(level) = self.debug {
            cfg.log_level = level;
        }
        if let Some(port) = self.port {
            let host = cfg
                .server
                .listen_addr
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            cfg.server.listen_addr = format!("{}:{}", host, port);
        }
        if let Some(root) = self.root {
            cfg.static_files.root = root;
        }

        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Cli::parse().into_config()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.max_log_level())
        .init();

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
