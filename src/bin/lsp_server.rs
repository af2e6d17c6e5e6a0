//! Placeholder variables language server entry point
//!
//! The server communicates via stdin/stdout using JSON-RPC. All logging goes
//! to stderr so it never interferes with the protocol stream; set `RUST_LOG`
//! to change the level (default `info`).

use placeholder_vars::lsp_server::Backend;
use tower_lsp::{LspService, Server};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!(
        "Starting placeholder-vars-lsp {}",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    let server = Server::new(stdin, stdout, socket);

    tokio::select! {
        _ = server.serve(service) => {
            log::info!("Client disconnected");
        }
        _ = shutdown_signal() => {
            log::info!("Received shutdown signal");
        }
    }

    log::info!("Server stopped");
}

/// Waits for SIGINT or SIGTERM on Unix, Ctrl+C elsewhere
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigint, mut sigterm) = match (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
        ) {
            (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to install signal handlers: {}", e);
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigint.recv() => log::debug!("SIGINT"),
            _ = sigterm.recv() => log::debug!("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
