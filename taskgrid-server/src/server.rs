//! HTTP listener and accept loop

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes;
use crate::state::AppState;

/// A bound server, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Builds the state and binds the configured address.
    ///
    /// Port `0` picks a free port; see [`Server::local_addr`].
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.addr();
        let state = AppState::new(config)?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state: Arc::new(state),
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serves connections until `shutdown` is cancelled.
    ///
    /// In-flight connections are left to finish on their own tasks.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let addr = self.local_addr()?;
        log::info!("server listening on http://{}", addr);

        let cleanup = self.state.limiter.spawn_cleanup(shutdown.child_token());

        loop {
            let (stream, remote) = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        log::warn!("accept failed: {}", e);
                        continue;
                    }
                },
            };

            let state = self.state.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let state = state.clone();
                    async move { Ok::<_, Infallible>(routes::handle(&state, req, remote).await) }
                });

                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    // Clients closing early is routine
                    log::debug!("connection from {} ended: {}", remote, e);
                }
            });
        }

        cleanup.abort();
        log::info!("server on {} shut down", addr);
        Ok(())
    }
}

/// Cancels `shutdown` once `signal` fires.
///
/// If the signal cannot be listened for, the error is logged and the server
/// keeps running.
pub fn cancel_on_signal<F>(signal: F, shutdown: CancellationToken) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                log::info!("shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => log::error!("cannot listen for shutdown signal: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_cancels_shutdown() {
        let shutdown = CancellationToken::new();
        cancel_on_signal(async { Ok(()) }, shutdown.clone())
            .await
            .unwrap();
        assert!(shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_error_keeps_running() {
        let shutdown = CancellationToken::new();
        let failed = async { Err(io::Error::other("no signal handler")) };
        cancel_on_signal(failed, shutdown.clone()).await.unwrap();
        assert!(!shutdown.is_cancelled());
    }
}
