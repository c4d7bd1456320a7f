//! HTTP/1.1 server loop.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http::Request;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use menagerie_config::ServerConfig;
use menagerie_core::Fault;

use crate::api::{fault_response, Api, HttpResponse};
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Serves an [`Api`] over TCP.
///
/// # Example
///
/// ```rust,ignore
/// use menagerie_server::{Api, Server};
///
/// let server = Server::new(api, &config.server);
/// server.run().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Server {
    api: Api,
    http_addr: String,
    shutdown_timeout: Duration,
}

impl Server {
    /// Creates a server for `api` using the listen address and shutdown
    /// timeout from `config`.
    #[must_use]
    pub fn new(api: Api, config: &ServerConfig) -> Self {
        Self {
            api,
            http_addr: config.http_addr.clone(),
            shutdown_timeout: Duration::from_secs(config.shutdown_timeout_secs),
        }
    }

    /// Overrides the drain timeout.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Returns the API being served.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.api
    }

    /// Runs until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr: SocketAddr = self
            .http_addr
            .parse()
            .map_err(|_| ServerError::InvalidAddress(self.http_addr.clone()))?;

        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Accepts connections on `listener` until `shutdown` fires, then waits
    /// up to the shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, mount_path = self.api.mount_path(), "Server listening");
        }

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let api = self.api.clone();
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(api, stream, shutdown).await {
                                tracing::debug!(%remote_addr, "Connection error: {}", e);
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!("Failed to accept connection: {}", e),
                },

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        tracing::info!(
            timeout = ?self.shutdown_timeout,
            connections = tracker.active_connections(),
            "Draining connections"
        );

        if tokio::time::timeout(self.shutdown_timeout, tracker.wait_for_drain())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = tracker.active_connections(),
                "Shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("Server stopped");
    }
}

async fn serve_connection(
    api: Api,
    stream: TcpStream,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let service = service_fn(move |req: Request<Incoming>| {
        let api = api.clone();
        async move { Ok::<_, Infallible>(handle_request(&api, req).await) }
    });

    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => result,
        () = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.await
        }
    }
}

async fn handle_request(api: &Api, req: Request<Incoming>) -> HttpResponse {
    let (parts, body) = req.into_parts();

    let body: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::warn!("Failed to read request body: {}", e);
            return fault_response(&Fault::malformed_body(e.to_string()));
        }
    };

    api.handle(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use menagerie_core::Action;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn server(addr: &str) -> Server {
        let api = Api::builder()
            .route(Method::GET, "/books", Action::builder("getBooks").build())
            .unwrap()
            .build();
        let config = ServerConfig {
            http_addr: addr.to_string(),
            ..ServerConfig::default()
        };
        Server::new(api, &config).with_shutdown_timeout(Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let result = server("not-an-address")
            .run_with_shutdown(ShutdownSignal::new())
            .await;
        assert!(matches!(result, Err(ServerError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_stops_on_shutdown() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server("127.0.0.1:0").run_with_shutdown(shutdown),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(server("127.0.0.1:0").serve(listener, shutdown.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /books HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
        assert!(raw.contains("content-type: application/json"));
        assert!(raw.contains("x-request-id: "));
        assert!(raw.ends_with("{}"));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
