//! Local static file server for interpreter pages and story files.

use crate::error::{CliError, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};
use url::Url;

/// Serves a directory over HTTP on the loopback interface until shut down.
pub struct StaticServer {
    addr: SocketAddr,
    root: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl StaticServer {
    /// Binds `127.0.0.1:port` and starts serving `root`. Port 0 picks a free
    /// port; [`StaticServer::base_url`] reports the one chosen.
    ///
    /// # Errors
    ///
    /// `Server` if the port cannot be bound.
    pub async fn start(root: &Path, port: u16) -> Result<Self> {
        let addr: SocketAddr = ([127, 0, 0, 1], port).into();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("cannot bind {addr}: {e}")))?;
        let addr = listener.local_addr()?;

        let app = Router::new().fallback_service(ServeDir::new(root));
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = rx.await;
            });
            if let Err(e) = served.await {
                warn!("static server stopped: {e}");
            }
        });

        info!("serving {} at http://{addr}/", root.display());
        Ok(Self {
            addr,
            root: root.to_path_buf(),
            shutdown: Some(tx),
            task,
        })
    }

    /// Root URL of the server, with a trailing slash.
    ///
    /// # Errors
    ///
    /// Never in practice; the address is always a valid host.
    pub fn base_url(&self) -> Result<Url> {
        Ok(regtest::server_url(self.addr.port())?)
    }

    /// The served directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stops accepting connections and waits for the server task.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            debug!("static server task ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn serves_files_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("story.ulx"), "GLUL").unwrap();

        let server = StaticServer::start(dir.path(), 0).await.unwrap();
        let addr = server.addr;
        assert_ne!(addr.port(), 0);
        assert_eq!(
            server.base_url().unwrap().as_str(),
            format!("http://127.0.0.1:{}/", addr.port())
        );

        let found = get(addr, "/story.ulx").await;
        assert!(found.starts_with("HTTP/1.1 200"), "{found}");
        assert!(found.ends_with("GLUL"));

        let missing = get(addr, "/nope.ulx").await;
        assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn busy_port_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let first = StaticServer::start(dir.path(), 0).await.unwrap();
        let port = first.addr.port();

        let err = StaticServer::start(dir.path(), port).await.err().unwrap();
        assert!(matches!(err, CliError::Server(_)));

        first.shutdown().await;
    }
}
