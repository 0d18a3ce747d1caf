use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use log::{error, info};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub use service::TraceService;

use crate::dto::ConnectionInfo;
use thiserror::Error;

mod service;

// Answers every request with an empty 200 after tracing it
pub struct TraceServer {
    addr: SocketAddr,
}

impl TraceServer {
    pub fn builder() -> TraceServerBuilder {
        TraceServerBuilder::default()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.addr).await?;

        info!("Listening on {}", self.addr);

        loop {
            let (stream, remote) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("failed to accept connection: {:?}", e);
                    continue;
                }
            };
            let local = match stream.local_addr() {
                Ok(local) => local,
                Err(e) => {
                    error!("failed to read local address of {}: {:?}", remote, e);
                    continue;
                }
            };
            let io = TokioIo::new(stream);

            let service = TraceService::new(ConnectionInfo {
                remote,
                local,
                secure: false,
            });
            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .preserve_header_case(true)
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {err}");
                }
            });
        }
    }
}

#[derive(Default)]
pub struct TraceServerBuilder {
    host: Option<String>,
    port: Option<u16>,
    addr: Option<SocketAddr>,
}

impl TraceServerBuilder {
    pub fn new() -> TraceServerBuilder {
        TraceServerBuilder::default()
    }

    pub fn with_host(mut self, host: String) -> TraceServerBuilder {
        self.host = Some(host);
        self
    }

    pub fn with_port(mut self, port: u16) -> TraceServerBuilder {
        self.port = Some(port);
        self
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> TraceServerBuilder {
        self.addr = Some(addr);
        self
    }

    pub fn build(self) -> Result<TraceServer, BuildError> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => {
                let host = self.host.ok_or(BuildError::NoHost)?;
                let port = self.port.ok_or(BuildError::NoPort)?;
                let host = host.parse().map_err(|_| BuildError::InvalidHost)?;
                SocketAddr::new(host, port)
            }
        };

        Ok(TraceServer { addr })
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("host is not specified")]
    NoHost,

    #[error("given host is not a valid ip")]
    InvalidHost,

    #[error("connection port is not specified")]
    NoPort,
}
