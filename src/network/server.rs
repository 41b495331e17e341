use crate::db::Vesper;
use crate::error::{Result, VesperError};
use crate::network::protocol::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// TCP server speaking the length-prefixed bincode protocol. Each
/// connection gets its own task and is served sequentially until EOF.
pub struct Server {
    db: Arc<Vesper>,
    listener: TcpListener,
}

impl Server {
    /// Binds to the address without accepting connections yet.
    pub async fn bind(db: Arc<Vesper>, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { db, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        info!(addr = %self.listener.local_addr()?, "server listening");

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let db = self.db.clone();
            tokio::spawn(async move {
                debug!(%peer, "connection accepted");
                if let Err(e) = Self::handle_connection(stream, db).await {
                    error!(%peer, error = %e, "error handling connection");
                }
            });
        }
    }

    async fn handle_connection(mut stream: TcpStream, db: Arc<Vesper>) -> Result<()> {
        loop {
            let mut len_bytes = [0u8; 4];
            match stream.read_exact(&mut len_bytes).await {
                Ok(_) => (),
                Err(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    // Client disconnected
                    break;
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_bytes) as usize;
            let mut buffer = vec![0u8; len];
            stream.read_exact(&mut buffer).await?;

            let request: Request = bincode::deserialize(&buffer).map_err(VesperError::Bincode)?;

            let response = db.handle_request(request);

            let response_bytes = bincode::serialize(&response).map_err(VesperError::Bincode)?;
            let len_bytes = (response_bytes.len() as u32).to_le_bytes();

            stream.write_all(&len_bytes).await?;
            stream.write_all(&response_bytes).await?;
        }
        Ok(())
    }
}
