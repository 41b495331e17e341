use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vesper_db::network::server::Server;
use vesper_db::{Vesper, VesperConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:27017".to_string());
    let db_path = env::args().nth(2).unwrap_or_else(|| "vesper_data".to_string());

    let db = Arc::new(Vesper::with_config(VesperConfig::with_path(&db_path))?);
    info!(%addr, %db_path, "starting vesperd");

    let server = Server::bind(db, &addr).await?;
    server.run().await?;

    Ok(())
}
