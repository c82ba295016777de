use anyhow::Result;
use discovery::settings;
use sql_connection::connect_postgres_db;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Applying discovery schema");
    let db = connect_postgres_db(&settings::postgres()).await?;
    let client = db.get_client().await?;
    client.batch_execute(events_dao::SCHEMA_SQL).await?;
    info!("Schema is up to date");

    Ok(())
}
