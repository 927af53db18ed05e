use barangay_portal::{config::Config, server::Server, setup::setup, telemetry};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        redis = config.redis.is_some(),
        "Loaded configuration"
    );

    let state = setup(&config).await?;
    let server = Server::new(state, &config.server).await?;
    tracing::info!("Barangay portal API ready on port {}", server.port()?);
    server.run().await
}
