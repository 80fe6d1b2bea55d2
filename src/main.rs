use jsonrpc_mock::{
    config::ServerConfig,
    fixtures::{load_fixtures, Fixtures},
    logging, MockJsonRpcServer,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = ServerConfig::from_env()?;
    let fixtures = match &config.fixtures_path {
        Some(path) => load_fixtures(path)?,
        None => Fixtures::new(),
    };

    let server = MockJsonRpcServer::start_with_config(&config).await?;
    info!(
        url = server.url(),
        methods = fixtures.len(),
        "serving canned JSON-RPC responses"
    );
    server.install_fixtures(fixtures);

    tokio::signal::ctrl_c().await?;
    info!(counts = ?server.call_counts(), "shutting down");
    server.shutdown().await;
    Ok(())
}
