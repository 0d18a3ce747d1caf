use dotenv::dotenv;
use request_trace::config::Config;
use request_trace::server::TraceServer;
use simplelog::SimpleLogger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    let config = Config::from_env()?;

    SimpleLogger::init(config.log_level(), simplelog::Config::default())?;

    let server = TraceServer::builder().with_addr(config.addr()).build()?;

    server.serve().await
}
