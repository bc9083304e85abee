mod cli;
mod config;
mod error;
mod exchange;
mod gateway;
mod logger;
mod types;

use config::Config;
use dotenv::dotenv;
use exchange::BinanceFuturesClient;
use gateway::OrderGateway;
use log::error;
use std::error::Error;
use std::io;

async fn run() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let config = Config::from_env()?;
    logger::init_logger(config.log_file.as_deref())?;

    let client = BinanceFuturesClient::new(&config)?;
    let gateway = OrderGateway::new(client);

    let stdin = io::stdin();
    if let Err(e) = cli::run(stdin.lock(), io::stdout(), &gateway, config.testnet).await {
        error!("aborted: {}", e);
        return Err(e.into());
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
