use anyhow::Result;
use clap::Parser;
use insight_txs::config::Config;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::parse();
    insight_txs::server::run(config).await
}
