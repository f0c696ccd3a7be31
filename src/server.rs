//! HTTP server wiring.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::{Context, Result};
use log::{info, warn};

use crate::address::Base58Codec;
use crate::config::Config;
use crate::controller::{self, AppState};
use crate::source::{ChainDataSource, MemoryChainSource};

/// `*` allows any origin, otherwise a comma separated origin list. Without a
/// setting only local origins are allowed.
pub fn configure_cors(cors: Option<&str>) -> Cors {
    match cors {
        Some("*") => Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header(),
        Some(origins) => origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header(),
        None => Cors::default()
            .allowed_origin_fn(|origin, _| {
                origin
                    .to_str()
                    .map(|origin| {
                        origin.starts_with("http://localhost:")
                            || origin.starts_with("http://127.0.0.1:")
                    })
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header(),
    }
}

fn load_source(config: &Config) -> Result<Arc<dyn ChainDataSource>> {
    let source = match &config.snapshot {
        Some(path) => MemoryChainSource::from_snapshot_file(path)
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        None => {
            warn!("No snapshot configured, serving an empty chain");
            MemoryChainSource::new(0)
        }
    };
    Ok(Arc::new(source))
}

pub async fn run(config: Config) -> Result<()> {
    config.validate()?;

    let source = load_source(&config)?;
    let codec = Arc::new(Base58Codec::new(config.network.params()));
    let state = web::Data::new(AppState::new(
        source,
        codec,
        config.block_fetch_concurrency,
    ));

    info!(
        "Serving {} transactions at http://{}:{}{}",
        config.network, config.host, config.port, config.api_prefix
    );

    let prefix = config.api_prefix.clone();
    let cors = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(configure_cors(cors.as_deref()))
            .wrap(Logger::default())
            .service(web::scope(&prefix).configure(controller::configure))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("binding {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
