//! HTTP handlers for the transaction endpoints.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;

use crate::address::AddressCodec;
use crate::error::{ExplorerError, Result};
use crate::listing::{ListingService, Selector, DEFAULT_PAGE_LENGTH};
use crate::source::{ChainDataSource, SendOptions};
use crate::transform::{TransformOptions, TxTransformer};
use crate::view::{RawTxView, SendResultView};

pub struct AppState {
    source: Arc<dyn ChainDataSource>,
    transformer: Arc<TxTransformer>,
    listing: ListingService,
}

impl AppState {
    pub fn new(
        source: Arc<dyn ChainDataSource>,
        codec: Arc<dyn AddressCodec>,
        fetch_concurrency: usize,
    ) -> Self {
        let transformer = Arc::new(TxTransformer::new(codec));
        let listing = ListingService::new(source.clone(), transformer.clone())
            .with_fetch_concurrency(fetch_concurrency);
        Self {
            source,
            transformer,
            listing,
        }
    }
}

/// Registers the transaction routes. Mounted under the API prefix by the
/// server.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/tx/send", web::post().to(send))
        .route("/tx/sendix", web::post().to(send_instant))
        .route("/tx/{txid}", web::get().to(transaction))
        .route("/rawtx/{txid}", web::get().to(raw_transaction))
        .route("/txs", web::get().to(list));
}

#[derive(Debug, Default, Deserialize)]
pub struct TxQuery {
    pub block: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "pageNum")]
    pub page_num: Option<String>,
    #[serde(rename = "noAsm")]
    pub no_asm: Option<String>,
    #[serde(rename = "noScriptSig")]
    pub no_script_sig: Option<String>,
    #[serde(rename = "noSpent")]
    pub no_spent: Option<String>,
}

impl TxQuery {
    pub fn options(&self) -> TransformOptions {
        TransformOptions {
            no_asm: is_set(self.no_asm.as_deref()),
            no_script_sig: is_set(self.no_script_sig.as_deref()),
            no_spent: is_set(self.no_spent.as_deref()),
        }
    }

    pub fn page(&self) -> usize {
        self.page_num.as_deref().map(parse_page_num).unwrap_or(0)
    }
}

/// A flag is set by any value other than `0` or `false`, including an empty
/// one (`?noAsm`).
fn is_set(flag: Option<&str>) -> bool {
    matches!(flag, Some(value) if value != "0" && !value.eq_ignore_ascii_case("false"))
}

/// Leading decimal integer of `raw`. Non-numeric input reads as page 0 and
/// negative pages are clamped to 0.
pub fn parse_page_num(raw: &str) -> usize {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if negative {
        return 0;
    }
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0usize, |page, digit| {
            page.saturating_mul(10)
                .saturating_add(usize::from(digit - b'0'))
        })
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub rawtx: Option<String>,
}

type SendBody = web::Either<web::Json<SendRequest>, web::Form<SendRequest>>;

fn raw_hex(body: SendBody) -> Result<String> {
    let request = match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    };
    request
        .rawtx
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| ExplorerError::missing_parameter("Missing parameter (expected 'rawtx' a string)"))
}

async fn transaction(
    path: web::Path<String>,
    query: web::Query<TxQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let txid = path.into_inner();
    let tx = state
        .source
        .get_detailed_transaction(&txid)
        .await
        .map_err(ExplorerError::lookup)?;
    let view = state
        .transformer
        .transform_transaction(&tx, &query.options(), state.source.best_height())?;
    Ok(HttpResponse::Ok().json(view))
}

async fn raw_transaction(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let txid = path.into_inner();
    let bytes = state
        .source
        .get_transaction(&txid)
        .await
        .map_err(ExplorerError::lookup)?;
    Ok(HttpResponse::Ok().json(RawTxView {
        rawtx: hex::encode(bytes),
    }))
}

async fn list(query: web::Query<TxQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let selector = Selector::from_query(query.block.as_deref(), query.address.as_deref())?;
    let view = state
        .listing
        .list(&selector, query.page(), DEFAULT_PAGE_LENGTH, &query.options())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn send(body: SendBody, state: web::Data<AppState>) -> Result<HttpResponse> {
    relay(body, None, &state).await
}

async fn send_instant(body: SendBody, state: web::Data<AppState>) -> Result<HttpResponse> {
    relay(body, Some(SendOptions::instant_send()), &state).await
}

async fn relay(
    body: SendBody,
    options: Option<SendOptions>,
    state: &AppState,
) -> Result<HttpResponse> {
    let raw = raw_hex(body)?;
    let txid = state.source.send_transaction(&raw, options).await?;
    info!(
        "Relayed transaction {}{}",
        txid,
        if options.is_some() { " (InstantSend)" } else { "" }
    );
    Ok(HttpResponse::Ok().json(SendResultView { txid }))
}
