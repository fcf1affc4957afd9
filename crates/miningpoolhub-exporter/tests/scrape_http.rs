//! End-to-end scrapes: real router, real HTTP clients, in-process fake upstreams.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use miningpoolhub_exporter::{app_state::AppState, config::ExporterConfig, router};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Default, Debug)]
struct Seen {
    api_key: Option<String>,
    fsym: Option<String>,
    tsyms: Option<String>,
    user_agent: Option<String>,
}

#[derive(Clone)]
struct Upstream {
    pool_calls: Arc<AtomicUsize>,
    price_calls: Arc<AtomicUsize>,
    pool_status: StatusCode,
    pool_body: String,
    /// Per api key bodies, falling back to `pool_body`.
    pool_bodies: HashMap<String, String>,
    pool_delay: Duration,
    price_status: StatusCode,
    price_body: String,
    seen: Arc<Mutex<Seen>>,
}

impl Upstream {
    fn new(pool_body: &str, price_body: &str) -> Self {
        Self {
            pool_calls: Arc::default(),
            price_calls: Arc::default(),
            pool_status: StatusCode::OK,
            pool_body: pool_body.to_string(),
            pool_bodies: HashMap::new(),
            pool_delay: Duration::ZERO,
            price_status: StatusCode::OK,
            price_body: price_body.to_string(),
            seen: Arc::default(),
        }
    }

    fn pool_calls(&self) -> usize {
        self.pool_calls.load(Ordering::SeqCst)
    }

    fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }
}

async fn fake_pool(
    State(u): State<Upstream>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    u.pool_calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(q.get("page").map(String::as_str), Some("api"));
    assert_eq!(q.get("action").map(String::as_str), Some("getuserallbalances"));
    {
        let mut seen = u.seen.lock().unwrap();
        seen.api_key = q.get("api_key").cloned();
        seen.user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }
    if !u.pool_delay.is_zero() {
        tokio::time::sleep(u.pool_delay).await;
    }
    let body = q
        .get("api_key")
        .and_then(|k| u.pool_bodies.get(k))
        .unwrap_or(&u.pool_body)
        .clone();
    (u.pool_status, body).into_response()
}

async fn fake_price(State(u): State<Upstream>, Query(q): Query<HashMap<String, String>>) -> Response {
    u.price_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut seen = u.seen.lock().unwrap();
        seen.fsym = q.get("fsym").cloned();
        seen.tsyms = q.get("tsyms").cloned();
    }
    (u.price_status, u.price_body.clone()).into_response()
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the fake upstreams and an exporter pointed at them.
async fn start(up: &Upstream, tweak: impl FnOnce(&mut ExporterConfig)) -> SocketAddr {
    let upstream = Router::new()
        .route("/index.php", get(fake_pool))
        .route("/data/price", get(fake_price))
        .with_state(up.clone());
    let up_addr = spawn(upstream).await;

    let mut cfg = ExporterConfig::default();
    cfg.upstream.pool_url = format!("http://{up_addr}");
    cfg.upstream.price_url = format!("http://{up_addr}");
    tweak(&mut cfg);
    cfg.validate().unwrap();

    let state = AppState::new(cfg).unwrap();
    spawn(router::build_router(state)).await
}

fn samples(body: &str) -> Vec<&str> {
    body.lines().filter(|l| !l.is_empty() && !l.starts_with('#')).collect()
}

fn balances(records: &str) -> String {
    format!(r#"{{"getuserallbalances":{{"version":"1.0.0","runtime":3.2,"data":[{records}]}}}}"#)
}

const BITCOIN: &str =
    r#"{"coin":"bitcoin","confirmed":1.5,"unconfirmed":0,"ae_confirmed":0,"ae_unconfirmed":0,"exchange":0}"#;

#[tokio::test]
async fn scrape_emits_raw_and_converted_balances() {
    let up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000}"#);
    let addr = start(&up, |_| {}).await;

    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY&fiat=EUR")).await.unwrap();
    assert_eq!(res.status(), 200);
    let ct = res.headers()[reqwest::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(ct.starts_with("text/plain; version=0.0.4"), "{ct}");
    let body = res.text().await.unwrap();

    let lines = samples(&body);
    assert_eq!(lines.len(), 11, "{body}");
    assert!(lines.contains(&format!(r#"miningpoolhub_info{{version="{VERSION}"}} 1"#).as_str()));
    assert!(lines.contains(
        &r#"miningpoolhub_balance{coin="bitcoin",symbol="BTC",wallet="normal",status="confirmed"} 1.5"#
    ));
    assert!(lines.contains(
        &r#"miningpoolhub_balance_converted{coin="bitcoin",symbol="BTC",wallet="normal",status="confirmed"} 0.00005"#
    ));
    assert!(lines.contains(
        &r#"miningpoolhub_balance{coin="bitcoin",symbol="BTC",wallet="exchange",status="confirmed"} 0"#
    ));
    assert!(!body.contains(r#"wallet="exchange",status="unconfirmed""#));
    assert!(body.contains("# TYPE miningpoolhub_balance_converted gauge"));

    let seen = up.seen.lock().unwrap();
    assert_eq!(seen.api_key.as_deref(), Some("KEY"));
    assert_eq!(seen.fsym.as_deref(), Some("EUR"));
    assert_eq!(seen.tsyms.as_deref(), Some("BTC"));
    assert_eq!(seen.user_agent.as_deref(), Some("miningpoolhub-exporter"));
}

#[tokio::test]
async fn missing_apikey_is_rejected_before_upstream() {
    let up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000}"#);
    let addr = start(&up, |_| {}).await;

    for url in [format!("http://{addr}/metrics"), format!("http://{addr}/metrics?apikey=&fiat=EUR")] {
        let res = reqwest::get(url).await.unwrap();
        assert_eq!(res.status(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], "BAD_REQUEST");
    }
    assert_eq!(up.pool_calls(), 0);
    assert_eq!(up.price_calls(), 0);
}

#[tokio::test]
async fn pool_error_yields_empty_scrape() {
    let mut up = Upstream::new("oops", r#"{"BTC":30000}"#);
    up.pool_status = StatusCode::INTERNAL_SERVER_ERROR;
    let addr = start(&up, |_| {}).await;

    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(samples(&res.text().await.unwrap()).is_empty());
    assert_eq!(up.pool_calls(), 1);
    assert_eq!(up.price_calls(), 0);
}

#[tokio::test]
async fn price_error_after_balances_yields_empty_scrape() {
    let mut up = Upstream::new(&balances(BITCOIN), "unavailable");
    up.price_status = StatusCode::SERVICE_UNAVAILABLE;
    let addr = start(&up, |_| {}).await;

    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(samples(&res.text().await.unwrap()).is_empty());
    assert_eq!(up.pool_calls(), 1);
    assert_eq!(up.price_calls(), 1);
}

#[tokio::test]
async fn empty_price_object_keeps_raw_balances() {
    let up = Upstream::new(&balances(BITCOIN), "{}");
    let addr = start(&up, |_| {}).await;

    let body = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap().text().await.unwrap();
    let lines = samples(&body);
    assert_eq!(lines.len(), 6, "{body}");
    assert!(!body.contains("miningpoolhub_balance_converted"));
    assert_eq!(up.price_calls(), 1);
}

#[tokio::test]
async fn malformed_pool_body_yields_empty_scrape() {
    let up = Upstream::new("Access denied", r#"{"BTC":30000}"#);
    let addr = start(&up, |_| {}).await;

    let body = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap().text().await.unwrap();
    assert!(samples(&body).is_empty());
    assert_eq!(up.price_calls(), 0);
}

#[tokio::test]
async fn price_error_envelope_yields_empty_scrape() {
    let up = Upstream::new(
        &balances(BITCOIN),
        r#"{"Response":"Error","Message":"fsym param seems to be missing.","Type":1}"#,
    );
    let addr = start(&up, |_| {}).await;

    let body = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap().text().await.unwrap();
    assert!(samples(&body).is_empty());
}

#[tokio::test]
async fn slow_pool_times_out() {
    let mut up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000}"#);
    up.pool_delay = Duration::from_secs(4);
    let addr = start(&up, |cfg| cfg.upstream.timeout_secs = 1).await;

    let started = Instant::now();
    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(samples(&res.text().await.unwrap()).is_empty());
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(up.price_calls(), 0);
}

#[tokio::test]
async fn unknown_coin_gets_raw_balances_and_symbols_are_deduplicated() {
    let records = [
        r#"{"coin":"dogecoin","confirmed":2,"unconfirmed":0,"ae_confirmed":0,"ae_unconfirmed":0,"exchange":0}"#,
        r#"{"coin":"digibyte","confirmed":50,"unconfirmed":0,"ae_confirmed":0,"ae_unconfirmed":0,"exchange":0}"#,
        r#"{"coin":"digibyte-skein","confirmed":100,"unconfirmed":0,"ae_confirmed":0,"ae_unconfirmed":0,"exchange":0}"#,
    ]
    .join(",");
    let up = Upstream::new(&balances(&records), r#"{"DGB":100}"#);
    let addr = start(&up, |_| {}).await;

    let body = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap().text().await.unwrap();
    let lines = samples(&body);

    // info + 3 coins * 5 raw + 2 known coins * 5 converted
    assert_eq!(lines.len(), 1 + 15 + 10, "{body}");
    assert!(lines.contains(
        &r#"miningpoolhub_balance{coin="dogecoin",symbol="",wallet="normal",status="confirmed"} 2"#
    ));
    assert!(!body.contains(r#"miningpoolhub_balance_converted{coin="dogecoin""#));
    assert!(lines.contains(
        &r#"miningpoolhub_balance_converted{coin="digibyte-skein",symbol="DGB",wallet="normal",status="confirmed"} 1"#
    ));
    assert_eq!(up.seen.lock().unwrap().tsyms.as_deref(), Some("DGB"));
}

#[tokio::test]
async fn conversion_alias_and_default_fiat() {
    let up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000}"#);
    let addr = start(&up, |cfg| cfg.scrape.default_fiat = "chf".into()).await;

    reqwest::get(format!("http://{addr}/metrics?apikey=KEY&conversion=usd")).await.unwrap();
    assert_eq!(up.seen.lock().unwrap().fsym.as_deref(), Some("USD"));

    reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap();
    assert_eq!(up.seen.lock().unwrap().fsym.as_deref(), Some("CHF"));

    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY&fiat=%22x%22")).await.unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn concurrent_scrapes_do_not_share_samples() {
    let mut up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000,"LTC":0.02}"#);
    up.pool_bodies.insert(
        "LTCKEY".into(),
        balances(r#"{"coin":"litecoin","confirmed":4,"unconfirmed":0,"ae_confirmed":0,"ae_unconfirmed":0,"exchange":0}"#),
    );
    let addr = start(&up, |_| {}).await;

    let a = reqwest::get(format!("http://{addr}/metrics?apikey=BTCKEY"));
    let b = reqwest::get(format!("http://{addr}/metrics?apikey=LTCKEY"));
    let (a, b) = tokio::join!(a, b);
    let a = a.unwrap().text().await.unwrap();
    let b = b.unwrap().text().await.unwrap();

    assert!(a.contains(r#"coin="bitcoin""#) && !a.contains(r#"coin="litecoin""#));
    assert!(b.contains(r#"coin="litecoin""#) && !b.contains(r#"coin="bitcoin""#));
    assert_eq!(samples(&a).len(), 11);
    assert_eq!(samples(&b).len(), 11);
}

#[tokio::test]
async fn landing_and_health_routes() {
    let up = Upstream::new(&balances(BITCOIN), r#"{"BTC":30000}"#);
    let addr = start(&up, |cfg| cfg.web.telemetry_path = "/scrape".into()).await;

    let landing = reqwest::get(format!("http://{addr}/")).await.unwrap().text().await.unwrap();
    assert!(landing.contains("MiningPoolHub Exporter"));
    assert!(landing.contains("/scrape?apikey=apikey"));

    let health = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await.unwrap(), "ok");

    let res = reqwest::get(format!("http://{addr}/scrape?apikey=KEY")).await.unwrap();
    assert_eq!(samples(&res.text().await.unwrap()).len(), 11);
    let res = reqwest::get(format!("http://{addr}/metrics?apikey=KEY")).await.unwrap();
    assert_eq!(res.status(), 404);
}
