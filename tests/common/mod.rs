use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ethers::types::Address;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use source_diff::{
    telemetry::{get_subscriber, init_subscriber},
    Comparator, ContractRole, ExplorerClient,
};
use std::{
    collections::{BTreeMap, HashMap},
    net::TcpListener,
    path::Path,
    sync::Arc,
    time::Duration,
};

// Ensure that the `tracing` stack is only initialized once.
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // We only print logs to the console if the `TEST_LOG` environment variable is set.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Canned `getsourcecode` responses keyed by lowercase address.
type Responses = Arc<HashMap<String, Value>>;

pub struct FakeExplorer {
    pub url: String,
}

/// An Etherscan-style body carrying `source_code` as the `SourceCode` field.
pub fn verified(source_code: &str) -> Value {
    json!({
        "status": "1",
        "message": "OK",
        "result": [{ "SourceCode": source_code, "ABI": "[]", "ContractName": "Test" }]
    })
}

/// Same as [`verified`], with the double-brace wrapping explorers use for standard-json input.
pub fn verified_standard_json(source_code: &Value) -> Value {
    verified(&format!("{{{source_code}}}"))
}

pub fn address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

// Launch a fake explorer in the background, answering with `responses` by address. Unknown
// addresses get the error body Etherscan uses for rate limiting.
pub async fn spawn_explorer(responses: Vec<(Address, Value)>) -> FakeExplorer {
    Lazy::force(&TRACING);

    let responses: Responses = Arc::new(
        responses
            .into_iter()
            .map(|(address, body)| (format!("{address:?}"), body))
            .collect(),
    );
    spawn_router(Router::new().route("/api", get(get_source_code)).with_state(responses))
}

/// An explorer that answers every request with `status` and an empty body.
pub async fn spawn_failing_explorer(status: StatusCode) -> FakeExplorer {
    Lazy::force(&TRACING);
    spawn_router(Router::new().route("/api", get(move || async move { status })))
}

/// An explorer that holds every request for `delay` before answering.
pub async fn spawn_stalled_explorer(delay: Duration) -> FakeExplorer {
    Lazy::force(&TRACING);
    spawn_router(Router::new().route(
        "/api",
        get(move || async move {
            tokio::time::sleep(delay).await;
            Json(verified(r#"{"sources":{}}"#))
        }),
    ))
}

fn spawn_router(app: Router) -> FakeExplorer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let server = axum::Server::from_tcp(listener).expect("Failed to bind address");
    let _ = tokio::spawn(server.serve(app.into_make_service()));

    FakeExplorer { url: format!("http://127.0.0.1:{port}/api") }
}

async fn get_source_code(
    State(responses): State<Responses>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    assert_eq!(params.get("module").map(String::as_str), Some("contract"));
    assert_eq!(params.get("action").map(String::as_str), Some("getsourcecode"));
    assert!(params.contains_key("apikey"));

    let address = params.get("address").map(|a| a.to_lowercase()).unwrap_or_default();
    let body = responses.get(&address).cloned().unwrap_or_else(|| {
        json!({ "status": "0", "message": "NOTOK", "result": "Max rate limit reached" })
    });
    Json(body)
}

/// A comparator between two fake explorers where each role `i` lives at `0x0i..` on the origin
/// and `0x1i..` on the fork.
pub fn comparator(origin: &FakeExplorer, fork: &FakeExplorer, output_dir: &Path) -> Comparator {
    comparator_with_timeout(origin, fork, output_dir, Duration::from_secs(5))
}

pub fn comparator_with_timeout(
    origin: &FakeExplorer,
    fork: &FakeExplorer,
    output_dir: &Path,
    timeout: Duration,
) -> Comparator {
    let table = |offset: u8| -> BTreeMap<ContractRole, Address> {
        ContractRole::ALL
            .into_iter()
            .zip(0u8..)
            .map(|(role, i)| (role, address(offset + i + 1)))
            .collect()
    };
    Comparator::new(
        ExplorerClient::new("origin", origin.url.parse().unwrap(), "", timeout).unwrap(),
        ExplorerClient::new("fork", fork.url.parse().unwrap(), "fork-key", timeout).unwrap(),
        table(0x00),
        table(0x10),
        output_dir.to_path_buf(),
    )
}

pub fn origin_address(role: ContractRole) -> Address {
    address(role_index(role) + 1)
}

pub fn fork_address(role: ContractRole) -> Address {
    address(0x10 + role_index(role) + 1)
}

fn role_index(role: ContractRole) -> u8 {
    ContractRole::ALL.iter().position(|r| *r == role).unwrap() as u8
}
