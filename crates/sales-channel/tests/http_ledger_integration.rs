//! # HTTP Ledger Integration Tests
//!
//! Drives the full pipeline (builder, signer, queue, HTTP client, reconciler)
//! against a local axum server speaking the metagraph's `/data` and
//! `/data-application/channels/{id}` endpoints. The server verifies proofs
//! and applies commands through [`MockLedger`].

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};

use sales_channel::{
    ChannelConfig, ChannelError, Command, HttpLedgerClient, InMemoryStore, InventoryInput,
    LedgerGateway, MockLedger, MockTimeSource, ProductInput, Proof, Role, SalesChannelApi,
    SalesChannelService, Secp256k1Keystore, SubmissionState,
};

#[derive(Clone)]
struct FakeLedger {
    ledger: MockLedger,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl FakeLedger {
    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().clone()
    }
}

#[derive(Deserialize)]
struct Envelope {
    value: Command,
    proofs: Vec<Proof>,
}

async fn post_data(State(fake): State<FakeLedger>, Json(body): Json<Value>) -> Response {
    fake.bodies.lock().push(body.clone());

    let envelope: Envelope = match serde_json::from_value(body) {
        Ok(envelope) => envelope,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let Some(proof) = envelope.proofs.first() else {
        return (StatusCode::BAD_REQUEST, "missing proof").into_response();
    };

    match fake.ledger.submit(&envelope.value, proof).await {
        Ok(hash) => Json(json!({ "hash": hash })).into_response(),
        Err(ChannelError::RejectedByLedger { status, body }) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}

async fn get_channel(State(fake): State<FakeLedger>, Path(id): Path<String>) -> Response {
    match id.as_str() {
        "null-channel" => Json(Value::Null).into_response(),
        "garbage" => (StatusCode::OK, "<html>").into_response(),
        "unavailable" => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
        "forbidden" => (StatusCode::FORBIDDEN, "no").into_response(),
        _ => match fake.ledger.fetch_channel(&id).await {
            Ok(channel) => Json(channel).into_response(),
            Err(_) => StatusCode::NOT_FOUND.into_response(),
        },
    }
}

async fn spawn_ledger(ledger: MockLedger) -> (String, FakeLedger) {
    let fake = FakeLedger {
        ledger,
        bodies: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .route("/data", post(post_data))
        .route("/data-application/channels/:id", get(get_channel))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), fake)
}

fn service_at(base_url: &str) -> SalesChannelService {
    let config = ChannelConfig::for_testing().with_base_url(base_url);
    let store = Arc::new(InMemoryStore::new());

    SalesChannelService::new(
        config.clone(),
        Arc::new(Secp256k1Keystore::new(store.clone())),
        Arc::new(HttpLedgerClient::new(&config).unwrap()),
        store,
        Arc::new(MockTimeSource::new(1_700_000_000_000)),
    )
    .unwrap()
}

async fn service_against(ledger: MockLedger) -> (SalesChannelService, FakeLedger) {
    let (base_url, fake) = spawn_ledger(ledger).await;
    (service_at(&base_url), fake)
}

fn sellers(n: usize) -> Vec<String> {
    (0..n)
        .map(|_| dag_crypto::DagKeyPair::generate().address())
        .collect()
}

#[tokio::test]
async fn test_create_then_fetch_owner_is_signer() {
    let (service, fake) = service_against(MockLedger::new()).await;

    let channel_id = service
        .create_channel(
            "Farmers Market",
            vec![ProductInput::new("tea", "2.5"), ProductInput::new("cake", "4")],
        )
        .await
        .unwrap();

    let me = service.identity().await.unwrap();
    let reconciled = service.reconcile(&channel_id).await.unwrap();
    assert_eq!(reconciled.role, Role::Owner);
    assert_eq!(reconciled.channel.id, channel_id);
    assert_eq!(reconciled.channel.owner, me.address);
    assert_eq!(reconciled.channel.products.get("cake"), Some(&4.0));

    let body = &fake.bodies()[0];
    let create = &body["value"]["CreateSalesChannel"];
    assert_eq!(create["owner"], json!(me.address));
    assert_eq!(create["products"], json!([["tea", 2.5], ["cake", 4]]));
    assert_eq!(body["proofs"][0]["id"].as_str().unwrap().len(), 128);
    assert_eq!(body["proofs"][0]["id"], json!(me.proof_id()));
}

#[tokio::test]
async fn test_submissions_arrive_in_enqueue_order_one_at_a_time() {
    let ledger = MockLedger::new().with_latency(Duration::from_millis(5));
    let (service, fake) = service_against(ledger.clone()).await;
    service
        .create_channel("Market", vec![ProductInput::new("tea", "1")])
        .await
        .unwrap();

    let roster = sellers(5);
    let outcome = service.add_sellers(roster.clone()).await.unwrap();
    assert!(outcome.all_confirmed());
    assert_eq!(ledger.max_concurrency(), 1);

    let delivered: Vec<String> = fake.bodies()[1..]
        .iter()
        .map(|body| body["value"]["AddSeller"]["seller"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(delivered, roster);
}

#[tokio::test]
async fn test_rejected_submission_does_not_block_the_rest() {
    let roster = sellers(3);
    let refused = roster[1].clone();
    let ledger = MockLedger::new().failing_when(move |command| match command {
        Command::AddSeller(add) if add.seller == refused => Some(ChannelError::RejectedByLedger {
            status: 400,
            body: "seller refused".into(),
        }),
        _ => None,
    });
    let (service, _fake) = service_against(ledger.clone()).await;
    let channel_id = service
        .create_channel("Market", vec![ProductInput::new("tea", "1")])
        .await
        .unwrap();

    let outcome = service.add_sellers(roster.clone()).await.unwrap();

    assert_eq!(outcome.confirmed.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    let failed = &outcome.failed[0];
    assert_eq!(failed.state, SubmissionState::Failed);
    assert_eq!(
        failed.last_error,
        Some(ChannelError::RejectedByLedger {
            status: 400,
            body: "seller refused".into()
        })
    );

    let channel = ledger.channel(&channel_id).unwrap();
    assert!(channel.sellers.contains(&roster[0]));
    assert!(!channel.sellers.contains(&roster[1]));
    assert!(channel.sellers.contains(&roster[2]));
}

#[tokio::test]
async fn test_reconcile_classifies_and_caches_members_only() {
    let (owner_service, fake) = service_against(MockLedger::new()).await;
    let channel_id = owner_service
        .create_channel("Market", vec![ProductInput::new("tea", "1")])
        .await
        .unwrap();

    // Second wallet talking to the same ledger.
    let outsider = service_at(&owner_service.config().l0_url);

    let seen = outsider.reconcile(&channel_id).await.unwrap();
    assert_eq!(seen.role, Role::NotAMember);
    assert_eq!(outsider.reconciler().cached(&channel_id).await.unwrap(), None);

    let outsider_address = outsider.identity().await.unwrap().address;
    owner_service
        .add_sellers(vec![outsider_address])
        .await
        .unwrap();

    let joined = outsider.join_channel(&channel_id).await.unwrap();
    assert_eq!(joined.role, Role::Seller);
    let cached = outsider.reconciler().cached(&channel_id).await.unwrap().unwrap();
    assert_eq!(cached.channel, joined.channel);
    assert_eq!(fake.bodies().len(), 2);
}

#[tokio::test]
async fn test_empty_amount_never_reaches_the_ledger() {
    let (service, fake) = service_against(MockLedger::new()).await;
    service
        .create_channel("Market", vec![ProductInput::new("tea", "1")])
        .await
        .unwrap();
    let sent = fake.bodies().len();

    let err = service
        .add_inventory(vec![InventoryInput::new("tea", "")])
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::InvalidCommand { field: "amount", .. }));
    assert_eq!(fake.bodies().len(), sent);
}

#[tokio::test]
async fn test_snapshot_edge_cases() {
    let (base_url, _fake) = spawn_ledger(MockLedger::new()).await;
    let client =
        HttpLedgerClient::new(&ChannelConfig::for_testing().with_base_url(base_url)).unwrap();

    assert_eq!(
        client.fetch_channel("missing").await.unwrap_err(),
        ChannelError::NotFound("missing".into())
    );
    assert_eq!(
        client.fetch_channel("null-channel").await.unwrap_err(),
        ChannelError::NotFound("null-channel".into())
    );
    assert!(matches!(
        client.fetch_channel("garbage").await.unwrap_err(),
        ChannelError::MalformedResponse(_)
    ));
}

#[tokio::test]
async fn test_server_errors_are_transient() {
    let (base_url, _fake) = spawn_ledger(MockLedger::new()).await;
    let client =
        HttpLedgerClient::new(&ChannelConfig::for_testing().with_base_url(base_url)).unwrap();

    let err = client.fetch_channel("unavailable").await.unwrap_err();
    assert!(matches!(err, ChannelError::NetworkError(ref detail) if detail.contains("503")));
    assert!(err.is_transient());

    let err = client.fetch_channel("forbidden").await.unwrap_err();
    assert!(matches!(err, ChannelError::MalformedResponse(_)));
    assert!(!err.is_transient());
}
