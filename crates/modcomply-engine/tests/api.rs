#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use modcomply_core::Address;
use modcomply_engine::app_state::AppState;
use modcomply_engine::{config, router};

const OWNER: &str = "0xd0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0";
const ALICE: &str = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";
const BOB: &str = "0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0";
const CAROL: &str = "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0";

fn state() -> AppState {
    let yaml = format!(
        r#"
version: 1
engine:
  owner: "{OWNER}"
modules:
  - kind: transfer_restrict
    allow: ["{ALICE}", "{BOB}"]
"#
    );
    AppState::new(config::load_from_str(&yaml).unwrap()).unwrap()
}

fn module(state: &AppState) -> Address {
    state.engine().modules().unwrap()[0]
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn lists_bound_modules() {
    let state = state();
    let app = router::build_router(state.clone());

    let (status, body) = get_json(&app, "/v1/modules").await;
    assert_eq!(status, StatusCode::OK);
    let modules = body.as_array().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["address"], module(&state).to_string());
    assert_eq!(modules[0]["name"], "TransferRestrictModule");
    assert_eq!(modules[0]["owner"], OWNER);
    assert_eq!(modules[0]["allowed_users"], 2);
}

#[tokio::test]
async fn allow_list_membership() {
    let state = state();
    let app = router::build_router(state.clone());
    let m = module(&state);

    let (status, body) = get_json(&app, &format!("/v1/modules/{m}/allowed/{ALICE}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(body["compliance"], state.engine().address().to_string());

    let (_, body) = get_json(&app, &format!("/v1/modules/{m}/allowed/{CAROL}")).await;
    assert_eq!(body["allowed"], false);
}

#[tokio::test]
async fn committed_events_are_served() {
    let state = state();
    let app = router::build_router(state.clone());
    let m = module(&state);

    let (status, body) = get_json(&app, &format!("/v1/modules/{m}/events")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["OwnershipTransferred", "Initialized", "ComplianceBound", "UserAllowed", "UserAllowed"]
    );
}

#[tokio::test]
async fn transfer_check() {
    let app = router::build_router(state());

    let (status, body) = get_json(&app, &format!("/v1/check?from={ALICE}&to={BOB}&amount=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let (_, body) = get_json(&app, &format!("/v1/check?from={ALICE}&to={CAROL}&amount=5")).await;
    assert_eq!(body["allowed"], false);

    // amounts beyond u64 are accepted
    let big = u128::MAX.to_string();
    let (status, body) = get_json(&app, &format!("/v1/check?from={ALICE}&to={BOB}&amount={big}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], big);
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn error_statuses() {
    let state = state();
    let app = router::build_router(state.clone());

    let (status, body) = get_json(&app, &format!("/v1/check?from=zz&to={BOB}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = get_json(&app, &format!("/v1/check?from={ALICE}&to={BOB}&amount=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = get_json(&app, &format!("/v1/modules/{CAROL}/events")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MODULE_REGISTRY");

    let (status, body) = get_json(&app, &format!("/v1/modules/{CAROL}/allowed/{ALICE}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "MODULE_REGISTRY");
}

#[tokio::test]
async fn health_readiness_and_metrics() {
    let state = state();
    let app = router::build_router(state.clone());

    assert_eq!(get(&app, "/healthz").await, (StatusCode::OK, "ok".to_string()));
    assert_eq!(get(&app, "/readyz").await, (StatusCode::OK, "ready".to_string()));

    get(&app, &format!("/v1/check?from={ALICE}&to={BOB}")).await;
    let (status, body) = get(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("# TYPE modcomply_transfer_checks_total counter"));
    assert!(body.contains("modcomply_transfer_checks_total{result=\"allowed\"} 1"));
    assert!(body.contains("modcomply_modules_bound 1"));
    assert!(body.contains("modcomply_draining 0"));

    state.metrics().set_draining();
    assert_eq!(
        get(&app, "/readyz").await,
        (StatusCode::SERVICE_UNAVAILABLE, "draining".to_string())
    );
    let (_, body) = get(&app, "/metrics").await;
    assert!(body.contains("modcomply_draining 1"));
}
