// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use coffer::application::LedgerService;
use coffer::http::build_router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Test fixture: the two accounts used throughout the scenarios
pub struct StandardAccounts;

impl StandardAccounts {
    /// Alice (id "1") with 100.00 and Bob (id "2") with 50.00
    pub fn create_alice_and_bob(ledger: &LedgerService) -> Result<()> {
        ledger.create_account("Alice", 10000)?;
        ledger.create_account("Bob", 5000)?;
        Ok(())
    }

    /// `count` accounts named "acct-N", each funded with `balance` cents
    pub fn create_many(ledger: &LedgerService, count: usize, balance: i64) -> Result<Vec<String>> {
        (0..count)
            .map(|n| {
                let id = ledger.create_account(&format!("acct-{}", n), balance)?;
                Ok(id.to_string())
            })
            .collect()
    }
}

/// Sum of every balance in the ledger
pub fn total_balance(ledger: &LedgerService) -> i64 {
    ledger.list_accounts().iter().map(|entry| entry.balance).sum()
}

/// Router over a fresh ledger, plus the ledger for direct inspection
pub fn test_app() -> (Router, Arc<LedgerService>) {
    let ledger = Arc::new(LedgerService::new());
    (build_router(ledger.clone()), ledger)
}

/// Send a request through the router and decode the JSON response body
pub async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder().uri(uri).body(Body::empty())?;
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: &Router, uri: &str, body: String) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))?;
    send(app, request).await
}
