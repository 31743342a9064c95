//! Integration tests for the controller.
//!
//! These drive a `PageController` built from the real `TokenProvider` and
//! `RecommenderClient` against a stub server that plays both the token
//! endpoint and the recommender API.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use controller::{
    ControllerConfig, ControllerState, FlowKind, PageController, RenderInstruction, UserAction,
};
use oauth_client::{Credentials, TokenProvider};
use recommender_client::{Endpoints, MatchQuery, RecommenderClient, SortOrder};

/// What the stub saw, in arrival order
#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Token { client_id: String },
    Next { authorization: String },
    Submit { authorization: String, body: Value },
    Matches { authorization: String },
}

#[derive(Clone)]
struct Stub {
    items: Arc<Mutex<VecDeque<Value>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
    issued: Arc<Mutex<u32>>,
}

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn token(State(stub): State<Stub>, Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    stub.seen.lock().unwrap().push(Seen::Token {
        client_id: form.get("client_id").cloned().unwrap_or_default(),
    });
    let mut issued = stub.issued.lock().unwrap();
    *issued += 1;
    Json(json!({
        "access_token": format!("tok-{}", *issued),
        "token_type": "Bearer",
        "expires_in": 300,
        "scope": "api"
    }))
}

async fn next(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    stub.seen.lock().unwrap().push(Seen::Next {
        authorization: authorization(&headers),
    });
    let result = stub.items.lock().unwrap().pop_front().unwrap_or(Value::Null);
    Json(json!({ "status": "OK", "result": result }))
}

async fn submit(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    stub.seen.lock().unwrap().push(Seen::Submit {
        authorization: authorization(&headers),
        body,
    });
    Json(json!({ "status": "OK" }))
}

async fn matches(State(stub): State<Stub>, headers: HeaderMap) -> Json<Value> {
    stub.seen.lock().unwrap().push(Seen::Matches {
        authorization: authorization(&headers),
    });
    Json(json!({ "status": "OK", "result": [
        { "external_id": "p2", "name": "Alex", "similarity": 0.75 }
    ] }))
}

/// Start the stub on a random port, serving `items` in order
async fn start_stub(items: Vec<Value>) -> (String, Stub, tokio::task::JoinHandle<()>) {
    let stub = Stub {
        items: Arc::new(Mutex::new(items.into())),
        seen: Arc::default(),
        issued: Arc::default(),
    };
    let app = Router::new()
        .route("/oauth/token", post(token))
        .route("/api/v1.0/profiles/{profile}/inaction", get(next))
        .route("/api/v1.0/reactions", post(submit))
        .route("/api/v1.0/profiles/{profile}/matches", get(matches))
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    (format!("http://{}", addr), stub, handle)
}

fn build_controller(
    base: &str,
    config: ControllerConfig,
) -> PageController<TokenProvider, RecommenderClient> {
    let tokens = TokenProvider::new(Credentials::new(
        "client-1",
        "secret-1",
        format!("{}/oauth/token", base),
    ))
    .expect("Failed to build token provider");
    let api = RecommenderClient::new(Endpoints {
        next_item: format!("{}/api/v1.0/profiles/{}/inaction", base, config.profile),
        submit: format!("{}/api/v1.0/reactions", base),
        matches: Some(format!("{}/api/v1.0/profiles/{}/matches", base, config.profile)),
    })
    .expect("Failed to build recommender client");

    PageController::new(config, tokens, api)
}

#[tokio::test]
async fn test_reaction_cycle_end_to_end() {
    let (base, stub, handle) = start_stub(vec![
        json!({ "_id": "s1", "statement": "I like hiking" }),
        json!({ "_id": "s2", "statement": "I like cooking" }),
    ])
    .await;

    let mut page = build_controller(&base, ControllerConfig::new("p1", FlowKind::Reaction));

    let plan = page.start().await.expect("start failed");
    assert!(plan.contains(&RenderInstruction::ShowText {
        text: "I like hiking".to_string()
    }));

    page.set_rating(4).unwrap();
    page.handle(UserAction::Submit).await.expect("submit failed");
    assert_eq!(page.displayed_item().map(|i| i.id.as_str()), Some("s2"));

    page.handle(UserAction::Skip).await.expect("skip failed");
    assert_eq!(page.state(), &ControllerState::Exhausted);

    let seen = stub.seen.lock().unwrap().clone();
    let token = |client_id: &str| Seen::Token {
        client_id: client_id.to_string(),
    };
    assert_eq!(
        seen,
        vec![
            token("client-1"),
            Seen::Next {
                authorization: "Bearer tok-1".to_string()
            },
            token("client-1"),
            Seen::Submit {
                authorization: "Bearer tok-2".to_string(),
                body: json!({ "profile": "p1", "statement": "s1", "reaction": 4 }),
            },
            token("client-1"),
            Seen::Next {
                authorization: "Bearer tok-3".to_string()
            },
            token("client-1"),
            Seen::Submit {
                authorization: "Bearer tok-4".to_string(),
                body: json!({ "profile": "p1", "statement": "s2", "reaction": -1 }),
            },
            token("client-1"),
            Seen::Next {
                authorization: "Bearer tok-5".to_string()
            },
        ]
    );

    handle.abort();
}

#[tokio::test]
async fn test_answer_cycle_with_matches_end_to_end() {
    let (base, stub, handle) = start_stub(vec![json!({
        "_id": "q1",
        "question": "Cats or dogs?",
        "options": ["Cats", "Dogs"]
    })])
    .await;

    let config = ControllerConfig::new("p1", FlowKind::Answer).with_matches(MatchQuery {
        sort: Some(SortOrder::Descending),
        limit: Some(5),
    });
    let mut page = build_controller(&base, config);

    let plan = page.start().await.expect("start failed");
    assert!(plan.contains(&RenderInstruction::ShowOptions {
        options: vec!["Cats".to_string(), "Dogs".to_string()]
    }));
    assert!(plan.iter().any(|i| matches!(i, RenderInstruction::ShowMatches { .. })));

    let before = stub.seen.lock().unwrap().len();
    let err = page
        .handle(UserAction::Submit)
        .await
        .expect_err("save without a selection must fail");
    assert!(matches!(
        page.report_error(&err).as_slice(),
        [RenderInstruction::Alert { .. }]
    ));
    assert_eq!(stub.seen.lock().unwrap().len(), before, "Nothing sent");

    page.select_option("Dogs").expect("Dogs is listed");
    page.handle(UserAction::Submit).await.expect("save failed");

    let seen = stub.seen.lock().unwrap().clone();
    let submitted: Vec<&Value> = seen
        .iter()
        .filter_map(|s| match s {
            Seen::Submit { body, .. } => Some(body),
            _ => None,
        })
        .collect();
    assert_eq!(
        submitted,
        vec![&json!({ "profile": "p1", "question": "q1", "answer": "Dogs" })]
    );
    let match_calls = seen
        .iter()
        .filter(|s| matches!(s, Seen::Matches { .. }))
        .count();
    assert_eq!(match_calls, 2, "Sidebar refreshed on start and after saving");
    assert_eq!(page.state(), &ControllerState::Exhausted);

    handle.abort();
}
