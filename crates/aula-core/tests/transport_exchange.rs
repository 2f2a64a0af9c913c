//! Integration test: one request-reply exchange against a loopback server.
//!
//! ## Scenario
//! 1. Success with citations: the answer survives verbatim and relative
//!    source URLs resolve against the endpoint origin.
//! 2. Non-2xx status: classified as a server failure.
//! 3. 2xx with a non-JSON body: classified with the server wording.
//! 4. Unreachable endpoint: classified as a connection failure, with wording
//!    distinct from the server case.

use aula_core::{
    ChatClient, ChatError, ChatRequest, Citation, ConversationTurn, CONNECTION_FAILED_TEXT,
    SERVER_ERROR_TEXT,
};
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use url::Url;

async fn spawn_server(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn sample_request() -> ChatRequest {
    ChatRequest {
        message: "what are the exam rules?".to_string(),
        history: vec![ConversationTurn::user("what are the exam rules?")],
    }
}

#[tokio::test]
async fn successful_exchange_resolves_answer_and_citations() {
    let router = Router::new().route(
        "/chat",
        post(|Json(body): Json<serde_json::Value>| async move {
            // The wire contract: message plus lowercase role/content history.
            assert_eq!(body["message"], "what are the exam rules?");
            assert_eq!(body["history"][0]["role"], "user");
            Json(serde_json::json!({
                "answer": "Exams are governed by the assessment regulation.",
                "sources": [
                    { "name": "Assessment Regulation", "url": "/docs/assessment.pdf" },
                    "Student Handbook",
                ],
            }))
        }),
    );
    let addr = spawn_server(router).await;
    let client = ChatClient::new(Url::parse(&format!("http://{addr}/chat")).unwrap());

    let reply = client
        .ask(&sample_request())
        .await
        .expect("exchange should succeed");

    assert_eq!(reply.answer, "Exams are governed by the assessment regulation.");
    assert_eq!(reply.citations.len(), 2);
    match &reply.citations[0] {
        Citation::Linked { name, url } => {
            assert_eq!(name, "Assessment Regulation");
            assert_eq!(url.as_str(), format!("http://{addr}/docs/assessment.pdf"));
        }
        other => panic!("expected a linked citation, got {other:?}"),
    }
    assert_eq!(
        reply.citations[1],
        Citation::Text("Student Handbook".to_string())
    );
}

#[tokio::test]
async fn failure_status_classifies_as_server_error() {
    let router = Router::new().route(
        "/chat",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded") }),
    );
    let addr = spawn_server(router).await;
    let client = ChatClient::new(Url::parse(&format!("http://{addr}/chat")).unwrap());

    let err = client
        .ask(&sample_request())
        .await
        .expect_err("non-2xx must fail the exchange");

    assert!(
        matches!(err, ChatError::Server(status) if status.as_u16() == 500),
        "expected a server classification, got {err:?}"
    );
    assert_eq!(err.user_message(), SERVER_ERROR_TEXT);
}

#[tokio::test]
async fn unparsable_success_body_gets_server_wording() {
    let router = Router::new().route("/chat", post(|| async { "<!doctype html>" }));
    let addr = spawn_server(router).await;
    let client = ChatClient::new(Url::parse(&format!("http://{addr}/chat")).unwrap());

    let err = client
        .ask(&sample_request())
        .await
        .expect_err("a non-JSON body must fail the exchange");

    assert!(
        matches!(err, ChatError::Payload(_)),
        "expected a payload classification, got {err:?}"
    );
    assert_eq!(err.user_message(), SERVER_ERROR_TEXT);
}

#[tokio::test]
async fn unreachable_endpoint_classifies_as_connection_error() {
    // Bind to grab a free port, then drop the listener so nothing answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ChatClient::new(Url::parse(&format!("http://{addr}/chat")).unwrap());
    let err = client
        .ask(&sample_request())
        .await
        .expect_err("a dead endpoint must fail the exchange");

    assert!(
        matches!(err, ChatError::Connection(_)),
        "expected a connection classification, got {err:?}"
    );
    assert_eq!(err.user_message(), CONNECTION_FAILED_TEXT);
    assert_ne!(
        CONNECTION_FAILED_TEXT, SERVER_ERROR_TEXT,
        "the two failure classes must stay distinguishable to the user"
    );
}
