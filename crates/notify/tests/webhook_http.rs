//! Webhook client tests against an in-process HTTP server.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;

use notify::{FeishuClient, PostElement, WeChatClient, WebhookTarget};

#[derive(Clone, Default)]
struct Received {
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

async fn accept(State(state): State<Received>, Json(body): Json<serde_json::Value>) -> StatusCode {
    state.bodies.lock().unwrap().push(body);
    StatusCode::OK
}

async fn reject() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "robot gone")
}

async fn start_server() -> (String, Received, tokio::task::JoinHandle<()>) {
    let received = Received::default();
    let app = Router::new()
        .route("/hook", post(accept))
        .route("/broken", post(reject))
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received, handle)
}

#[tokio::test]
async fn test_feishu_text_message_shape() {
    let (base, received, server) = start_server().await;

    let client = FeishuClient::new(&format!("{base}/hook")).unwrap();
    client.send_text("hello group").await.unwrap();

    let bodies = received.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["msg_type"], "text");
    assert_eq!(bodies[0]["content"]["text"], "hello group");

    server.abort();
}

#[tokio::test]
async fn test_feishu_post_card_shape() {
    let (base, received, server) = start_server().await;

    let client = FeishuClient::new(&format!("{base}/hook")).unwrap();
    client
        .send_post(
            "Sync finished",
            vec![vec![
                PostElement::text("total: 3"),
                PostElement::link("details", "https://example.com/log"),
                PostElement::at("ou_42"),
            ]],
        )
        .await
        .unwrap();

    let bodies = received.bodies.lock().unwrap();
    let card = &bodies[0]["content"]["post"]["zh_cn"];
    assert_eq!(card["title"], "Sync finished");
    let elements = card["content"][0].as_array().unwrap();
    assert_eq!(elements[0]["tag"], "text");
    assert_eq!(elements[1]["tag"], "a");
    assert_eq!(elements[1]["href"], "https://example.com/log");
    assert_eq!(elements[2]["tag"], "at");
    assert_eq!(elements[2]["user_id"], "ou_42");

    server.abort();
}

#[tokio::test]
async fn test_wechat_markdown_shape() {
    let (base, received, server) = start_server().await;

    let client = WeChatClient::new(&format!("{base}/hook")).unwrap();
    client.send_markdown("**done**").await.unwrap();

    let bodies = received.bodies.lock().unwrap();
    assert_eq!(bodies[0]["msgtype"], "markdown");
    assert_eq!(bodies[0]["markdown"]["content"], "**done**");

    server.abort();
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let (base, _received, server) = start_server().await;

    let client = FeishuClient::new(&format!("{base}/broken")).unwrap();
    let err = client.send_text("hello").await.unwrap_err();
    assert!(format!("{err:#}").contains("500"));

    server.abort();
}
