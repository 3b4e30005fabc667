//! HTTP surface of the chat widget, driven through axum-test.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::TestServer;
use netcafe_chat::AppState;
use netcafe_chat::backend::ChatBackend;
use netcafe_chat::config::AppConfig;
use netcafe_chat::error::{ChatError, Result};
use netcafe_chat::protocol::{ParameterRow, ServerResponse};
use netcafe_chat::server::router;
use netcafe_chat::session::SessionStore;
use netcafe_chat::widget::SubmissionState;
use serde_json::{Value, json};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Answers like the design service would for a few fixed messages.
#[derive(Debug)]
struct ScriptedBackend;

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, message: &str) -> Result<ServerResponse> {
        match message {
            "2 bàn" => Ok(ServerResponse::Text {
                message: "Đã ghi nhận.".to_string(),
            }),
            "Xác nhận" => Ok(ServerResponse::Parameters {
                message: "Thông số hiện tại:".to_string(),
                parameters: vec![(
                    "1".to_string(),
                    ParameterRow {
                        entity_type: "lối".to_string(),
                        size: json!(5),
                        unit: Some("m".to_string()),
                        present: None,
                    },
                )],
            }),
            "vẽ" => Ok(ServerResponse::Binary {
                image: Bytes::from_static(PNG),
            }),
            _ => Err(ChatError::Status { status: 500 }),
        }
    }
}

fn test_server() -> (TestServer, SessionStore) {
    let config = AppConfig::load_from_args(["netcafe-chat"]).unwrap();
    let sessions = SessionStore::new();
    let state = AppState {
        backend: Arc::new(ScriptedBackend),
        sessions: sessions.clone(),
        config: Arc::new(config),
    };
    (TestServer::new(router(state)).unwrap(), sessions)
}

fn form(message: &str) -> [(&'static str, &str); 1] {
    [("message", message)]
}

/// Submit a message and wait for its outcome fragment.
async fn submit_and_settle(server: &TestServer, sid: &str, message: &str) -> String {
    let posted = server
        .post(&format!("/chat/{sid}/messages"))
        .form(&form(message))
        .await;
    posted.assert_status_ok();
    let fragment = posted.text();

    let marker = format!("/chat/{sid}/submissions/");
    let start = fragment.find(&marker).expect("placeholder polls its submission") + marker.len();
    let submission = &fragment[start..start + 36];

    let polled = server
        .get(&format!("/chat/{sid}/submissions/{submission}"))
        .await;
    polled.assert_status_ok();
    polled.text()
}

#[tokio::test]
async fn test_root_redirects_to_new_session() {
    let (server, sessions) = test_server();

    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);

    let location = response.header("location");
    let location = location.to_str().unwrap();
    let sid = location.strip_prefix("/chat/").unwrap();
    assert!(sessions.get(sid).is_some());
}

#[tokio::test]
async fn test_page_creates_session() {
    let (server, sessions) = test_server();

    let response = server.get("/chat/tab-1").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("<title>Thiết kế phòng net</title>"));
    assert!(html.contains(r#"hx-post="/chat/tab-1/messages""#));
    assert!(sessions.get("tab-1").is_some());
}

#[tokio::test]
async fn test_whitespace_submission_is_ignored() {
    let (server, sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let response = server
        .post("/chat/tab-1/messages")
        .form(&form("   "))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    let session = sessions.get("tab-1").unwrap();
    assert!(session.read(|w| w.entries().is_empty()));
}

#[tokio::test]
async fn test_submission_fragment_shows_user_message() {
    let (server, _sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let response = server
        .post("/chat/tab-1/messages")
        .form(&form("  2 bàn  "))
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.starts_with(r#"<div class="user-message">2 bàn</div>"#));
    assert!(html.contains("hx-get=\"/chat/tab-1/submissions/"));
}

#[tokio::test]
async fn test_text_scenario() {
    let (server, sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let outcome = submit_and_settle(&server, "tab-1", "2 bàn").await;

    assert_eq!(
        outcome,
        r#"<div hx-swap-oob="beforeend:#chat-output"><div class="bot-message">Đã ghi nhận.</div></div>"#
    );
    let session = sessions.get("tab-1").unwrap();
    assert_eq!(session.read(|w| w.placeholder_count()), 0);
    assert_eq!(session.read(|w| w.entries().len()), 2);
}

#[tokio::test]
async fn test_confirm_scenario_renders_table() {
    let (server, _sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let outcome = submit_and_settle(&server, "tab-1", "Xác nhận").await;

    let message = outcome.find("Thông số hiện tại:").unwrap();
    let table = outcome.find(r#"<table class="parameters-table">"#).unwrap();
    let prompt = outcome.find("hãy nhập &#39;Xác nhận&#39;").unwrap();
    assert!(message < table && table < prompt);
    assert!(outcome.contains("<tr><td>lối đi</td><td>5</td><td>m</td><td></td></tr>"));
    assert_eq!(outcome.matches("<tr><td>").count(), 1);
}

#[tokio::test]
async fn test_design_download() {
    let (server, sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let outcome = submit_and_settle(&server, "tab-1", "vẽ").await;
    assert!(outcome.contains("File thiết kế đã được tạo."));

    let image_id = sessions
        .get("tab-1")
        .unwrap()
        .read(|w| {
            w.entries().iter().find_map(|e| match &e.view {
                netcafe_chat::widget::ViewEntry::Image(image) => Some(image.id),
                _ => None,
            })
        })
        .unwrap();
    assert!(outcome.contains(&format!(
        r#"href="/chat/tab-1/designs/{image_id}/download" download="design.png""#
    )));

    let inline = server
        .get(&format!("/chat/tab-1/designs/{image_id}"))
        .await;
    inline.assert_status_ok();
    assert_eq!(inline.header("content-type"), "image/png");
    assert_eq!(inline.as_bytes().as_ref(), PNG);

    let download = server
        .get(&format!("/chat/tab-1/designs/{image_id}/download"))
        .await;
    download.assert_status_ok();
    assert_eq!(download.header("content-type"), "application/octet-stream");
    assert_eq!(
        download.header("content-disposition"),
        "attachment; filename=\"design.png\""
    );
    assert_eq!(download.as_bytes().as_ref(), PNG);
}

#[tokio::test]
async fn test_backend_failure_renders_error() {
    let (server, sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();

    let outcome = submit_and_settle(&server, "tab-1", "hỏng").await;

    assert!(outcome.contains(r#"class="bot-message error-message""#));
    assert!(outcome.contains("Lỗi: Có lỗi xảy ra khi kết nối với server (HTTP 500)."));
    let session = sessions.get("tab-1").unwrap();
    assert_eq!(session.read(|w| w.placeholder_count()), 0);
}

#[tokio::test]
async fn test_entries_snapshot() {
    let (server, sessions) = test_server();
    server.get("/chat/tab-1").await.assert_status_ok();
    submit_and_settle(&server, "tab-1", "2 bàn").await;

    let entries: Vec<Value> = server.get("/api/sessions/tab-1/entries").await.json();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["view"]["type"], "message");
    assert_eq!(entries[0]["view"]["data"]["sender"], "user");
    assert_eq!(entries[1]["view"]["data"]["text"], "Đã ghi nhận.");
    assert!(entries[1]["reply_to"].is_string());

    let session = sessions.get("tab-1").unwrap();
    let settled = session.read(|w| {
        w.entries()
            .iter()
            .find_map(|e| e.reply_to)
            .and_then(|id| w.submission_state(id))
    });
    assert_eq!(settled, Some(SubmissionState::Rendered));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let (server, _sessions) = test_server();

    server
        .post("/chat/nobody/messages")
        .form(&form("2 bàn"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/sessions/nobody/entries")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server.get("/chat/tab-1").await.assert_status_ok();
    server
        .get("/chat/tab-1/submissions/not-a-uuid")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!(
            "/chat/tab-1/submissions/{}",
            uuid::Uuid::new_v4()
        ))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/chat/tab-1/designs/{}", uuid::Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
