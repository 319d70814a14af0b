//! Chat flow integration tests
//!
//! Drives `ChatView` with a real `ApiClient` against a `wiremock` server that
//! returns newline-delimited JSON chat streams.

mod common;

use csvchat::chat::{ChatView, Message, TurnOutcome, TurnState, UNREACHABLE_MESSAGE};
use csvchat::config::StreamConfig;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_for, ndjson, temp_csv};

const NDJSON: &str = "application/x-ndjson";

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionId": "s-1",
            "filename": "data.csv",
            "columns": ["a", "b"],
            "preview": [{"a": 1, "b": "x"}, {"a": 4, "b": "y"}]
        })))
        .mount(server)
        .await;
}

async fn mount_chat(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/api/chat/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, NDJSON))
        .mount(server)
        .await;
}

fn open_upload_view() -> ChatView {
    let mut view = ChatView::new();
    view.open("s-1", Some(Default::default()));
    view
}

/// Deltas are concatenated into one assistant message.
#[tokio::test]
async fn test_deltas_build_the_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/s-1"))
        .and(body_json(json!({"message": "sum column a"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            ndjson(&[
                json!({"type": "delta", "content": "The "}),
                json!({"type": "delta", "content": "sum is 5"}),
            ]),
            NDJSON,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = open_upload_view();
    let mut snapshots = Vec::new();

    let outcome = view
        .send(
            &client,
            "sum column a",
            &StreamConfig::default(),
            &CancellationToken::new(),
            |snapshot| snapshots.push(snapshot.content.clone()),
        )
        .await
        .unwrap();

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(
        view.messages(),
        &[
            Message::user("sum column a"),
            Message::assistant("The sum is 5")
        ]
    );
    assert_eq!(snapshots.last().map(String::as_str), Some("The sum is 5"));
    assert_eq!(view.slot().unwrap().turn().state(), TurnState::Idle);
}

/// A `Code Error` status lands in a fenced block under a warning label.
#[tokio::test]
async fn test_code_error_status_is_fenced() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ndjson(&[json!({"type": "status", "content": "Code Error: x undefined"})]),
    )
    .await;

    let client = client_for(&server);
    let mut view = open_upload_view();
    view.send(
        &client,
        "plot x",
        &StreamConfig::default(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();

    let reply = &view.messages().last().unwrap().content;
    assert!(reply.contains("🚨 **Error:**"));
    assert!(reply.contains("```\nCode Error: x undefined\n```"));
}

/// Output, narration and prose interleave in arrival order.
#[tokio::test]
async fn test_mixed_events_render_in_order() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        ndjson(&[
            json!({"type": "status", "content": "Running code..."}),
            json!({"type": "status", "content": "Code Output:\n5"}),
            json!({"type": "delta", "content": "The sum is 5"}),
        ]),
    )
    .await;

    let client = client_for(&server);
    let mut view = open_upload_view();
    view.send(
        &client,
        "sum column a",
        &StreamConfig::default(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(
        view.messages().last().unwrap().content,
        "\n*Running code...*\n\n**Output:**\n```\n5\n```\nThe sum is 5"
    );
}

/// A non-success status becomes the single synthetic failure message.
#[tokio::test]
async fn test_server_error_yields_unreachable_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/s-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = open_upload_view();
    let outcome = view
        .send(
            &client,
            "sum column a",
            &StreamConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(outcome, TurnOutcome::Failed);
    assert_eq!(
        view.messages(),
        &[
            Message::user("sum column a"),
            Message::assistant(UNREACHABLE_MESSAGE)
        ]
    );
    assert_eq!(view.slot().unwrap().turn().state(), TurnState::Idle);
}

/// Malformed records are dropped without ending the turn.
#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let server = MockServer::start().await;
    mount_chat(
        &server,
        format!(
            "{}\nnot json\n{}\n",
            json!({"type": "delta", "content": "a"}),
            json!({"type": "delta", "content": "b"})
        ),
    )
    .await;

    let client = client_for(&server);
    let mut view = open_upload_view();
    view.send(
        &client,
        "q",
        &StreamConfig::default(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(view.messages().last().unwrap().content, "ab");
}

/// The final record without a newline is kept only when flushing is on.
#[tokio::test]
async fn test_trailing_record_policy() {
    let server = MockServer::start().await;
    let body = format!(
        "{}{}",
        ndjson(&[json!({"type": "delta", "content": "kept"})]),
        json!({"type": "delta", "content": " tail"})
    );
    mount_chat(&server, body).await;
    let client = client_for(&server);

    let mut discard = open_upload_view();
    discard
        .send(
            &client,
            "q",
            &StreamConfig::default(),
            &CancellationToken::new(),
            |_| {},
        )
        .await
        .unwrap();
    assert_eq!(discard.messages().last().unwrap().content, "kept");

    let flush = StreamConfig {
        flush_trailing_record: true,
        ..StreamConfig::default()
    };
    let mut keep = open_upload_view();
    keep.send(&client, "q", &flush, &CancellationToken::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(keep.messages().last().unwrap().content, "kept tail");
}

/// Resuming a stored conversation loads its history exactly once.
#[tokio::test]
async fn test_resume_hydrates_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "data.csv",
            "messages": [
                {"role": "user", "content": "sum column a"},
                {"role": "assistant", "content": "The sum is 5"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut view = ChatView::new();
    view.open("s-1", None);

    assert!(view.hydrate(&client).await);
    assert!(!view.hydrate(&client).await);
    assert_eq!(view.messages().len(), 2);
    assert_eq!(view.slot().unwrap().dataset().filename, "data.csv");
}

/// Deleting the open conversation returns the view to the upload state.
#[tokio::test]
async fn test_deleting_open_conversation_starts_new_chat() {
    let server = MockServer::start().await;
    mount_upload(&server).await;
    mount_chat(&server, ndjson(&[json!({"type": "delta", "content": "hi"})])).await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/s-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (_dir, csv) = temp_csv("data.csv", "a,b\n1,x\n4,y\n");
    let upload = client.upload(&csv).await.unwrap();

    let mut view = ChatView::new();
    view.open(upload.session_id.clone(), Some(upload.dataset()));
    view.send(
        &client,
        "hello",
        &StreamConfig::default(),
        &CancellationToken::new(),
        |_| {},
    )
    .await
    .unwrap();
    assert_eq!(view.messages().len(), 2);

    tokio_test::assert_ok!(client.delete_conversation(&upload.session_id).await);
    assert!(view.on_deleted(&upload.session_id));

    assert_eq!(view.session_id(), None);
    assert!(view.messages().is_empty());
}
