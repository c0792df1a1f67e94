use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use physlink::blob::LocalBlobStore;
use physlink::store::SqliteNoteStore;
use physlink::web::{router, AppState};
use physlink::{ContentType, NoteStore};
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "physlink-test-boundary";

struct TestApp {
    app: Router,
    notes: Arc<SqliteNoteStore>,
    static_dir: TempDir,
}

fn setup() -> TestApp {
    let static_dir = TempDir::new().unwrap();
    let notes = Arc::new(SqliteNoteStore::open_in_memory().unwrap());
    let blobs = Arc::new(LocalBlobStore::new(static_dir.path()));
    let state = AppState::new(notes.clone(), blobs, static_dir.path().to_path_buf());

    TestApp {
        app: router(state),
        notes,
        static_dir,
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        mime: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                mime,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, mime
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post_note(id: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/note/{}", id))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn put_text(id: &str, content: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/note/{}/text", id))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("content={}", content)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_home_redirects_to_fresh_note() {
    let t = setup();
    let response = t.app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let target = location(&response);
    let id = target.strip_prefix("/note/").unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_unknown_note_shows_attach_form() {
    let t = setup();
    let response = t.app.oneshot(get("/note/never-seen")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"action="/note/never-seen""#));
    assert!(body.contains(r#"name="content_type""#));
}

#[tokio::test]
async fn test_text_note_scenario() {
    let t = setup();

    let response = t
        .app
        .clone()
        .oneshot(post_note(
            "abc-123",
            &[Part::Text("content_type", "text"), Part::Text("content", "hello")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("hello"));

    let response = t.app.oneshot(get("/note/abc-123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("hello"));
    assert!(!body.contains(r#"action="/note/abc-123""#));
}

#[tokio::test]
async fn test_url_note_scenario() {
    let t = setup();

    let response = t
        .app
        .clone()
        .oneshot(post_note(
            "abc-123",
            &[
                Part::Text("content_type", "url"),
                Part::Text("content", "https://example.com"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = t.app.oneshot(get("/note/abc-123")).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "https://example.com");
}

#[tokio::test]
async fn test_url_redirect_preserves_content_exactly() {
    let t = setup();
    let url = "https://example.com/path?q=1&r=two#frag";

    t.notes
        .create("exact", ContentType::Url, url.to_string())
        .await
        .unwrap();

    let response = t.app.oneshot(get("/note/exact")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), url);
}

#[tokio::test]
async fn test_invalid_content_type_is_rejected() {
    let t = setup();

    let response = t
        .app
        .clone()
        .oneshot(post_note(
            "abc-123",
            &[Part::Text("content_type", "video"), Part::Text("content", "x")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Invalid content type"));

    assert!(t.notes.get("abc-123").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_content_is_rejected() {
    let t = setup();

    let response = t
        .app
        .clone()
        .oneshot(post_note(
            "abc-123",
            &[Part::Text("content_type", "text"), Part::Text("content", "")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Content is required"));
    assert!(t.notes.get("abc-123").await.unwrap().is_none());
}

#[tokio::test]
async fn test_image_without_file_is_rejected() {
    let t = setup();

    let response = t
        .app
        .oneshot(post_note("img", &[Part::Text("content_type", "image")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(t.notes.get("img").await.unwrap().is_none());
}

#[tokio::test]
async fn test_image_upload_is_stored_and_served() {
    let t = setup();
    let bytes = b"\x89PNG\r\n\x1a\nfake-image-data";

    let response = t
        .app
        .clone()
        .oneshot(post_note(
            "img-1",
            &[
                Part::Text("content_type", "image"),
                Part::File {
                    name: "image",
                    filename: "photo.png",
                    mime: "image/png",
                    bytes,
                },
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let note = t.notes.get("img-1").await.unwrap().unwrap();
    assert_eq!(note.content_type, ContentType::Image);
    assert_eq!(note.content, "/static/uploads/img-1.png");
    assert!(t.static_dir.path().join("uploads/img-1.png").exists());

    let response = t.app.clone().oneshot(get("/note/img-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<img"));
    assert!(body.contains("img-1.png"));

    let response = t
        .app
        .oneshot(get("/static/uploads/img-1.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&served[..], &bytes[..]);
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let t = setup();
    let big = vec![0u8; 20 * 1024 * 1024];

    let response = t
        .app
        .oneshot(post_note(
            "too-big",
            &[
                Part::Text("content_type", "image"),
                Part::File {
                    name: "image",
                    filename: "huge.png",
                    mime: "image/png",
                    bytes: &big,
                },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_text(response).await.contains("Maximum size is 15MB"));
    assert!(t.notes.get("too-big").await.unwrap().is_none());
    assert!(!t.static_dir.path().join("uploads/too-big.png").exists());
}

#[tokio::test]
async fn test_duplicate_create_conflicts() {
    let t = setup();

    t.notes
        .create("taken", ContentType::Text, "first".to_string())
        .await
        .unwrap();

    let response = t
        .app
        .oneshot(post_note(
            "taken",
            &[Part::Text("content_type", "text"), Part::Text("content", "second")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let note = t.notes.get("taken").await.unwrap().unwrap();
    assert_eq!(note.content, "first");
}

#[tokio::test]
async fn test_update_text_note() {
    let t = setup();
    let created = t
        .notes
        .create("t", ContentType::Text, "before".to_string())
        .await
        .unwrap();

    let response = t.app.clone().oneshot(put_text("t", "after")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/note/t");

    let note = t.notes.get("t").await.unwrap().unwrap();
    assert_eq!(note.id, "t");
    assert_eq!(note.content, "after");
    assert_eq!(note.created_at, created.created_at);
    assert!(note.updated_at > created.updated_at);

    let response = t.app.oneshot(get("/note/t")).await.unwrap();
    assert!(body_text(response).await.contains("after"));
}

#[tokio::test]
async fn test_oversized_text_update_is_rejected() {
    let t = setup();
    t.notes
        .create("t", ContentType::Text, "before".to_string())
        .await
        .unwrap();

    let big = "a".repeat(20 * 1024 * 1024);
    let response = t.app.oneshot(put_text("t", &big)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_text(response).await.contains("Maximum size is 15MB"));

    let note = t.notes.get("t").await.unwrap().unwrap();
    assert_eq!(note.content, "before");
}

#[tokio::test]
async fn test_script_url_is_rejected() {
    let t = setup();

    let response = t
        .app
        .oneshot(post_note(
            "js",
            &[
                Part::Text("content_type", "url"),
                Part::Text("content", "javascript:alert(1)"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(t.notes.get("js").await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_image_note_is_rejected() {
    let t = setup();
    t.notes
        .create("img", ContentType::Image, "/static/uploads/img.png".to_string())
        .await
        .unwrap();

    let response = t.app.oneshot(put_text("img", "hijack")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let note = t.notes.get("img").await.unwrap().unwrap();
    assert_eq!(note.content, "/static/uploads/img.png");
}

#[tokio::test]
async fn test_update_missing_note_is_not_found() {
    let t = setup();
    let response = t.app.oneshot(put_text("ghost", "boo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Note not found"));
}

#[tokio::test]
async fn test_invalid_identifier_is_rejected() {
    let t = setup();
    let response = t.app.oneshot(get("/note/bad%2Fid")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
