//! Drives the HTML frontend against a live books API on an ephemeral port.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use shelf_app::{books, views};
use shelf_kernel::{settings::Settings, ModuleRegistry};
use shelf_store::MemoryBackend;
use tokio::net::TcpListener;
use tower::ServiceExt;

struct Stack {
    api_url: String,
    web: Router,
    store: books::BookStore,
}

async fn start_stack() -> Stack {
    let settings = Settings::default();
    let store = books::BookStore::new(Arc::new(MemoryBackend::new()));

    let mut api_registry = ModuleRegistry::new();
    api_registry.register(books::create_module(store.clone()));
    let api = shelf_http::build_router(&api_registry, &settings.api.server(), "shelf-api");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, api).await.unwrap() });

    let mut web_registry = ModuleRegistry::new();
    web_registry.register(views::create_module(
        views::BooksClient::new(&api_url).unwrap(),
    ));
    let web = shelf_http::build_router(&web_registry, &settings.web.server(), "shelf-web");

    Stack {
        api_url,
        web,
        store,
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// The `name=value` part of the notice cookie set by a redirect.
fn flash_cookie(response: &Response) -> String {
    response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn html(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn add_edit_delete_through_the_frontend() {
    let stack = start_stack().await;

    // Add
    let response = stack
        .web
        .clone()
        .oneshot(post_form("/add", "titulo=Dune&autor=Herbert&genero=&estado=No+le%C3%ADdo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = flash_cookie(&response);

    let page = html(
        stack
            .web
            .clone()
            .oneshot(get("/", Some(&cookie)))
            .await
            .unwrap(),
    )
    .await;
    assert!(page.contains("notice-success"));
    assert!(page.contains("<td>Dune</td>"));

    let books = stack.store.list(None).await.unwrap();
    assert_eq!(books.len(), 1);
    let id = books[0].id.clone();

    // Edit
    let response = stack
        .web
        .clone()
        .oneshot(post_form(
            &format!("/edit/{id}"),
            "titulo=Dune&autor=Frank+Herbert&genero=SF&estado=Le%C3%ADdo",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let updated = stack.store.get(&id).await.unwrap().unwrap();
    assert_eq!(updated.author, "Frank Herbert");
    assert_eq!(updated.status, "Leído");

    // Delete
    let confirm = html(
        stack
            .web
            .clone()
            .oneshot(get(&format!("/delete/{id}"), None))
            .await
            .unwrap(),
    )
    .await;
    assert!(confirm.contains("<strong>Dune</strong>"));

    let response = stack
        .web
        .clone()
        .oneshot(post_form(&format!("/delete/{id}"), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(stack.store.list(None).await.unwrap().is_empty());

    let page = html(stack.web.oneshot(get("/", None)).await.unwrap()).await;
    assert!(page.contains("No books found."));
}

#[tokio::test]
async fn api_serves_health_docs_and_request_ids() {
    let stack = start_stack().await;
    let http = reqwest::Client::new();

    let health = http
        .get(format!("{}/healthz", stack.api_url))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert!(health.headers().contains_key("x-request-id"));

    let docs: serde_json::Value = http
        .get(format!("{}/docs/openapi.json", stack.api_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(docs["paths"]["/books"].is_object());
    assert!(docs["paths"]["/books/{id}"].is_object());

    let missing = http
        .get(format!("{}/books/nope", stack.api_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn frontend_health_check_needs_no_backend() {
    let stack = start_stack().await;
    let response = stack.web.oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(html(response).await, "ok");
}
