//! JSON handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use shelf_http::error::AppError;

use super::models::{Book, BookInput};
use super::repository::{BookStore, RepositoryError};

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Store(source) => {
                tracing::error!(error = %format!("{source:#}"), "key-value store unavailable");
                AppError::unavailable("store_unavailable", "the book store is unavailable")
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: Option<String>,
}

pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(store)
}

fn book_not_found(id: &str) -> AppError {
    AppError::not_found(format!("book '{id}' not found"))
}

fn parse_body(payload: Result<Json<BookInput>, JsonRejection>) -> Result<BookInput, AppError> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        AppError::bad_request(format!(
            "request body must be a JSON object: {}",
            rejection.body_text()
        ))
    })
}

/// GET /books?q= - List books, optionally filtered by title or author.
async fn list_books(
    State(store): State<BookStore>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = store.list(params.q.as_deref()).await?;
    Ok(Json(books))
}

/// GET /books/{id} - Fetch one book.
async fn get_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

/// POST /books - Create a book; `titulo` and `autor` are required.
async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let new_book = parse_body(payload)?.validate().map_err(|missing| {
        AppError::bad_request(format!(
            "missing required fields: {}",
            missing.0.join(", ")
        ))
    })?;

    let book = store.create(new_book).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /books/{id} - Partially update a book.
///
/// Existence is checked before the body so an unknown id is always a 404.
async fn update_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    if !store.exists(&id).await? {
        return Err(book_not_found(&id));
    }
    let input = parse_body(payload)?;

    store
        .update(&id, input)
        .await?
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

/// DELETE /books/{id} - Remove a book.
async fn delete_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !store.delete(&id).await? {
        return Err(book_not_found(&id));
    }
    Ok(Json(json!({ "message": "book deleted" })))
}
