//! HTML handlers for the frontend pages.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use super::client::{ApiOutcome, BooksClient, ClientError};
use super::flash::{self, Notice};
use super::pages::{self, BookForm};
use crate::modules::books::models::{Book, BookInput};

const UNREACHABLE: &str = "Could not reach the books service. Please try again later.";
const NOT_FOUND: &str = "That book no longer exists.";

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: Option<String>,
}

pub fn router(client: BooksClient) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/add", get(add_form).post(add_book))
        .route("/edit/{id}", get(edit_form).post(edit_book))
        .route("/delete/{id}", get(confirm_delete).post(delete_book))
        .with_state(client)
}

/// Renders a page, showing and clearing any notice left by a redirect.
fn render(headers: &HeaderMap, title: &str, notices: Vec<Notice>, body: String) -> Response {
    let pending = flash::pending(headers);
    let clear = pending.is_some();
    let notices: Vec<Notice> = pending.into_iter().chain(notices).collect();

    let mut response = Html(pages::layout(title, &notices, &body)).into_response();
    if clear {
        response
            .headers_mut()
            .append(header::SET_COOKIE, flash::clear_cookie());
    }
    response
}

fn connectivity(err: &ClientError, action: &str) -> Notice {
    tracing::warn!(error = %err, action, "books service call failed");
    Notice::danger(UNREACHABLE)
}

/// Notice for a non-success reply, quoting the raw body.
fn rejected(status: StatusCode, body: &str, action: &str) -> Notice {
    Notice::warning(format!("Could not {action} ({status}): {body}"))
}

/// Like [`rejected`], for calls addressing one book: a 404 means it is gone.
fn book_rejected(status: StatusCode, body: &str, action: &str) -> Notice {
    if status == StatusCode::NOT_FOUND {
        Notice::warning(NOT_FOUND)
    } else {
        rejected(status, body, action)
    }
}

/// Fetches a book for a page, or the notice to redirect home with.
async fn fetch(client: &BooksClient, id: &str) -> Result<Book, Notice> {
    match client.get(id).await {
        Ok(ApiOutcome::Success(book)) => Ok(book),
        Ok(ApiOutcome::Rejected { status, body }) => {
            Err(book_rejected(status, &body, "load the book"))
        }
        Err(err) => Err(connectivity(&err, "load")),
    }
}

/// GET / - Book list with optional search.
async fn list_books(
    State(client): State<BooksClient>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Response {
    let query = params.q.unwrap_or_default();
    let (books, notices) = match client.list(&query).await {
        Ok(ApiOutcome::Success(books)) => (books, Vec::new()),
        Ok(ApiOutcome::Rejected { status, body }) => {
            (Vec::new(), vec![rejected(status, &body, "list books")])
        }
        Err(err) => (Vec::new(), vec![connectivity(&err, "list")]),
    };
    render(&headers, "Books", notices, pages::book_list(&books, &query))
}

async fn add_form(headers: HeaderMap) -> Response {
    render(
        &headers,
        "Add book",
        Vec::new(),
        pages::book_form("/add", &BookForm::default(), "Add"),
    )
}

async fn add_book(
    State(client): State<BooksClient>,
    headers: HeaderMap,
    Form(form): Form<BookForm>,
) -> Response {
    let notice = match client.create(&BookInput::from(form.clone())).await {
        Ok(ApiOutcome::Success(book)) => {
            tracing::info!(id = %book.id, "book added");
            return flash::redirect_with(
                "/",
                Notice::success(format!("Added \"{}\".", book.title)),
            );
        }
        Ok(ApiOutcome::Rejected { status, body }) => rejected(status, &body, "add the book"),
        Err(err) => connectivity(&err, "add"),
    };
    render(
        &headers,
        "Add book",
        vec![notice],
        pages::book_form("/add", &form, "Add"),
    )
}

/// Edit form pre-filled from the stored record.
async fn edit_page(
    client: &BooksClient,
    id: &str,
    headers: &HeaderMap,
    notices: Vec<Notice>,
) -> Response {
    match fetch(client, id).await {
        Ok(book) => render(
            headers,
            "Edit book",
            notices,
            pages::book_form(&format!("/edit/{id}"), &BookForm::from(&book), "Save"),
        ),
        Err(notice) => flash::redirect_with("/", notice),
    }
}

async fn edit_form(
    State(client): State<BooksClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    edit_page(&client, &id, &headers, Vec::new()).await
}

async fn edit_book(
    State(client): State<BooksClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<BookForm>,
) -> Response {
    let notice = match client.update(&id, &BookInput::from(form)).await {
        Ok(ApiOutcome::Success(book)) => {
            tracing::info!(id = %book.id, "book updated");
            return flash::redirect_with(
                "/",
                Notice::success(format!("Updated \"{}\".", book.title)),
            );
        }
        Ok(ApiOutcome::Rejected { status, body }) => {
            book_rejected(status, &body, "update the book")
        }
        Err(err) => connectivity(&err, "update"),
    };
    // The stored record is shown again, not the rejected input.
    edit_page(&client, &id, &headers, vec![notice]).await
}

async fn confirm_delete(
    State(client): State<BooksClient>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    match fetch(&client, &id).await {
        Ok(book) => render(
            &headers,
            "Delete book",
            Vec::new(),
            pages::delete_confirmation(&book),
        ),
        Err(notice) => flash::redirect_with("/", notice),
    }
}

async fn delete_book(State(client): State<BooksClient>, Path(id): Path<String>) -> Response {
    let notice = match client.delete(&id).await {
        Ok(ApiOutcome::Success(())) => {
            tracing::info!(%id, "book deleted");
            Notice::info("Book deleted.")
        }
        Ok(ApiOutcome::Rejected { status, body }) => {
            book_rejected(status, &body, "delete the book")
        }
        Err(err) => connectivity(&err, "delete"),
    };
    flash::redirect_with("/", notice)
}
