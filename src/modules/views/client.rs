//! HTTP client for the books API.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::modules::books::models::{Book, BookInput};

/// Characters left unescaped when an id is placed in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid books API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API could not be reached or its reply could not be read.
    #[error("books API unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),
}

/// Result of a call the API answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    Success(T),
    /// The API replied with an unexpected status; `body` is its raw text.
    Rejected { status: StatusCode, body: String },
}

/// Client for the books API. Cloning shares the connection pool.
#[derive(Clone, Debug)]
pub struct BooksClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BooksClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn book_url(&self, id: &str) -> Result<Url, ClientError> {
        self.url(&format!("/books/{}", utf8_percent_encode(id, PATH_SEGMENT)))
    }

    /// GET /books, passing `q` only when non-empty.
    pub async fn list(&self, query: &str) -> Result<ApiOutcome<Vec<Book>>, ClientError> {
        let mut request = self.http.get(self.url("/books")?);
        if !query.is_empty() {
            request = request.query(&[("q", query)]);
        }
        read(request.send().await?, StatusCode::OK).await
    }

    pub async fn get(&self, id: &str) -> Result<ApiOutcome<Book>, ClientError> {
        let response = self.http.get(self.book_url(id)?).send().await?;
        read(response, StatusCode::OK).await
    }

    pub async fn create(&self, input: &BookInput) -> Result<ApiOutcome<Book>, ClientError> {
        let response = self
            .http
            .post(self.url("/books")?)
            .json(input)
            .send()
            .await?;
        read(response, StatusCode::CREATED).await
    }

    pub async fn update(
        &self,
        id: &str,
        input: &BookInput,
    ) -> Result<ApiOutcome<Book>, ClientError> {
        let response = self
            .http
            .put(self.book_url(id)?)
            .json(input)
            .send()
            .await?;
        read(response, StatusCode::OK).await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiOutcome<()>, ClientError> {
        let response = self.http.delete(self.book_url(id)?).send().await?;
        let status = response.status();
        if status == StatusCode::OK {
            Ok(ApiOutcome::Success(()))
        } else {
            Ok(rejected(response).await)
        }
    }
}

async fn read<T: DeserializeOwned>(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<ApiOutcome<T>, ClientError> {
    if response.status() == expected {
        Ok(ApiOutcome::Success(response.json().await?))
    } else {
        Ok(rejected(response).await)
    }
}

async fn rejected<T>(response: reqwest::Response) -> ApiOutcome<T> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), %body, "books API rejected request");
    ApiOutcome::Rejected { status, body }
}
