use serde::{Deserialize, Serialize};

/// Reading status given to books created without one.
pub const DEFAULT_STATUS: &str = "No leído";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A book record as stored and served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book, assigned on creation
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "genero", default)]
    pub genre: String,
    #[serde(rename = "estado", default = "default_status")]
    pub status: String,
}

impl Book {
    /// Case-insensitive substring match against title or author.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

/// Request body for both create and update. Every field is optional at the
/// wire level; create enforces presence of title and author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "autor", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "genero", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "estado", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Wire names of the required fields absent from a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

/// A validated create request: title and author are known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub status: String,
}

impl NewBook {
    pub fn with_id(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            genre: self.genre,
            status: self.status,
        }
    }
}

impl BookInput {
    /// Checks required fields and fills defaults for genre and status.
    pub fn validate(self) -> Result<NewBook, MissingFields> {
        match (self.title, self.author) {
            (Some(title), Some(author)) => Ok(NewBook {
                title,
                author,
                genre: self.genre.unwrap_or_default(),
                status: self.status.unwrap_or_else(default_status),
            }),
            (title, author) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("titulo");
                }
                if author.is_none() {
                    missing.push("autor");
                }
                Err(MissingFields(missing))
            }
        }
    }

    /// Overwrites the fields present in this input; the id is untouched.
    pub fn apply_to(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(genre) = self.genre {
            book.genre = genre;
        }
        if let Some(status) = self.status {
            book.status = status;
        }
    }
}
