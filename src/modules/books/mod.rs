pub mod models;
pub mod repository;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use shelf_kernel::{InitCtx, Module};

pub use repository::BookStore;

/// Books API module: CRUD over book records in the key-value store
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        // An unreachable store is not fatal; requests retry the connection.
        match self.store.ping().await {
            Ok(()) => tracing::info!(
                module = self.name(),
                environment = ?ctx.settings.environment,
                "books module initialized"
            ),
            Err(err) => tracing::error!(
                module = self.name(),
                error = %format!("{:#}", anyhow::Error::new(err)),
                "key-value store unreachable at startup; serving anyway"
            ),
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_param = serde_json::json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let input_body = serde_json::json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });

        Some(serde_json::json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "q",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of title or author",
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "503": error("Key-value store unavailable")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": input_body.clone(),
                        "responses": {
                            "201": book("Created book"),
                            "400": error("Body is not JSON or lacks titulo/autor")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": book("The book"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "description": "Absent fields keep their stored value.",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": input_body,
                        "responses": {
                            "200": book("Updated book"),
                            "400": error("Body is not JSON"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": {
                                "description": "Confirmation",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "message": { "type": "string" } }
                                        }
                                    }
                                }
                            },
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "description": "Unique identifier for the book" },
                            "titulo": { "type": "string", "description": "Title of the book" },
                            "autor": { "type": "string", "description": "Author of the book" },
                            "genero": { "type": "string", "description": "Genre, empty if unknown" },
                            "estado": { "type": "string", "description": "Reading status" }
                        },
                        "required": ["id", "titulo", "autor", "genero", "estado"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "titulo": { "type": "string" },
                            "autor": { "type": "string" },
                            "genero": { "type": "string" },
                            "estado": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: BookStore) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(store))
}
