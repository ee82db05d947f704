pub mod client;
pub mod flash;
pub mod pages;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use shelf_kernel::{InitCtx, Module};

pub use client::BooksClient;

/// Frontend module: HTML pages rendered from the books API
pub struct ViewsModule {
    client: BooksClient,
}

impl ViewsModule {
    pub fn new(client: BooksClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Module for ViewsModule {
    fn name(&self) -> &'static str {
        "views"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            api_url = %self.client.base_url(),
            "views module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.client.clone())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "views module stopped");
        Ok(())
    }
}

/// Create a new instance of the views module
pub fn create_module(client: BooksClient) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ViewsModule::new(client))
}
