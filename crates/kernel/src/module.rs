use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while the service boots.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A unit of functionality served by one of the shelf services.
///
/// Every hook has a no-op default, so a module only implements what it uses.
#[async_trait]
pub trait Module: Sync + Send {
    /// Name used in logs and for registry lookups.
    fn name(&self) -> &'static str;

    /// Runs before the listener binds. An error aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes merged at the server root; paths are absolute.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) for `/docs/openapi.json`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server has drained, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
